//! Expression parsing.
//!
//! Expressions are `operand (binary_op operand)*`. When an associative
//! operator immediately repeats, all operands flatten into one N-ary node
//! using the operator's associative form; otherwise the binary form with
//! exactly two operands is used. The special binary `as` takes a type
//! expression on the right.
//!
//! Calls may carry an effect sigil (`!` or `?`), but only at the top of an
//! expression: after building the tree, any effect on a strict
//! sub-expression is rejected. Statements that accept effectful values
//! (assignment RHS, `return`, `yield`) check the top-level effect
//! themselves.

use sable_ast::{Arg, Expr, Flags, Node, OP_CALL, OP_LIST, OP_SELECTOR};
use sable_token::Id;

use super::error::ParseError;
use super::Parser;

impl<'a> Parser<'a> {
    /// Parse an expression and apply the purity guard.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let e = self.parse_expr1()?;
        if e.sub_expr_has_effect() {
            return Err(self.err(format!(
                "expression {:?} has an effect-ful sub-expression",
                e.str(self.map)
            )));
        }
        Ok(e)
    }

    /// `operand (binary_op operand)*`, folded left to right with no
    /// operator precedence. A repeated associative operator flattens its
    /// run of operands into one N-ary node.
    fn parse_expr1(&mut self) -> Result<Expr, ParseError> {
        let line = self.stream.line();
        let mut lhs = self.parse_operand()?;

        loop {
            let x = self.stream.peek();
            if !x.is_binary_op() {
                return Ok(lhs);
            }
            self.stream.advance();

            let rhs: Node = if x == Id::AS {
                Node::TypeExpr(self.parse_type_expr()?)
            } else {
                Node::Expr(self.parse_operand()?)
            };

            if !x.is_associative_op() || x != self.stream.peek() {
                let op = x.binary_form();
                if op == Id::INVALID {
                    return Err(self.err(format!(
                        "internal error: no binary form for token 0x{:02X}",
                        x.0
                    )));
                }
                lhs = Expr::new(
                    self.loc_at(line),
                    Flags::default(),
                    op,
                    Id::INVALID,
                    Some(Box::new(Node::Expr(lhs))),
                    None,
                    Some(Box::new(rhs)),
                    Vec::new(),
                );
                continue;
            }

            let mut args = vec![Node::Expr(lhs), rhs];
            while self.stream.peek() == x {
                self.stream.advance();
                args.push(Node::Expr(self.parse_operand()?));
            }
            let op = x.associative_form();
            if op == Id::INVALID {
                return Err(self.err(format!(
                    "internal error: no associative form for token 0x{:02X}",
                    x.0
                )));
            }
            lhs = Expr::new(
                self.loc_at(line),
                Flags::default(),
                op,
                Id::INVALID,
                None,
                None,
                None,
                args,
            );
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let line = self.stream.line();

        let x = self.stream.peek();
        if x.is_unary_op() {
            self.stream.advance();
            let rhs = self.parse_operand()?;
            let op = x.unary_form();
            if op == Id::INVALID {
                return Err(self.err(format!(
                    "internal error: no unary form for token 0x{:02X}",
                    x.0
                )));
            }
            return Ok(Expr::new(
                self.loc_at(line),
                Flags::default(),
                op,
                Id::INVALID,
                None,
                None,
                Some(Box::new(Node::Expr(rhs))),
                Vec::new(),
            ));
        } else if x.is_literal(self.map) {
            self.stream.advance();
            return Ok(Expr::leaf(self.loc_at(line), x));
        } else if x == Id::OPEN_PAREN {
            self.stream.advance();
            let e = self.parse_expr()?;
            let x = self.stream.peek();
            if x != Id::CLOSE_PAREN {
                return Err(self.err(format!("expected \")\", got {:?}", self.spelling(x))));
            }
            self.stream.advance();
            return Ok(e);
        }

        let id = self.parse_ident()?;
        let mut lhs = Expr::leaf(self.loc_at(line), id);

        let mut first = true;
        loop {
            match self.stream.peek() {
                x @ (Id::EXCLAM | Id::QUESTION | Id::OPEN_PAREN) => {
                    let mut flags = Flags::default();
                    if x != Id::OPEN_PAREN {
                        flags |= self.parse_effect().as_flags();
                    }
                    let args = self.parse_list(Id::CLOSE_PAREN, Parser::parse_arg_node)?;
                    lhs = Expr::new(
                        self.loc_at(line),
                        flags,
                        OP_CALL,
                        Id::INVALID,
                        Some(Box::new(Node::Expr(lhs))),
                        None,
                        None,
                        args,
                    );
                }
                Id::OPEN_BRACKET => {
                    let (op, mhs, rhs) = self.parse_bracket(Id::DOT_DOT)?;
                    lhs = Expr::new(
                        self.loc_at(line),
                        Flags::default(),
                        op,
                        Id::INVALID,
                        Some(Box::new(Node::Expr(lhs))),
                        mhs.map(|e| Box::new(Node::Expr(*e))),
                        rhs.map(|e| Box::new(Node::Expr(*e))),
                        Vec::new(),
                    );
                }
                Id::DOT => {
                    self.stream.advance();
                    let selector = self.stream.peek();
                    let selector = if first && selector.is_dq_str_literal(self.map) {
                        self.stream.advance();
                        selector
                    } else {
                        self.parse_ident()?
                    };
                    lhs = Expr::new(
                        self.loc_at(line),
                        Flags::default(),
                        OP_SELECTOR,
                        selector,
                        Some(Box::new(Node::Expr(lhs))),
                        None,
                        None,
                        Vec::new(),
                    );
                }
                _ => return Ok(lhs),
            }
            first = false;
        }
    }

    /// Parse `[i .. j]`, `[i ..]`, `[.. j]` and `[..]`, with `..=` in place
    /// of `..` when `sep` says so. A `..` bracket also accepts plain `[x]`,
    /// returned as an index with `x` in the third slot. The returned op is
    /// `sep` for a range or refinement, or the index operator.
    pub(crate) fn parse_bracket(
        &mut self,
        sep: Id,
    ) -> Result<(Id, Option<Box<Expr>>, Option<Box<Expr>>), ParseError> {
        let x = self.stream.peek();
        if x != Id::OPEN_BRACKET {
            return Err(self.err(format!("expected \"[\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let mut ei = None;
        if self.stream.peek() != sep {
            ei = Some(Box::new(self.parse_expr()?));
        }

        let x = self.stream.peek();
        if x == sep {
            self.stream.advance();
        } else if x == Id::CLOSE_BRACKET && sep == Id::DOT_DOT {
            self.stream.advance();
            return Ok((sable_ast::OP_INDEX, None, ei));
        } else {
            let extra = if sep == Id::DOT_DOT { " or \"]\"" } else { "" };
            return Err(self.err(format!(
                "expected {:?}{}, got {:?}",
                self.spelling(sep),
                extra,
                self.spelling(x)
            )));
        }

        let mut ej = None;
        if self.stream.peek() != Id::CLOSE_BRACKET {
            ej = Some(Box::new(self.parse_expr()?));
        }

        let x = self.stream.peek();
        if x != Id::CLOSE_BRACKET {
            return Err(self.err(format!("expected \"]\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        Ok((sep, ei, ej))
    }

    /// A const's value: either a plain expression or a bracketed list,
    /// recursively.
    pub(crate) fn parse_possible_list_expr(&mut self) -> Result<Expr, ParseError> {
        let line = self.stream.line();
        if self.stream.peek() != Id::OPEN_BRACKET {
            return self.parse_expr();
        }
        self.stream.advance();
        let args = self.parse_list(Id::CLOSE_BRACKET, Parser::parse_possible_list_expr_node)?;
        Ok(Expr::new(
            self.loc_at(line),
            Flags::default(),
            OP_LIST,
            Id::INVALID,
            None,
            None,
            None,
            args,
        ))
    }

    fn parse_possible_list_expr_node(&mut self) -> Result<Node, ParseError> {
        Ok(Node::Expr(self.parse_possible_list_expr()?))
    }

    /// A named call argument `name: value`; the value must be effect-free.
    pub(crate) fn parse_arg_node(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let name = self.parse_ident()?;
        let x = self.stream.peek();
        if x != Id::COLON {
            return Err(self.err(format!("expected \":\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        let value = self.parse_expr()?;
        if !value.effect().is_pure() {
            return Err(self.err(format!(
                "arg-value {:?} is not effect-free",
                value.str(self.map)
            )));
        }
        Ok(Node::Arg(Arg::new(self.loc_at(line), name, value)))
    }

    /// A bare identifier used in expression position (choose candidates).
    pub(crate) fn parse_ident_as_expr_node(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let id = self.parse_ident()?;
        Ok(Node::Expr(Expr::leaf(self.loc_at(line), id)))
    }
}
