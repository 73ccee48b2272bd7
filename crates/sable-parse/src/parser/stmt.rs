//! Statement parsing: the dispatch table, the loop-label stack, and the
//! `var` gate.

use std::rc::Rc;

use sable_ast::{
    terminates, Assign, Choose, IOManip, If, Iterate, Jump, JumpTarget, LoopMarks, Node, Ret,
    Var, While, OP_CALL, OP_INDEX, OP_SELECTOR,
};
use sable_token::Id;

use super::error::ParseError;
use super::names::as_small_positive_int_256;
use super::Parser;

/// A loop currently open on the stack: `while` or `iterate`.
#[derive(Clone)]
pub(crate) enum LoopNode {
    While(Rc<While>),
    Iterate(Rc<Iterate>),
}

impl LoopNode {
    pub(crate) fn label(&self) -> Id {
        match self {
            LoopNode::While(w) => w.label,
            LoopNode::Iterate(i) => i.label,
        }
    }

    pub(crate) fn keyword(&self) -> Id {
        match self {
            LoopNode::While(_) => Id::WHILE,
            LoopNode::Iterate(_) => Id::ITERATE,
        }
    }

    pub(crate) fn marks(&self) -> &LoopMarks {
        match self {
            LoopNode::While(w) => &w.marks,
            LoopNode::Iterate(i) => &i.marks,
        }
    }

    pub(crate) fn jump_target(&self) -> JumpTarget {
        match self {
            LoopNode::While(w) => JumpTarget::While(Rc::downgrade(w)),
            LoopNode::Iterate(i) => JumpTarget::Iterate(Rc::downgrade(i)),
        }
    }

    fn same(&self, other: &LoopNode) -> bool {
        match (self, other) {
            (LoopNode::While(a), LoopNode::While(b)) => Rc::ptr_eq(a, b),
            (LoopNode::Iterate(a), LoopNode::Iterate(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The ordered set of loops enclosing the statement being parsed.
///
/// Empty outside function bodies and balanced across every nested parse.
/// Labels on the stack are pairwise distinct; `push` refuses a duplicate.
pub(crate) struct LoopStack(Vec<LoopNode>);

impl LoopStack {
    pub(crate) fn new() -> LoopStack {
        LoopStack(Vec::new())
    }

    /// Push a loop; false if its (non-empty) label is already on the stack.
    pub(crate) fn push(&mut self, n: LoopNode) -> bool {
        if n.label() != Id::INVALID && self.0.iter().any(|l| l.label() == n.label()) {
            return false;
        }
        self.0.push(n);
        true
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub(crate) fn top(&self) -> Option<&LoopNode> {
        self.0.last()
    }

    /// Innermost-outward search for a label.
    pub(crate) fn find_label(&self, label: Id) -> Option<&LoopNode> {
        self.0.iter().rev().find(|l| l.label() == label)
    }
}

impl<'a> Parser<'a> {
    /// Parse a `{ ... }` block, or `{{ ... }}` when `double_curly` is set.
    /// Every statement inside is followed by an (implicit) semicolon.
    pub(crate) fn parse_block(&mut self, double_curly: bool) -> Result<Vec<Node>, ParseError> {
        let (open, close) = if double_curly {
            (Id::OPEN_DOUBLE_CURLY, Id::CLOSE_DOUBLE_CURLY)
        } else {
            (Id::OPEN_CURLY, Id::CLOSE_CURLY)
        };

        let x = self.stream.peek();
        if x != open {
            return Err(self.err(format!(
                "expected {:?}, got {:?}",
                self.spelling(open),
                self.spelling(x)
            )));
        }
        self.stream.advance();

        let mut block = Vec::new();
        loop {
            if self.stream.at_end() {
                return Err(self.err("expected \"}\" or \"}}\""));
            }
            if self.stream.peek() == close {
                break;
            }
            block.push(self.parse_statement()?);
            self.expect_semicolon()?;
        }

        self.stream.advance();
        Ok(block)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();

        let x = self.stream.peek();
        if x == Id::VAR {
            if !self.allow_var {
                return Err(self.err("var statement not at the top of a function"));
            }
            self.stream.advance();
            return self.parse_var_node(line);
        }
        self.allow_var = false;

        match x {
            Id::ASSERT => self.parse_assert_node(),
            Id::BREAK | Id::CONTINUE => self.parse_jump_node(line),
            Id::CHOOSE => self.parse_choose_node(line),
            Id::IO_BIND | Id::IO_LIMIT => self.parse_io_manip_node(line),
            Id::IF => Ok(Node::If(self.parse_if(line)?)),
            Id::ITERATE => self.parse_iterate_node(line),
            Id::RETURN | Id::YIELD => self.parse_ret_node(line),
            Id::WHILE => self.parse_while_node(line),
            _ => self.parse_assign_node(line),
        }
    }

    fn parse_jump_node(&mut self, line: u32) -> Result<Node, ParseError> {
        let x = self.stream.peek();
        self.stream.advance();
        let label = self.parse_label()?;

        let mut target: Option<LoopNode> = None;
        if label == Id::INVALID {
            if let Some(top) = self.loops.top().cloned() {
                if top.label() != Id::INVALID {
                    return Err(self.err(format!(
                        "unlabeled {} for labeled {}.{}",
                        self.spelling(x),
                        self.spelling(top.keyword()),
                        self.spelling(top.label())
                    )));
                }
                target = Some(top);
            }
        } else {
            target = self.loops.find_label(label).cloned();
        }

        let Some(target) = target else {
            let (sep, label_str) = if label != Id::INVALID {
                (".", self.spelling(label))
            } else {
                ("", "")
            };
            return Err(self.err(format!(
                "no matching while/iterate statement for {}{}{}",
                self.spelling(x),
                sep,
                label_str
            )));
        };

        let deep = !self.loops.top().is_some_and(|t| t.same(&target));
        if x == Id::BREAK {
            target.marks().set_has_break(deep);
        } else {
            target.marks().set_has_continue(deep);
        }
        Ok(Node::Jump(Jump::new(
            self.loc_at(line),
            x,
            label,
            target.jump_target(),
        )))
    }

    fn parse_choose_node(&mut self, line: u32) -> Result<Node, ParseError> {
        self.stream.advance();
        if self.func_effect.is_pure() {
            return Err(self.err("choose within pure function"));
        }
        let name = self.parse_ident()?;
        let x = self.stream.peek();
        if x != Id::EQ {
            return Err(self.err(format!("expected \"=\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        let x = self.stream.peek();
        if x != Id::OPEN_BRACKET {
            return Err(self.err(format!("expected \"[\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        let args = self.parse_list(Id::CLOSE_BRACKET, Parser::parse_ident_as_expr_node)?;
        Ok(Node::Choose(Choose::new(self.loc_at(line), name, args)))
    }

    fn parse_ret_node(&mut self, line: u32) -> Result<Node, ParseError> {
        let x = self.stream.peek();
        self.stream.advance();
        if x == Id::YIELD {
            if !self.func_effect.is_coroutine() {
                return Err(self.err("yield within non-coroutine"));
            }
            if self.stream.peek() != Id::QUESTION {
                return Err(self.err("yield not followed by '?'"));
            }
            self.stream.advance();
        }
        let value = self.parse_expr()?;
        if value.effect().is_impure() {
            return Err(self.err(format!("{} an impure expression", self.spelling(x))));
        }
        if x == Id::RETURN && value.operator == Id::INVALID {
            let s = self.spelling(value.ident).as_bytes();
            if s.len() > 1 && s[0] == b'"' && s[1] == b'$' {
                return Err(self.err("cannot return a suspension"));
            }
        }
        Ok(Node::Ret(Ret::new(self.loc_at(line), x, value)))
    }

    fn parse_while_node(&mut self, line: u32) -> Result<Node, ParseError> {
        self.stream.advance();
        let label = self.parse_label()?;
        let condition = self.parse_expr()?;
        if !condition.effect().is_pure() {
            return Err(self.err(format!(
                "while-condition {:?} is not effect-free",
                condition.str(self.map)
            )));
        }
        let asserts = self.parse_asserts()?;

        let n = Rc::new(While::new(self.loc_at(line), label, condition, asserts));
        if !self.loops.push(LoopNode::While(n.clone())) {
            return Err(self.err(format!("duplicate loop label {}", self.spelling(label))));
        }
        let double_curly = self.stream.peek() == Id::OPEN_DOUBLE_CURLY;
        if double_curly && !n.is_while_true() {
            return Err(self.err("double {{ }} while loop condition isn't \"true\""));
        }
        let body = self.parse_block(double_curly)?;
        n.set_body(body);
        self.loops.pop();

        if !self.parse_endwhile(label) {
            let dot_label = if label != Id::INVALID {
                format!(".{}", self.spelling(label))
            } else {
                String::new()
            };
            return Err(self.err(format!("expected endwhile{}", dot_label)));
        }

        if double_curly {
            if n.marks.has_continue() {
                return Err(self.err("double {{ }} while loop has explicit continue"));
            } else if !terminates(&n.body.borrow()) {
                return Err(self.err("double {{ }} while loop doesn't terminate"));
            }
        }
        Ok(Node::While(n))
    }

    /// Consume `endwhile`, and when the loop was labeled, its matching
    /// `.label`. Reports success only on an exact match.
    fn parse_endwhile(&mut self, label: Id) -> bool {
        if self.stream.peek() != Id::ENDWHILE {
            return false;
        }
        self.stream.advance();
        if label != Id::INVALID {
            if self.stream.peek() != Id::DOT {
                return false;
            }
            self.stream.advance();
            if self.stream.peek() != label {
                return false;
            }
            self.stream.advance();
        }
        true
    }

    pub(crate) fn parse_assign_node(&mut self, line: u32) -> Result<Node, ParseError> {
        let first = self.parse_expr()?;

        let op = self.stream.peek();
        let (op, lhs, rhs) = if op.is_assign() {
            self.stream.advance();
            let lhs = first;
            if !lhs.effect().is_pure() {
                return Err(self.err(format!(
                    "assignment LHS {:?} is not effect-free",
                    lhs.str(self.map)
                )));
            }

            // Walk the selector/index chain down to its root identifier.
            let mut l = Some(&lhs);
            while let Some(e) = l {
                match e.operator {
                    Id::INVALID => {
                        let id = e.ident;
                        if id.is_literal(self.map) {
                            return Err(self.err(format!(
                                "assignment LHS {:?} is a literal",
                                e.str(self.map)
                            )));
                        } else if id.is_cannot_assign_to() {
                            if std::ptr::eq(e, &lhs) {
                                return Err(self.err(format!(
                                    "cannot assign to {:?}",
                                    self.spelling(id)
                                )));
                            }
                            if !self.func_effect.is_impure() {
                                return Err(self.err(format!(
                                    "cannot assign to {:?} in a pure function",
                                    lhs.str(self.map)
                                )));
                            }
                        }
                        l = e.lhs_expr();
                    }
                    OP_SELECTOR | OP_INDEX => {
                        l = e.lhs_expr();
                    }
                    _ => {
                        return Err(self.err(format!(
                            "invalid assignment LHS {:?}",
                            lhs.str(self.map)
                        )));
                    }
                }
            }

            let rhs = self.parse_expr()?;
            if op == Id::EQ_QUESTION
                && (rhs.operator != OP_CALL || !rhs.effect().is_coroutine())
            {
                return Err(self.err(format!(
                    "expected ?-function call after \"=?\", got {:?}",
                    rhs.str(self.map)
                )));
            }
            (op, Some(lhs), rhs)
        } else {
            (Id::EQ, None, first)
        };

        if self.func_effect.weaker_than(rhs.effect()) {
            return Err(self.err(format!(
                "value {:?}'s effect {:?} is stronger than the func's effect {:?}",
                rhs.str(self.map),
                rhs.effect().to_string(),
                self.func_effect.to_string()
            )));
        }

        Ok(Node::Assign(Assign::new(self.loc_at(line), op, lhs, rhs)))
    }

    fn parse_var_node(&mut self, line: u32) -> Result<Node, ParseError> {
        let name = self.parse_ident()?;
        let x = self.stream.peek();
        if x != Id::COLON {
            return Err(self.err(format!("expected \":\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        let xtype = self.parse_type_expr()?;
        Ok(Node::Var(Var::new(self.loc_at(line), name, xtype)))
    }

    fn parse_if(&mut self, line: u32) -> Result<If, ParseError> {
        self.stream.advance();
        let likelihood = self.parse_label()?;
        match likelihood {
            Id::INVALID | Id::LIKELY | Id::UNLIKELY => {}
            _ => {
                return Err(self.err(format!(
                    "expected \"if.likely\" or \"if.unlikely\", got {:?}",
                    format!("if.{}", self.spelling(likelihood))
                )));
            }
        }
        let condition = self.parse_expr()?;
        if !condition.effect().is_pure() {
            return Err(self.err(format!(
                "if-condition {:?} is not effect-free",
                condition.str(self.map)
            )));
        }
        let body_if_true = self.parse_block(false)?;

        let mut else_if = None;
        let mut body_if_false = Vec::new();
        if self.stream.peek() == Id::ELSE {
            self.stream.advance();
            if self.stream.peek() == Id::IF {
                let else_line = self.stream.line();
                else_if = Some(Box::new(self.parse_if(else_line)?));
            } else {
                body_if_false = self.parse_block(false)?;
            }
        }
        Ok(If::new(
            self.loc_at(line),
            likelihood,
            condition,
            body_if_true,
            body_if_false,
            else_if,
        ))
    }

    fn parse_io_manip_node(&mut self, line: u32) -> Result<Node, ParseError> {
        let keyword = self.stream.peek();
        self.stream.advance();

        let x = self.stream.peek();
        if x != Id::OPEN_PAREN {
            return Err(self.err(format!("expected \"(\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let x = self.stream.peek();
        if x != Id::IO {
            return Err(self.err(format!("expected \"io\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        self.expect(Id::COLON)?;

        let io = self.parse_expr()?;
        if !io.effect().is_pure() {
            return Err(self.err(format!(
                "argument {:?} is not effect-free",
                io.str(self.map)
            )));
        }

        // io_bind rebinds a bare io variable; io_limit also accepts an
        // args.foo-shaped argument.
        let arg1_name = if keyword == Id::IO_BIND {
            if io.operator != Id::INVALID {
                return Err(self.err(format!(
                    "invalid {} argument {:?}",
                    self.spelling(keyword),
                    io.str(self.map)
                )));
            }
            Id::DATA
        } else {
            if io.operator != Id::INVALID && io.is_args_dot_foo().is_none() {
                return Err(self.err(format!(
                    "invalid {} argument {:?}",
                    self.spelling(keyword),
                    io.str(self.map)
                )));
            }
            Id::LIMIT
        };

        self.expect(Id::COMMA)?;

        let x = self.stream.peek();
        if x != arg1_name {
            return Err(self.err(format!(
                "expected {:?}, got {:?}",
                self.spelling(arg1_name),
                self.spelling(x)
            )));
        }
        self.stream.advance();
        self.expect(Id::COLON)?;

        let arg1 = self.parse_expr()?;
        if !arg1.effect().is_pure() {
            return Err(self.err(format!(
                "argument {:?} is not effect-free",
                arg1.str(self.map)
            )));
        }

        let mut history_position = None;
        if keyword == Id::IO_BIND {
            self.expect(Id::COMMA)?;
            let x = self.stream.peek();
            if x != Id::HISTORY_POSITION {
                return Err(self.err(format!(
                    "expected \"history_position\", got {:?}",
                    self.spelling(x)
                )));
            }
            self.stream.advance();
            self.expect(Id::COLON)?;

            let hist = self.parse_expr()?;
            if !hist.effect().is_pure() {
                return Err(self.err(format!(
                    "argument {:?} is not effect-free",
                    hist.str(self.map)
                )));
            }
            history_position = Some(hist);
        }

        let x = self.stream.peek();
        if x != Id::CLOSE_PAREN {
            return Err(self.err(format!("expected \")\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let body = self.parse_block(false)?;
        Ok(Node::IOManip(IOManip::new(
            self.loc_at(line),
            keyword,
            io,
            arg1,
            history_position,
            body,
        )))
    }

    fn parse_iterate_node(&mut self, line: u32) -> Result<Node, ParseError> {
        if self.func_effect.is_coroutine() {
            return Err(self.err("\"iterate\" inside coroutine"));
        }
        self.stream.advance();
        let label = self.parse_label()?;
        let assigns = self.parse_list(Id::CLOSE_PAREN, Parser::parse_iterate_assign_node)?;
        let n = self.parse_iterate_block(line, label, assigns)?;
        Ok(Node::Iterate(n))
    }

    /// Header assignments must be plain `name = effect-free-expr`.
    fn parse_iterate_assign_node(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let n = self.parse_assign_node(line)?;
        let Node::Assign(a) = &n else {
            unreachable!("parse_assign_node returns an assign node");
        };
        if a.operator != Id::EQ {
            return Err(self.err(format!(
                "expected \"=\", got {:?}",
                self.spelling(a.operator)
            )));
        }
        match &a.lhs {
            Some(l) if l.operator == Id::INVALID => {}
            Some(l) => {
                return Err(self.err(format!("expected variable, got {:?}", l.str(self.map))));
            }
            None => {
                return Err(self.err(format!(
                    "expected variable, got {:?}",
                    a.rhs.str(self.map)
                )));
            }
        }
        if !a.rhs.effect().is_pure() {
            return Err(self.err(format!(
                "value {:?} is not effect-free",
                a.rhs.str(self.map)
            )));
        }
        Ok(n)
    }

    /// Parse `(length: N, advance: M, unroll: U) asserts? { body }` and any
    /// chained `else` iterate blocks, which carry no label or assigns.
    fn parse_iterate_block(
        &mut self,
        line: u32,
        label: Id,
        assigns: Vec<Node>,
    ) -> Result<Rc<Iterate>, ParseError> {
        let x = self.stream.peek();
        if x != Id::OPEN_PAREN {
            return Err(self.err(format!("expected \"(\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let length = self.parse_counted_field(Id::LENGTH)?;
        let length_int = as_small_positive_int_256(self.map, length);
        if length_int == 0 {
            return Err(self.err(format!(
                "expected length count in [1 ..= 256], got {:?}",
                self.spelling(length)
            )));
        }
        self.stream.advance();
        self.expect(Id::COMMA)?;

        let advance = self.parse_counted_field(Id::ADVANCE)?;
        let advance_int = as_small_positive_int_256(self.map, advance);
        if advance_int == 0 {
            return Err(self.err(format!(
                "expected advance count in [1 ..= 256], got {:?}",
                self.spelling(advance)
            )));
        } else if advance_int > length_int {
            return Err(self.err(format!(
                "advance {} is larger than length {}",
                advance_int, length_int
            )));
        }
        self.stream.advance();
        self.expect(Id::COMMA)?;

        let unroll = self.parse_counted_field(Id::UNROLL)?;
        if as_small_positive_int_256(self.map, unroll) == 0 {
            return Err(self.err(format!(
                "expected unroll count in [1 ..= 256], got {:?}",
                self.spelling(unroll)
            )));
        }
        self.stream.advance();

        let x = self.stream.peek();
        if x != Id::CLOSE_PAREN {
            return Err(self.err(format!("expected \")\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let asserts = self.parse_asserts()?;
        let n = Rc::new(Iterate::new(
            self.loc_at(line),
            label,
            assigns,
            length,
            advance,
            unroll,
            asserts,
        ));
        if !self.loops.push(LoopNode::Iterate(n.clone())) {
            return Err(self.err(format!("duplicate loop label {}", self.spelling(label))));
        }
        let body = self.parse_block(false)?;
        n.set_body(body);
        self.loops.pop();

        if self.stream.peek() == Id::ELSE {
            self.stream.advance();
            let else_line = self.stream.line();
            let tail = self.parse_iterate_block(else_line, Id::INVALID, Vec::new())?;
            n.set_else_iterate(tail);
        }

        Ok(n)
    }

    /// Consume `<name> :` and return the (unconsumed) count token.
    fn parse_counted_field(&mut self, name: Id) -> Result<Id, ParseError> {
        let x = self.stream.peek();
        if x != name {
            return Err(self.err(format!(
                "expected {:?}, got {:?}",
                self.spelling(name),
                self.spelling(x)
            )));
        }
        self.stream.advance();
        self.expect(Id::COLON)?;
        Ok(self.stream.peek())
    }
}
