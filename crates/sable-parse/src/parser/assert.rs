//! Assertion clauses and chain ordering.

use sable_ast::{Assert, Node};
use sable_token::Id;

use super::error::ParseError;
use super::Parser;

impl<'a> Parser<'a> {
    /// Parse one clause: `(assert|choose|pre|inv|post) cond (via "reason" (args))?`.
    pub(crate) fn parse_assert_node(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let x = self.stream.peek();
        match x {
            Id::ASSERT | Id::CHOOSE | Id::PRE | Id::INV | Id::POST => {
                self.stream.advance();
                let condition = self.parse_expr()?;
                if !condition.effect().is_pure() {
                    return Err(self.err(format!(
                        "assert-condition {:?} is not effect-free",
                        condition.str(self.map)
                    )));
                }
                let mut reason = Id::INVALID;
                let mut args = Vec::new();
                if self.stream.peek() == Id::VIA {
                    self.stream.advance();
                    reason = self.stream.peek();
                    if !reason.is_dq_str_literal(self.map) {
                        return Err(self.err(format!(
                            "expected \"-string literal, got {:?}",
                            self.spelling(reason)
                        )));
                    }
                    self.stream.advance();
                    args = self.parse_list(Id::CLOSE_PAREN, Parser::parse_arg_node)?;
                }
                Ok(Node::Assert(Assert::new(
                    self.loc_at(line),
                    x,
                    condition,
                    reason,
                    args,
                )))
            }
            _ => Err(self.err("expected \"assert\", \"pre\" or \"post\"")),
        }
    }

    /// Enforce the `choose* pre* inv* post*` grouping. Statement-level
    /// chains (`allow_choose` false) additionally reject `choose`, and all
    /// chains reject the statement-only bare `assert`.
    pub(crate) fn asserts_sorted(
        &self,
        asserts: &[Node],
        allow_choose: bool,
    ) -> Result<(), ParseError> {
        let (mut seen_pre, mut seen_inv, mut seen_post) = (false, false, false);
        for o in asserts {
            let Some(a) = o.as_assert() else { continue };
            match a.keyword {
                Id::ASSERT => {
                    return Err(self.err(
                        "assertion chain cannot contain \"assert\", \
                         only \"pre\", \"inv\" and \"post\"",
                    ));
                }
                Id::CHOOSE => {
                    if !allow_choose {
                        return Err(self.err("invalid \"choose\""));
                    }
                    if !(seen_pre || seen_inv || seen_post) {
                        continue;
                    }
                }
                Id::PRE => {
                    if !(seen_inv || seen_post) {
                        seen_pre = true;
                        continue;
                    }
                }
                Id::INV => {
                    if !seen_post {
                        seen_inv = true;
                        continue;
                    }
                }
                _ => {
                    seen_post = true;
                    continue;
                }
            }
            return Err(self.err(
                "assertion chain not in \"choose\", \"pre\", \"inv\", \"post\" order",
            ));
        }
        Ok(())
    }

    /// Parse the optional `, assert_list` that precedes a loop body.
    pub(crate) fn parse_asserts(&mut self) -> Result<Vec<Node>, ParseError> {
        if self.stream.peek() != Id::COMMA {
            return Ok(Vec::new());
        }
        self.stream.advance();
        let asserts = self.parse_list(Id::OPEN_DOUBLE_CURLY, Parser::parse_assert_node)?;
        self.asserts_sorted(&asserts, false)?;
        Ok(asserts)
    }
}
