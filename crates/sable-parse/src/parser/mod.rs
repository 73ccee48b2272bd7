//! The recursive descent parser.
//!
//! Module layout:
//!
//! - `stream`: token cursor (peek, line, advance)
//! - `error`: the `parse: <msg> at <file>:<line>` error type
//! - `names`: stateless name and literal validators
//! - `types`: type expressions, refinements, array lengths
//! - `expr`: operands, binary/associative flattening, postfix chains,
//!   bracket forms, the effect purity guard
//! - `assert`: assertion clauses and chain ordering
//! - `stmt`: all statement forms, the loop-label stack, the `var` gate
//! - `decl`: top-level declarations and the field/list helpers
//!
//! The parser aborts on the first error: there is no recovery and no
//! partial tree is handed back. Contextual validation (naming rules,
//! effect propagation, loop-label scoping, numeric bounds) happens during
//! construction, so an accepted tree is well-formed by construction.

pub(crate) mod assert;
pub(crate) mod decl;
pub(crate) mod error;
pub(crate) mod expr;
pub(crate) mod names;
pub(crate) mod stmt;
pub(crate) mod stream;
pub(crate) mod types;

use std::rc::Rc;

use sable_ast::{Effect, Loc, Node};
use sable_token::{Id, Map, Token};

use crate::Options;
use self::error::ParseError;
use self::stmt::LoopStack;
use self::stream::TokenStream;

/// Per-invocation parser state.
pub(crate) struct Parser<'a> {
    pub(crate) map: &'a Map,
    pub(crate) filename: Rc<str>,
    pub(crate) stream: TokenStream<'a>,
    pub(crate) opts: Options,
    /// The declared effect of the function whose body is being parsed.
    pub(crate) func_effect: Effect,
    pub(crate) loops: LoopStack,
    /// True only at the top of a function body, before the first
    /// non-`var` statement.
    pub(crate) allow_var: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(map: &'a Map, filename: &str, tokens: &'a [Token], opts: Options) -> Parser<'a> {
        Parser {
            map,
            filename: Rc::from(filename),
            stream: TokenStream::new(tokens),
            opts,
            func_effect: Effect::Pure,
            loops: LoopStack::new(),
            allow_var: false,
        }
    }

    pub(crate) fn spelling(&self, id: Id) -> &'a str {
        self.map.by_id(id)
    }

    pub(crate) fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.filename.as_ref(), self.stream.line())
    }

    pub(crate) fn err_at(&self, message: impl Into<String>, line: u32) -> ParseError {
        ParseError::new(message, self.filename.as_ref(), line)
    }

    pub(crate) fn loc_at(&self, line: u32) -> Loc {
        Loc::new(self.filename.clone(), line)
    }

    /// Consume the expected token or fail with `expected "X", got "Y"`.
    pub(crate) fn expect(&mut self, want: Id) -> Result<(), ParseError> {
        let got = self.stream.peek();
        if got != want {
            return Err(self.err(format!(
                "expected {:?}, got {:?}",
                self.spelling(want),
                self.spelling(got)
            )));
        }
        self.stream.advance();
        Ok(())
    }

    /// Semicolons are inserted by the lexer, so a missing one reads as
    /// "(implicit)" in the diagnostic.
    pub(crate) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        let got = self.stream.peek();
        if got != Id::SEMICOLON {
            return Err(self.err(format!(
                "expected (implicit) \";\", got {:?}",
                self.spelling(got)
            )));
        }
        self.stream.advance();
        Ok(())
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Id, ParseError> {
        if self.stream.at_end() {
            return Err(self.err("expected identifier"));
        }
        let x = self.stream.peek();
        if !x.is_ident(self.map) {
            return Err(self.err(format!("expected identifier, got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        Ok(x)
    }

    /// Parse `pkg.name` or a bare `name` (returned as `(INVALID, name)`).
    pub(crate) fn parse_qualified_ident(&mut self) -> Result<(Id, Id), ParseError> {
        let x = self.parse_ident()?;
        if self.stream.peek() != Id::DOT {
            return Ok((Id::INVALID, x));
        }
        self.stream.advance();
        let y = self.parse_ident()?;
        Ok((x, y))
    }

    /// Parse an optional `.label` suffix; [`Id::INVALID`] when absent.
    pub(crate) fn parse_label(&mut self) -> Result<Id, ParseError> {
        if self.stream.peek() == Id::DOT {
            self.stream.advance();
            return self.parse_ident();
        }
        Ok(Id::INVALID)
    }

    /// Parse an optional `!` or `?` effect sigil.
    pub(crate) fn parse_effect(&mut self) -> Effect {
        match self.stream.peek() {
            Id::EXCLAM => {
                self.stream.advance();
                Effect::Impure
            }
            Id::QUESTION => {
                self.stream.advance();
                Effect::ImpureCoroutine
            }
            _ => Effect::Pure,
        }
    }

    /// Parse a comma-separated element list up to `stop`.
    ///
    /// When `stop` is `)` the opening `(` is consumed here too, and a
    /// closing `)` or `]` is consumed on exit; `{`-family stops are left
    /// for the caller (a block parser) to consume. A `{{` stop also
    /// accepts `{` as the terminator, since a loop body may open with
    /// either.
    pub(crate) fn parse_list(
        &mut self,
        stop: Id,
        parse_elem: fn(&mut Parser<'a>) -> Result<Node, ParseError>,
    ) -> Result<Vec<Node>, ParseError> {
        if stop == Id::CLOSE_PAREN {
            let x = self.stream.peek();
            if x != Id::OPEN_PAREN {
                return Err(self.err(format!("expected \"(\", got {:?}", self.spelling(x))));
            }
            self.stream.advance();
        }

        let mut ret = Vec::new();
        while !self.stream.at_end() {
            let x = self.stream.peek();
            if x == stop {
                if stop == Id::CLOSE_PAREN || stop == Id::CLOSE_BRACKET {
                    self.stream.advance();
                }
                return Ok(ret);
            } else if stop == Id::OPEN_DOUBLE_CURLY && x == Id::OPEN_CURLY {
                return Ok(ret);
            }

            ret.push(parse_elem(self)?);

            let x = self.stream.peek();
            if x == stop {
                if stop == Id::CLOSE_PAREN || stop == Id::CLOSE_BRACKET {
                    self.stream.advance();
                }
                return Ok(ret);
            } else if x == Id::COMMA {
                self.stream.advance();
            } else {
                return Err(self.err(format!(
                    "expected {:?}, got {:?}",
                    self.spelling(stop),
                    self.spelling(x)
                )));
            }
        }
        Err(self.err(format!("expected {:?}", self.spelling(stop))))
    }
}
