//! Recursive descent parser for the Sable language.
//!
//! The parser consumes a previously-lexed token stream for a single source
//! file and produces a typed abstract syntax tree. It is not a mechanical
//! grammar translation: naming conventions, assertion-chain ordering,
//! effect propagation, loop-label scoping, iterate bounds and the other
//! contextual well-formedness rules are all enforced during construction,
//! so rejecting an ill-formed program early with a precise `file:line`
//! diagnostic is the primary contract.
//!
//! # Public API
//!
//! ```rust,ignore
//! pub fn parse_file(map: &Map, filename: &str, tokens: &[Token], options: Options)
//!     -> Result<File, ParseError>
//! pub fn parse_expr(map: &Map, filename: &str, tokens: &[Token], options: Options)
//!     -> Result<Expr, ParseError>
//! ```
//!
//! Parsing is single-threaded and synchronous; each invocation owns its
//! state, reads the identifier map without mutating it, and aborts on the
//! first error with no recovery and no partial tree.

mod parser;

use sable_ast::{Expr, File};
use sable_token::{Map, Token};
use tracing::trace;

pub use crate::parser::error::ParseError;
use crate::parser::Parser;

/// Parser options.
///
/// Both gates exist for the benefit of generated and bootstrap code; user
/// code leaves them off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Permit the reserved method names (`initialize`, `reset`) and
    /// refinements on unqualified numeric type names.
    pub allow_builtin_names: bool,
    /// Permit `__`-bearing function and struct names.
    pub allow_double_underscore_names: bool,
}

/// Parse a whole source file's tokens into a [`File`].
pub fn parse_file(
    map: &Map,
    filename: &str,
    tokens: &[Token],
    options: Options,
) -> Result<File, ParseError> {
    trace!(filename, tokens = tokens.len(), "parsing file");
    Parser::new(map, filename, tokens, options).parse_file()
}

/// Parse a single expression. Used by tests and tooling; the state setup
/// is identical to [`parse_file`].
pub fn parse_expr(
    map: &Map,
    filename: &str,
    tokens: &[Token],
    options: Options,
) -> Result<Expr, ParseError> {
    trace!(filename, tokens = tokens.len(), "parsing expression");
    Parser::new(map, filename, tokens, options).parse_expr()
}
