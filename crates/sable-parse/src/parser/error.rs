//! Parse error type.
//!
//! Every parser failure is a single-line message rendered as
//! `parse: <message> at <file>:<line>`. The rendered string is itself the
//! contract: tests and downstream tooling match on the message stems, so
//! this stays a plain struct with a hand-written `Display` rather than a
//! derived error enum.

use std::fmt;

/// A parse failure: message plus source location.
///
/// The line is the cursor's line at the point of failure, or the last seen
/// line when the failure is at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub filename: String,
    pub line: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, filename: impl Into<String>, line: u32) -> ParseError {
        ParseError {
            message: message.into(),
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse: {} at {}:{}", self.message, self.filename, self.line)
    }
}

impl std::error::Error for ParseError {}
