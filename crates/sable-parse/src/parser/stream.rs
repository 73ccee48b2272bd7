//! Token cursor for the hand-written parser.

use sable_token::{Id, Token};

/// Sliding window over the token slice.
///
/// The cursor never retreats: `advance` is the only movement, strictly
/// left to right. The line of the last token is remembered so diagnostics
/// at end of input still report a line.
pub(crate) struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    last_line: u32,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> TokenStream<'a> {
        TokenStream {
            tokens,
            pos: 0,
            last_line: tokens.last().map(|t| t.line).unwrap_or(0),
        }
    }

    /// The current token's id, or [`Id::INVALID`] at end of input.
    pub(crate) fn peek(&self) -> Id {
        self.tokens.get(self.pos).map(|t| t.id).unwrap_or(Id::INVALID)
    }

    /// The current token's line, or the last seen line at end of input.
    pub(crate) fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .map(|t| t.line)
            .unwrap_or(self.last_line)
    }

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
