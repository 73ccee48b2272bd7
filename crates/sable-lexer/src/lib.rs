//! Lexical analysis for the Sable language.
//!
//! Tokenization happens in two steps: a raw scan with logos, then a cooking
//! pass that interns every spelling into the [`Map`] and inserts the
//! implicit semicolons the parser's grammar expects.
//!
//! # Implicit semicolons
//!
//! At each line boundary, if the last token on the line is an identifier, a
//! literal, `)`, `]`, `}`, `}}`, `break`, `continue` or `endwhile`, a `;`
//! token carrying that line number is emitted. An explicit `;` is simply
//! not in the insertion set, so it never doubles up.
//!
//! Comments (`// ...`) are stripped during lexing and are not tokens.
//! Adjacent close-curlies that are not a `}}` loop closer must be separated
//! by whitespace; `}}` always lexes as the double-curly closer.

use logos::Logos;
use thiserror::Error;

use sable_token::{Id, Map, Token};

/// Tokenization failure, reported with the same `file:line` shape the
/// parser uses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("lex: unrecognized token at {filename}:{line}")]
    Unrecognized { filename: String, line: u32 },
}

/// Raw lexemes. Words, numbers and strings carry no payload; the cooking
/// pass reads the matched slice and interns it.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("..=")]
    DotDotEq,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,
    #[token("{{")]
    OpenDoubleCurly,
    #[token("}}")]
    CloseDoubleCurly,
    #[token("!")]
    Exclam,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("=?")]
    EqQuestion,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("<<=")]
    ShiftLEq,
    #[token(">>=")]
    ShiftREq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<<")]
    ShiftL,
    #[token(">>")]
    ShiftR,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessEq,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterEq,

    /// Keywords, built-in identifiers and user identifiers alike; the
    /// interner's built-in table tells them apart.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    /// Decimal or hexadecimal numeric literal.
    #[regex(r"0x[0-9A-Fa-f_]+|[0-9][0-9_]*")]
    Number,

    /// Double-quoted string literal. The spelling is interned with its
    /// quotes; escapes stay raw until `sable_token::unescape`.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
}

impl RawToken {
    /// The fixed id for punctuation and operator lexemes; `None` for the
    /// word/number/string classes, which intern their slice instead.
    fn fixed_id(self) -> Option<Id> {
        let id = match self {
            RawToken::Semicolon => Id::SEMICOLON,
            RawToken::Colon => Id::COLON,
            RawToken::Comma => Id::COMMA,
            RawToken::Dot => Id::DOT,
            RawToken::DotDot => Id::DOT_DOT,
            RawToken::DotDotEq => Id::DOT_DOT_EQ,
            RawToken::OpenParen => Id::OPEN_PAREN,
            RawToken::CloseParen => Id::CLOSE_PAREN,
            RawToken::OpenBracket => Id::OPEN_BRACKET,
            RawToken::CloseBracket => Id::CLOSE_BRACKET,
            RawToken::OpenCurly => Id::OPEN_CURLY,
            RawToken::CloseCurly => Id::CLOSE_CURLY,
            RawToken::OpenDoubleCurly => Id::OPEN_DOUBLE_CURLY,
            RawToken::CloseDoubleCurly => Id::CLOSE_DOUBLE_CURLY,
            RawToken::Exclam => Id::EXCLAM,
            RawToken::Question => Id::QUESTION,
            RawToken::Eq => Id::EQ,
            RawToken::EqQuestion => Id::EQ_QUESTION,
            RawToken::PlusEq => Id::PLUS_EQ,
            RawToken::MinusEq => Id::MINUS_EQ,
            RawToken::StarEq => Id::STAR_EQ,
            RawToken::SlashEq => Id::SLASH_EQ,
            RawToken::PercentEq => Id::PERCENT_EQ,
            RawToken::ShiftLEq => Id::SHIFT_L_EQ,
            RawToken::ShiftREq => Id::SHIFT_R_EQ,
            RawToken::AmpEq => Id::AMP_EQ,
            RawToken::PipeEq => Id::PIPE_EQ,
            RawToken::CaretEq => Id::CARET_EQ,
            RawToken::Plus => Id::PLUS,
            RawToken::Minus => Id::MINUS,
            RawToken::Star => Id::STAR,
            RawToken::Slash => Id::SLASH,
            RawToken::Percent => Id::PERCENT,
            RawToken::ShiftL => Id::SHIFT_L,
            RawToken::ShiftR => Id::SHIFT_R,
            RawToken::Amp => Id::AMP,
            RawToken::Pipe => Id::PIPE,
            RawToken::Caret => Id::CARET,
            RawToken::EqEq => Id::EQ_EQ,
            RawToken::NotEq => Id::NOT_EQ,
            RawToken::LessThan => Id::LESS_THAN,
            RawToken::LessEq => Id::LESS_EQ,
            RawToken::GreaterThan => Id::GREATER_THAN,
            RawToken::GreaterEq => Id::GREATER_EQ,
            RawToken::Word | RawToken::Number | RawToken::Str => return None,
        };
        Some(id)
    }
}

/// Whether a token, when it closes out a line, gets an implicit `;` after it.
fn ends_statement(id: Id, map: &Map) -> bool {
    matches!(
        id,
        Id::CLOSE_PAREN
            | Id::CLOSE_BRACKET
            | Id::CLOSE_CURLY
            | Id::CLOSE_DOUBLE_CURLY
            | Id::BREAK
            | Id::CONTINUE
            | Id::ENDWHILE
    ) || id.is_ident(map)
        || id.is_literal(map)
}

/// Tokenize a whole source file.
///
/// Spellings are interned into `map`; the returned tokens carry 1-based
/// line numbers and include the implicit semicolons.
///
/// # Errors
///
/// Returns [`LexError::Unrecognized`] on the first byte sequence that is
/// not a Sable lexeme (this includes unterminated string literals).
pub fn tokenize(map: &mut Map, filename: &str, src: &str) -> Result<Vec<Token>, LexError> {
    let bytes = src.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0usize;
    let mut line = 1u32;

    let mut lexer = RawToken::lexer(src);
    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        while pos < span.start {
            if bytes[pos] == b'\n' {
                line += 1;
            }
            pos += 1;
        }

        let raw = raw.map_err(|()| LexError::Unrecognized {
            filename: filename.to_string(),
            line,
        })?;

        if let Some(prev) = tokens.last().copied() {
            if prev.line < line && ends_statement(prev.id, map) {
                tokens.push(Token {
                    id: Id::SEMICOLON,
                    line: prev.line,
                });
            }
        }

        let id = match raw.fixed_id() {
            Some(id) => id,
            None => map.insert(lexer.slice()),
        };
        tokens.push(Token { id, line });
    }

    if let Some(prev) = tokens.last().copied() {
        if ends_statement(prev.id, map) {
            tokens.push(Token {
                id: Id::SEMICOLON,
                line: prev.line,
            });
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Map, Vec<Token>) {
        let mut map = Map::new();
        let tokens = tokenize(&mut map, "test.sable", src).expect("lex should succeed");
        (map, tokens)
    }

    fn spellings(map: &Map, tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| map.by_id(t.id).to_string()).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        let (map, tokens) = lex("while done");
        assert_eq!(tokens[0].id, Id::WHILE);
        assert!(tokens[1].id.is_ident(&map));
        // "done" ends the only line, so a semicolon follows it.
        assert_eq!(tokens[2].id, Id::SEMICOLON);
    }

    #[test]
    fn test_implicit_semicolon_per_line() {
        let (map, tokens) = lex("x = 1\ny = 2\n");
        let got = spellings(&map, &tokens);
        assert_eq!(got, vec!["x", "=", "1", ";", "y", "=", "2", ";"]);
        assert_eq!(tokens[3].line, 1);
        assert_eq!(tokens[7].line, 2);
    }

    #[test]
    fn test_explicit_semicolon_not_doubled() {
        let (_, tokens) = lex("x = 1;\n");
        let semis = tokens.iter().filter(|t| t.id == Id::SEMICOLON).count();
        assert_eq!(semis, 1);
    }

    #[test]
    fn test_no_semicolon_after_continuation() {
        // A trailing comma or open curly keeps the statement going.
        let (map, tokens) = lex("f(a,\nb)\n");
        let got = spellings(&map, &tokens);
        assert_eq!(got, vec!["f", "(", "a", ",", "b", ")", ";"]);
    }

    #[test]
    fn test_double_curly_lexes_as_one_token() {
        let (_, tokens) = lex("{{ }}");
        assert_eq!(tokens[0].id, Id::OPEN_DOUBLE_CURLY);
        assert_eq!(tokens[1].id, Id::CLOSE_DOUBLE_CURLY);
    }

    #[test]
    fn test_operator_maximal_munch() {
        let (_, tokens) = lex("a <<= b << c <= d");
        assert_eq!(tokens[1].id, Id::SHIFT_L_EQ);
        assert_eq!(tokens[3].id, Id::SHIFT_L);
        assert_eq!(tokens[5].id, Id::LESS_EQ);
    }

    #[test]
    fn test_dot_dot_forms() {
        let (_, tokens) = lex("a[b ..= c] d[e .. f] g.h");
        assert_eq!(tokens[3].id, Id::DOT_DOT_EQ);
        assert_eq!(tokens[9].id, Id::DOT_DOT);
        assert_eq!(tokens[13].id, Id::DOT);
    }

    #[test]
    fn test_string_literal_keeps_quotes() {
        let (map, tokens) = lex("status \"@broken\"");
        let spelling = map.by_id(tokens[1].id);
        assert_eq!(spelling, "\"@broken\"");
        assert!(tokens[1].id.is_dq_str_literal(&map));
    }

    #[test]
    fn test_comments_are_stripped() {
        let (map, tokens) = lex("x = 1  // trailing note\n");
        let got = spellings(&map, &tokens);
        assert_eq!(got, vec!["x", "=", "1", ";"]);
    }

    #[test]
    fn test_line_numbers() {
        let (_, tokens) = lex("a\n\nb\n");
        assert_eq!(tokens[0].line, 1);
        // tokens[1] is the inserted semicolon for line 1.
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn test_unrecognized_byte() {
        let mut map = Map::new();
        let err = tokenize(&mut map, "bad.sable", "x = `").unwrap_err();
        assert_eq!(
            err.to_string(),
            "lex: unrecognized token at bad.sable:1"
        );
    }
}
