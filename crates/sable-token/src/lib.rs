//! Token ids and the interned identifier map for the Sable language.
//!
//! Every lexeme in a Sable source file is represented by an [`Id`]: built-in
//! ids (keywords, punctuation, operators, well-known identifiers) occupy the
//! space below [`Id::DYNAMIC_BASE`], and user spellings (identifiers and
//! literals) are interned into a [`Map`] at or above it.
//!
//! The constant blocks are laid out so that the hot classification
//! predicates (`is_assign`, `is_binary_op`, `is_num_type`, ...) are range
//! tests. Classification of dynamic ids consults the map and keys off the
//! first byte of the spelling: a digit means numeric literal, a `"` means
//! string literal, anything else is an identifier.
//!
//! String literal spellings are interned *with* their surrounding quotes;
//! [`unescape`] recovers the literal's value.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// An interned token or expression-operator id.
///
/// `Id(0)` is the invalid id; the cursor returns it at end of input and the
/// operator-form lookups return it when a token has no such form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(pub u32);

/// A lexed token: an interned id plus its 1-based source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Id,
    pub line: u32,
}

impl Id {
    pub const INVALID: Id = Id(0x00);

    // Punctuation.
    pub const SEMICOLON: Id = Id(0x01);
    pub const COLON: Id = Id(0x02);
    pub const COMMA: Id = Id(0x03);
    pub const DOT: Id = Id(0x04);
    pub const DOT_DOT: Id = Id(0x05);
    pub const DOT_DOT_EQ: Id = Id(0x06);
    pub const OPEN_PAREN: Id = Id(0x07);
    pub const CLOSE_PAREN: Id = Id(0x08);
    pub const OPEN_BRACKET: Id = Id(0x09);
    pub const CLOSE_BRACKET: Id = Id(0x0A);
    pub const OPEN_CURLY: Id = Id(0x0B);
    pub const CLOSE_CURLY: Id = Id(0x0C);
    pub const OPEN_DOUBLE_CURLY: Id = Id(0x0D);
    pub const CLOSE_DOUBLE_CURLY: Id = Id(0x0E);
    pub const EXCLAM: Id = Id(0x0F);
    pub const QUESTION: Id = Id(0x10);

    // Assignment operators, contiguous so `is_assign` is a range test.
    pub const EQ: Id = Id(0x11);
    pub const EQ_QUESTION: Id = Id(0x12);
    pub const PLUS_EQ: Id = Id(0x13);
    pub const MINUS_EQ: Id = Id(0x14);
    pub const STAR_EQ: Id = Id(0x15);
    pub const SLASH_EQ: Id = Id(0x16);
    pub const PERCENT_EQ: Id = Id(0x17);
    pub const SHIFT_L_EQ: Id = Id(0x18);
    pub const SHIFT_R_EQ: Id = Id(0x19);
    pub const AMP_EQ: Id = Id(0x1A);
    pub const PIPE_EQ: Id = Id(0x1B);
    pub const CARET_EQ: Id = Id(0x1C);

    // Binary operator tokens, contiguous. `not` sits just past the end of
    // the range: it is unary-only.
    pub const PLUS: Id = Id(0x20);
    pub const MINUS: Id = Id(0x21);
    pub const STAR: Id = Id(0x22);
    pub const SLASH: Id = Id(0x23);
    pub const PERCENT: Id = Id(0x24);
    pub const SHIFT_L: Id = Id(0x25);
    pub const SHIFT_R: Id = Id(0x26);
    pub const AMP: Id = Id(0x27);
    pub const PIPE: Id = Id(0x28);
    pub const CARET: Id = Id(0x29);
    pub const EQ_EQ: Id = Id(0x2A);
    pub const NOT_EQ: Id = Id(0x2B);
    pub const LESS_THAN: Id = Id(0x2C);
    pub const LESS_EQ: Id = Id(0x2D);
    pub const GREATER_THAN: Id = Id(0x2E);
    pub const GREATER_EQ: Id = Id(0x2F);
    pub const AND: Id = Id(0x30);
    pub const OR: Id = Id(0x31);
    pub const AS: Id = Id(0x32);
    pub const NOT: Id = Id(0x33);

    // Keywords. Never identifier-classified.
    pub const USE: Id = Id(0x40);
    pub const PUB: Id = Id(0x41);
    pub const PRI: Id = Id(0x42);
    pub const CONST: Id = Id(0x43);
    pub const FUNC: Id = Id(0x44);
    pub const STATUS: Id = Id(0x45);
    pub const STRUCT: Id = Id(0x46);
    pub const IMPLEMENTS: Id = Id(0x47);
    pub const VAR: Id = Id(0x48);
    pub const ASSERT: Id = Id(0x49);
    pub const CHOOSE: Id = Id(0x4A);
    pub const PRE: Id = Id(0x4B);
    pub const INV: Id = Id(0x4C);
    pub const POST: Id = Id(0x4D);
    pub const VIA: Id = Id(0x4E);
    pub const BREAK: Id = Id(0x4F);
    pub const CONTINUE: Id = Id(0x50);
    pub const IF: Id = Id(0x51);
    pub const ELSE: Id = Id(0x52);
    pub const RETURN: Id = Id(0x53);
    pub const YIELD: Id = Id(0x54);
    pub const WHILE: Id = Id(0x55);
    pub const ENDWHILE: Id = Id(0x56);
    pub const ITERATE: Id = Id(0x57);
    pub const IO_BIND: Id = Id(0x58);
    pub const IO_LIMIT: Id = Id(0x59);
    pub const CHOOSY: Id = Id(0x5A);
    pub const NPTR: Id = Id(0x5B);
    pub const PTR: Id = Id(0x5C);
    pub const ARRAY: Id = Id(0x5D);
    pub const ROARRAY: Id = Id(0x5E);
    pub const SLICE: Id = Id(0x5F);
    pub const ROSLICE: Id = Id(0x60);
    pub const TABLE: Id = Id(0x61);
    pub const ROTABLE: Id = Id(0x62);

    // Built-in identifiers: identifier-classified, but compared against by
    // the parser, so they need well-known ids.
    pub const BASE: Id = Id(0x70);
    pub const IO: Id = Id(0x71);
    pub const DATA: Id = Id(0x72);
    pub const LIMIT: Id = Id(0x73);
    pub const HISTORY_POSITION: Id = Id(0x74);
    pub const LENGTH: Id = Id(0x75);
    pub const ADVANCE: Id = Id(0x76);
    pub const UNROLL: Id = Id(0x77);
    pub const LIKELY: Id = Id(0x78);
    pub const UNLIKELY: Id = Id(0x79);
    pub const ARGS: Id = Id(0x7A);
    pub const THIS: Id = Id(0x7B);
    pub const COROUTINE_RESUMED: Id = Id(0x7C);
    pub const CPU_ARCH: Id = Id(0x7D);
    pub const INITIALIZE: Id = Id(0x7E);
    pub const RESET: Id = Id(0x7F);
    pub const I8: Id = Id(0x80);
    pub const I16: Id = Id(0x81);
    pub const I32: Id = Id(0x82);
    pub const I64: Id = Id(0x83);
    pub const U8: Id = Id(0x84);
    pub const U16: Id = Id(0x85);
    pub const U32: Id = Id(0x86);
    pub const U64: Id = Id(0x87);
    pub const X86_SSE42: Id = Id(0x88);
    pub const X86_AVX2: Id = Id(0x89);
    pub const ARM_CRC32: Id = Id(0x8A);
    pub const ARM_NEON: Id = Id(0x8B);

    // Built-in literals.
    pub const TRUE: Id = Id(0x90);
    pub const FALSE: Id = Id(0x91);

    // Expression-operator forms. Never produced by the lexer; expression
    // nodes carry these as their operator.
    pub const X_UNARY_PLUS: Id = Id(0xA0);
    pub const X_UNARY_MINUS: Id = Id(0xA1);
    pub const X_UNARY_NOT: Id = Id(0xA2);
    pub const X_BINARY_PLUS: Id = Id(0xA8);
    pub const X_BINARY_MINUS: Id = Id(0xA9);
    pub const X_BINARY_STAR: Id = Id(0xAA);
    pub const X_BINARY_SLASH: Id = Id(0xAB);
    pub const X_BINARY_PERCENT: Id = Id(0xAC);
    pub const X_BINARY_SHIFT_L: Id = Id(0xAD);
    pub const X_BINARY_SHIFT_R: Id = Id(0xAE);
    pub const X_BINARY_AMP: Id = Id(0xAF);
    pub const X_BINARY_PIPE: Id = Id(0xB0);
    pub const X_BINARY_CARET: Id = Id(0xB1);
    pub const X_BINARY_EQ_EQ: Id = Id(0xB2);
    pub const X_BINARY_NOT_EQ: Id = Id(0xB3);
    pub const X_BINARY_LESS_THAN: Id = Id(0xB4);
    pub const X_BINARY_LESS_EQ: Id = Id(0xB5);
    pub const X_BINARY_GREATER_THAN: Id = Id(0xB6);
    pub const X_BINARY_GREATER_EQ: Id = Id(0xB7);
    pub const X_BINARY_AND: Id = Id(0xB8);
    pub const X_BINARY_OR: Id = Id(0xB9);
    pub const X_BINARY_AS: Id = Id(0xBA);
    pub const X_ASSOCIATIVE_PLUS: Id = Id(0xC0);
    pub const X_ASSOCIATIVE_STAR: Id = Id(0xC1);
    pub const X_ASSOCIATIVE_AMP: Id = Id(0xC2);
    pub const X_ASSOCIATIVE_PIPE: Id = Id(0xC3);
    pub const X_ASSOCIATIVE_CARET: Id = Id(0xC4);
    pub const X_ASSOCIATIVE_AND: Id = Id(0xC5);
    pub const X_ASSOCIATIVE_OR: Id = Id(0xC6);

    /// First id handed out to a dynamically interned spelling.
    pub const DYNAMIC_BASE: u32 = 0x100;

    pub fn is_builtin(self) -> bool {
        self.0 < Id::DYNAMIC_BASE
    }

    /// Assignment operators: `=`, `=?` and the compound forms.
    pub fn is_assign(self) -> bool {
        (Id::EQ.0..=Id::CARET_EQ.0).contains(&self.0)
    }

    /// Binary operator tokens, including `and`, `or` and `as`.
    pub fn is_binary_op(self) -> bool {
        (Id::PLUS.0..=Id::AS.0).contains(&self.0)
    }

    pub fn is_unary_op(self) -> bool {
        matches!(self, Id::PLUS | Id::MINUS | Id::NOT)
    }

    /// Operators whose repeated application flattens into one N-ary node.
    pub fn is_associative_op(self) -> bool {
        matches!(
            self,
            Id::PLUS | Id::STAR | Id::AMP | Id::PIPE | Id::CARET | Id::AND | Id::OR
        )
    }

    /// Built-in identifiers that may never be an assignment target's root.
    pub fn is_cannot_assign_to(self) -> bool {
        matches!(self, Id::ARGS | Id::THIS | Id::COROUTINE_RESUMED)
    }

    /// The numeric base-type names `i8` through `u64`.
    pub fn is_num_type(self) -> bool {
        (Id::I8.0..=Id::U64.0).contains(&self.0)
    }

    /// One of the four recognized CPU architecture identifiers.
    pub fn is_cpu_arch(self) -> bool {
        (Id::X86_SSE42.0..=Id::ARM_NEON.0).contains(&self.0)
    }

    /// The unary-operator form of this token, or [`Id::INVALID`].
    pub fn unary_form(self) -> Id {
        match self {
            Id::PLUS => Id::X_UNARY_PLUS,
            Id::MINUS => Id::X_UNARY_MINUS,
            Id::NOT => Id::X_UNARY_NOT,
            _ => Id::INVALID,
        }
    }

    /// The binary-operator form of this token, or [`Id::INVALID`].
    pub fn binary_form(self) -> Id {
        match self {
            Id::PLUS => Id::X_BINARY_PLUS,
            Id::MINUS => Id::X_BINARY_MINUS,
            Id::STAR => Id::X_BINARY_STAR,
            Id::SLASH => Id::X_BINARY_SLASH,
            Id::PERCENT => Id::X_BINARY_PERCENT,
            Id::SHIFT_L => Id::X_BINARY_SHIFT_L,
            Id::SHIFT_R => Id::X_BINARY_SHIFT_R,
            Id::AMP => Id::X_BINARY_AMP,
            Id::PIPE => Id::X_BINARY_PIPE,
            Id::CARET => Id::X_BINARY_CARET,
            Id::EQ_EQ => Id::X_BINARY_EQ_EQ,
            Id::NOT_EQ => Id::X_BINARY_NOT_EQ,
            Id::LESS_THAN => Id::X_BINARY_LESS_THAN,
            Id::LESS_EQ => Id::X_BINARY_LESS_EQ,
            Id::GREATER_THAN => Id::X_BINARY_GREATER_THAN,
            Id::GREATER_EQ => Id::X_BINARY_GREATER_EQ,
            Id::AND => Id::X_BINARY_AND,
            Id::OR => Id::X_BINARY_OR,
            Id::AS => Id::X_BINARY_AS,
            _ => Id::INVALID,
        }
    }

    /// The associative (N-ary) form of this token, or [`Id::INVALID`].
    pub fn associative_form(self) -> Id {
        match self {
            Id::PLUS => Id::X_ASSOCIATIVE_PLUS,
            Id::STAR => Id::X_ASSOCIATIVE_STAR,
            Id::AMP => Id::X_ASSOCIATIVE_AMP,
            Id::PIPE => Id::X_ASSOCIATIVE_PIPE,
            Id::CARET => Id::X_ASSOCIATIVE_CARET,
            Id::AND => Id::X_ASSOCIATIVE_AND,
            Id::OR => Id::X_ASSOCIATIVE_OR,
            _ => Id::INVALID,
        }
    }

    /// Whether this id is identifier-classified: a built-in identifier, or a
    /// dynamic spelling that starts with a letter or underscore.
    pub fn is_ident(self, map: &Map) -> bool {
        if self.is_builtin() {
            return (Id::BASE.0..=Id::ARM_NEON.0).contains(&self.0);
        }
        map.by_id(self)
            .as_bytes()
            .first()
            .is_some_and(|&c| c == b'_' || c.is_ascii_alphabetic())
    }

    /// Whether this id is a literal: `true`, `false`, or a dynamic numeric
    /// or double-quoted string spelling.
    pub fn is_literal(self, map: &Map) -> bool {
        if self.is_builtin() {
            return matches!(self, Id::TRUE | Id::FALSE);
        }
        map.by_id(self)
            .as_bytes()
            .first()
            .is_some_and(|&c| c == b'"' || c.is_ascii_digit())
    }

    pub fn is_num_literal(self, map: &Map) -> bool {
        !self.is_builtin()
            && map
                .by_id(self)
                .as_bytes()
                .first()
                .is_some_and(|c| c.is_ascii_digit())
    }

    pub fn is_dq_str_literal(self, map: &Map) -> bool {
        !self.is_builtin() && map.by_id(self).as_bytes().first() == Some(&b'"')
    }
}

/// Spellings for every built-in id. The single source of truth: the [`Map`]
/// seeds its id-to-name table from this, and the lexer keys keyword
/// recognition off the same entries.
pub const BUILT_INS: &[(Id, &str)] = &[
    (Id::SEMICOLON, ";"),
    (Id::COLON, ":"),
    (Id::COMMA, ","),
    (Id::DOT, "."),
    (Id::DOT_DOT, ".."),
    (Id::DOT_DOT_EQ, "..="),
    (Id::OPEN_PAREN, "("),
    (Id::CLOSE_PAREN, ")"),
    (Id::OPEN_BRACKET, "["),
    (Id::CLOSE_BRACKET, "]"),
    (Id::OPEN_CURLY, "{"),
    (Id::CLOSE_CURLY, "}"),
    (Id::OPEN_DOUBLE_CURLY, "{{"),
    (Id::CLOSE_DOUBLE_CURLY, "}}"),
    (Id::EXCLAM, "!"),
    (Id::QUESTION, "?"),
    (Id::EQ, "="),
    (Id::EQ_QUESTION, "=?"),
    (Id::PLUS_EQ, "+="),
    (Id::MINUS_EQ, "-="),
    (Id::STAR_EQ, "*="),
    (Id::SLASH_EQ, "/="),
    (Id::PERCENT_EQ, "%="),
    (Id::SHIFT_L_EQ, "<<="),
    (Id::SHIFT_R_EQ, ">>="),
    (Id::AMP_EQ, "&="),
    (Id::PIPE_EQ, "|="),
    (Id::CARET_EQ, "^="),
    (Id::PLUS, "+"),
    (Id::MINUS, "-"),
    (Id::STAR, "*"),
    (Id::SLASH, "/"),
    (Id::PERCENT, "%"),
    (Id::SHIFT_L, "<<"),
    (Id::SHIFT_R, ">>"),
    (Id::AMP, "&"),
    (Id::PIPE, "|"),
    (Id::CARET, "^"),
    (Id::EQ_EQ, "=="),
    (Id::NOT_EQ, "!="),
    (Id::LESS_THAN, "<"),
    (Id::LESS_EQ, "<="),
    (Id::GREATER_THAN, ">"),
    (Id::GREATER_EQ, ">="),
    (Id::AND, "and"),
    (Id::OR, "or"),
    (Id::AS, "as"),
    (Id::NOT, "not"),
    (Id::USE, "use"),
    (Id::PUB, "pub"),
    (Id::PRI, "pri"),
    (Id::CONST, "const"),
    (Id::FUNC, "func"),
    (Id::STATUS, "status"),
    (Id::STRUCT, "struct"),
    (Id::IMPLEMENTS, "implements"),
    (Id::VAR, "var"),
    (Id::ASSERT, "assert"),
    (Id::CHOOSE, "choose"),
    (Id::PRE, "pre"),
    (Id::INV, "inv"),
    (Id::POST, "post"),
    (Id::VIA, "via"),
    (Id::BREAK, "break"),
    (Id::CONTINUE, "continue"),
    (Id::IF, "if"),
    (Id::ELSE, "else"),
    (Id::RETURN, "return"),
    (Id::YIELD, "yield"),
    (Id::WHILE, "while"),
    (Id::ENDWHILE, "endwhile"),
    (Id::ITERATE, "iterate"),
    (Id::IO_BIND, "io_bind"),
    (Id::IO_LIMIT, "io_limit"),
    (Id::CHOOSY, "choosy"),
    (Id::NPTR, "nptr"),
    (Id::PTR, "ptr"),
    (Id::ARRAY, "array"),
    (Id::ROARRAY, "roarray"),
    (Id::SLICE, "slice"),
    (Id::ROSLICE, "roslice"),
    (Id::TABLE, "table"),
    (Id::ROTABLE, "rotable"),
    (Id::BASE, "base"),
    (Id::IO, "io"),
    (Id::DATA, "data"),
    (Id::LIMIT, "limit"),
    (Id::HISTORY_POSITION, "history_position"),
    (Id::LENGTH, "length"),
    (Id::ADVANCE, "advance"),
    (Id::UNROLL, "unroll"),
    (Id::LIKELY, "likely"),
    (Id::UNLIKELY, "unlikely"),
    (Id::ARGS, "args"),
    (Id::THIS, "this"),
    (Id::COROUTINE_RESUMED, "coroutine_resumed"),
    (Id::CPU_ARCH, "cpu_arch"),
    (Id::INITIALIZE, "initialize"),
    (Id::RESET, "reset"),
    (Id::I8, "i8"),
    (Id::I16, "i16"),
    (Id::I32, "i32"),
    (Id::I64, "i64"),
    (Id::U8, "u8"),
    (Id::U16, "u16"),
    (Id::U32, "u32"),
    (Id::U64, "u64"),
    (Id::X86_SSE42, "x86_sse42"),
    (Id::X86_AVX2, "x86_avx2"),
    (Id::ARM_CRC32, "arm_crc32"),
    (Id::ARM_NEON, "arm_neon"),
    (Id::TRUE, "true"),
    (Id::FALSE, "false"),
    (Id::X_UNARY_PLUS, "+"),
    (Id::X_UNARY_MINUS, "-"),
    (Id::X_UNARY_NOT, "not"),
    (Id::X_BINARY_PLUS, "+"),
    (Id::X_BINARY_MINUS, "-"),
    (Id::X_BINARY_STAR, "*"),
    (Id::X_BINARY_SLASH, "/"),
    (Id::X_BINARY_PERCENT, "%"),
    (Id::X_BINARY_SHIFT_L, "<<"),
    (Id::X_BINARY_SHIFT_R, ">>"),
    (Id::X_BINARY_AMP, "&"),
    (Id::X_BINARY_PIPE, "|"),
    (Id::X_BINARY_CARET, "^"),
    (Id::X_BINARY_EQ_EQ, "=="),
    (Id::X_BINARY_NOT_EQ, "!="),
    (Id::X_BINARY_LESS_THAN, "<"),
    (Id::X_BINARY_LESS_EQ, "<="),
    (Id::X_BINARY_GREATER_THAN, ">"),
    (Id::X_BINARY_GREATER_EQ, ">="),
    (Id::X_BINARY_AND, "and"),
    (Id::X_BINARY_OR, "or"),
    (Id::X_BINARY_AS, "as"),
    (Id::X_ASSOCIATIVE_PLUS, "+"),
    (Id::X_ASSOCIATIVE_STAR, "*"),
    (Id::X_ASSOCIATIVE_AMP, "&"),
    (Id::X_ASSOCIATIVE_PIPE, "|"),
    (Id::X_ASSOCIATIVE_CARET, "^"),
    (Id::X_ASSOCIATIVE_AND, "and"),
    (Id::X_ASSOCIATIVE_OR, "or"),
];

/// The process-scoped interner mapping `Id ↔ spelling`.
///
/// Built-in spellings are seeded from [`BUILT_INS`]; dynamic spellings get
/// ids counting up from [`Id::DYNAMIC_BASE`] in insertion order. The parser
/// only ever reads from the map; the lexer is the writer.
pub struct Map {
    by_builtin_name: HashMap<&'static str, Id>,
    builtin_names: Vec<&'static str>,
    dynamic: IndexSet<Box<str>>,
}

impl Map {
    pub fn new() -> Map {
        let mut by_builtin_name = HashMap::with_capacity(BUILT_INS.len());
        let mut builtin_names = vec![""; Id::DYNAMIC_BASE as usize];
        for &(id, name) in BUILT_INS {
            builtin_names[id.0 as usize] = name;
            // Operator x-forms share spellings with their tokens; the first
            // entry (the token) wins the name lookup.
            by_builtin_name.entry(name).or_insert(id);
        }
        Map {
            by_builtin_name,
            builtin_names,
            dynamic: IndexSet::new(),
        }
    }

    /// Intern `name`, returning its existing id if already known.
    pub fn insert(&mut self, name: &str) -> Id {
        if let Some(&id) = self.by_builtin_name.get(name) {
            return id;
        }
        if let Some(index) = self.dynamic.get_index_of(name) {
            return Id(Id::DYNAMIC_BASE + index as u32);
        }
        let (index, _) = self.dynamic.insert_full(Box::from(name));
        Id(Id::DYNAMIC_BASE + index as u32)
    }

    /// Look up an already-interned spelling; [`Id::INVALID`] if absent.
    pub fn by_name(&self, name: &str) -> Id {
        if let Some(&id) = self.by_builtin_name.get(name) {
            return id;
        }
        match self.dynamic.get_index_of(name) {
            Some(index) => Id(Id::DYNAMIC_BASE + index as u32),
            None => Id::INVALID,
        }
    }

    /// The spelling of `id`, or `""` for [`Id::INVALID`] and unknown ids.
    pub fn by_id(&self, id: Id) -> &str {
        if id.is_builtin() {
            return self.builtin_names[id.0 as usize];
        }
        self.dynamic
            .get_index((id.0 - Id::DYNAMIC_BASE) as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }
}

impl Default for Map {
    fn default() -> Map {
        Map::new()
    }
}

/// Unescape a double-quoted string literal spelling (quotes included).
///
/// Returns `None` when the spelling is not a well-formed literal. The
/// supported escapes are `\n`, `\r`, `\t`, `\0`, `\\` and `\"`.
pub fn unescape(s: &str) -> Option<String> {
    let body = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_round_trip() {
        let map = Map::new();
        assert_eq!(map.by_name("while"), Id::WHILE);
        assert_eq!(map.by_id(Id::WHILE), "while");
        assert_eq!(map.by_id(Id::INVALID), "");
    }

    #[test]
    fn test_dynamic_interning_is_stable() {
        let mut map = Map::new();
        let a = map.insert("decode_frame");
        let b = map.insert("dst");
        assert_ne!(a, b);
        assert_eq!(map.insert("decode_frame"), a);
        assert_eq!(map.by_id(a), "decode_frame");
        assert!(!a.is_builtin());
    }

    #[test]
    fn test_classification_predicates() {
        let mut map = Map::new();
        let ident = map.insert("dst");
        let num = map.insert("42");
        let string = map.insert("\"@bad receiver\"");

        assert!(ident.is_ident(&map));
        assert!(!ident.is_literal(&map));
        assert!(num.is_literal(&map));
        assert!(num.is_num_literal(&map));
        assert!(string.is_dq_str_literal(&map));
        assert!(!string.is_num_literal(&map));

        assert!(Id::ARGS.is_ident(&map));
        assert!(Id::U8.is_ident(&map));
        assert!(!Id::WHILE.is_ident(&map));
        assert!(Id::TRUE.is_literal(&map));
        assert!(!Id::TRUE.is_ident(&map));
    }

    #[test]
    fn test_operator_forms() {
        assert_eq!(Id::PLUS.binary_form(), Id::X_BINARY_PLUS);
        assert_eq!(Id::PLUS.associative_form(), Id::X_ASSOCIATIVE_PLUS);
        assert_eq!(Id::MINUS.associative_form(), Id::INVALID);
        assert_eq!(Id::NOT.unary_form(), Id::X_UNARY_NOT);
        assert!(Id::AS.is_binary_op());
        assert!(!Id::NOT.is_binary_op());
        assert!(Id::EQ_QUESTION.is_assign());
        assert!(!Id::EQ_EQ.is_assign());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\"@too much data\"").as_deref(), Some("@too much data"));
        assert_eq!(unescape("\"a\\nb\"").as_deref(), Some("a\nb"));
        assert_eq!(unescape("no quotes"), None);
        assert_eq!(unescape("\"bad \\q escape\""), None);
    }
}
