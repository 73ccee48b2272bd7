//! Stateless name and literal validators.

use sable_token::{Id, Map};

/// A valid const name is non-empty, does not begin with `__`, and contains
/// only `_`, digits and upper-case ASCII letters.
pub(crate) fn valid_const_name(s: &str) -> bool {
    let b = s.as_bytes();
    if b.is_empty() || (b.len() >= 2 && b[0] == b'_' && b[1] == b'_') {
        return false;
    }
    b.iter()
        .all(|&c| c == b'_' || c.is_ascii_digit() || c.is_ascii_uppercase())
}

pub(crate) fn contains_double_underscore(s: &str) -> bool {
    s.as_bytes().windows(2).any(|w| w == b"__")
}

/// Status messages must open with one of the three status sigils.
pub(crate) fn is_status_message(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b'@') | Some(b'#') | Some(b'$'))
}

/// If `id` is a numeric literal whose decimal spelling is an integer in
/// `[1 ..= 256]`, its value; otherwise 0.
///
/// Hexadecimal spellings and leading zeroes do not qualify.
pub(crate) fn as_small_positive_int_256(map: &Map, id: Id) -> u32 {
    if !id.is_num_literal(map) {
        return 0;
    }
    let s = map.by_id(id).as_bytes();
    if s.len() > 3 || s.is_empty() || !(b'1'..=b'9').contains(&s[0]) {
        return 0;
    }
    let mut n = u32::from(s[0] - b'0');
    for &c in &s[1..] {
        if !c.is_ascii_digit() {
            return 0;
        }
        n = 10 * n + u32::from(c - b'0');
    }
    if n > 256 {
        return 0;
    }
    n
}
