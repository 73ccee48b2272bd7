//! Type expression tests: decorators, nesting, and the numeric-only
//! refinement rule.

use sable_ast::{File, Node, TypeExpr};
use sable_parse::{parse_file, Options, ParseError};
use sable_token::{Id, Map};

fn parse_with(src: &str, options: Options) -> Result<(Map, File), ParseError> {
    let mut map = Map::new();
    let tokens = sable_lexer::tokenize(&mut map, "test.sable", src).expect("lex should succeed");
    parse_file(&map, "test.sable", &tokens, options).map(|f| (map, f))
}

/// Parse a type by planting it as a var declaration's type, then move the
/// parsed type expression out of the tree.
fn type_ok(type_src: &str) -> (Map, TypeExpr) {
    let src = format!("pri func d.f!() {{\n    var x : {}\n}}\n", type_src);
    let (map, file) = parse_with(&src, Options::default()).expect("parse should succeed");
    let Some(Node::Func(mut f)) = file.decls.into_iter().next() else {
        panic!("expected func");
    };
    let Node::Var(v) = f.body.remove(0) else {
        panic!("expected var");
    };
    (map, v.xtype)
}

fn type_err(type_src: &str) -> ParseError {
    let src = format!("pri func d.f!() {{\n    var x : {}\n}}\n", type_src);
    match parse_with(&src, Options::default()) {
        Ok(_) => panic!("expected parse error, but parsing succeeded"),
        Err(e) => e,
    }
}

// =============================================================================
// decorators
// =============================================================================

#[test]
fn test_plain_qualified_type() {
    let (map, t) = type_ok("base.u32");
    assert_eq!(t.decorator, Id::INVALID);
    assert_eq!(map.by_id(t.qid().0), "base");
    assert_eq!(map.by_id(t.qid().1), "u32");
    assert!(!t.is_refined());
}

#[test]
fn test_pointer_decorators() {
    let (_, t) = type_ok("ptr base.u8");
    assert_eq!(t.decorator, Id::PTR);
    assert_eq!(t.inner.as_ref().unwrap().qid().1, Id::U8);

    let (_, t) = type_ok("nptr slice base.u8");
    assert_eq!(t.decorator, Id::NPTR);
    assert_eq!(t.inner.as_ref().unwrap().decorator, Id::SLICE);
}

#[test]
fn test_array_decorator_with_length() {
    let (map, t) = type_ok("array[256] base.u8");
    assert_eq!(t.decorator, Id::ARRAY);
    let len = t.lhs.as_ref().expect("array length");
    assert_eq!(map.by_id(len.ident), "256");
    assert_eq!(t.innermost().qid().1, Id::U8);
}

#[test]
fn test_roarray_and_tables() {
    let (_, t) = type_ok("roarray[8] base.u32");
    assert_eq!(t.decorator, Id::ROARRAY);

    for (src, want) in [
        ("slice base.u8", Id::SLICE),
        ("roslice base.u8", Id::ROSLICE),
        ("table base.u8", Id::TABLE),
        ("rotable base.u8", Id::ROTABLE),
    ] {
        let (_, t) = type_ok(src);
        assert_eq!(t.decorator, want, "{}", src);
    }
}

#[test]
fn test_array_requires_bracketed_length() {
    let e = type_err("array base.u8");
    assert_eq!(e.message, "expected \"[\", got \"base\"");
}

// =============================================================================
// refinements
// =============================================================================

#[test]
fn test_refined_numeric_base_type() {
    let (map, t) = type_ok("base.u32[0 ..= 9999]");
    assert!(t.is_refined());
    assert_eq!(map.by_id(t.lhs.as_ref().unwrap().ident), "0");
    assert_eq!(map.by_id(t.mhs.as_ref().unwrap().ident), "9999");
}

#[test]
fn test_half_open_refinements() {
    let (_, t) = type_ok("base.u8[1 ..=]");
    assert!(t.lhs.is_some());
    assert!(t.mhs.is_none());

    let (_, t) = type_ok("base.u8[..= 16]");
    assert!(t.lhs.is_none());
    assert!(t.mhs.is_some());
}

#[test]
fn test_refinement_on_non_numeric_rejected() {
    let e = type_err("base.io_reader[0 ..= 1]");
    assert_eq!(e.message, "cannot refine non-numeric type");

    let e = type_err("foo.bar[0 ..= 1]");
    assert_eq!(e.message, "cannot refine non-numeric type");
}

#[test]
fn test_unqualified_numeric_refinement_needs_option() {
    let e = type_err("u8[0 ..= 1]");
    assert_eq!(e.message, "cannot refine non-numeric type");

    let src = "pri func d.f!() {\n    var x : u8[0 ..= 1]\n}\n";
    let opts = Options {
        allow_builtin_names: true,
        ..Options::default()
    };
    assert!(parse_with(src, opts).is_ok());
}

#[test]
fn test_refinement_uses_range_eq_separator() {
    let e = type_err("base.u8[0 .. 1]");
    assert_eq!(e.message, "expected \"..=\", got \"..\"");
}
