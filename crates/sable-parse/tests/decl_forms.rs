//! Top-level declaration tests: `use`, `const`, `func`, `status`, `struct`.

use sable_ast::{Effect, Flags, Node, File};
use sable_parse::{parse_file, Options, ParseError};
use sable_token::Map;

fn parse_with(src: &str, options: Options) -> Result<(Map, File), ParseError> {
    let mut map = Map::new();
    let tokens = sable_lexer::tokenize(&mut map, "test.sable", src).expect("lex should succeed");
    parse_file(&map, "test.sable", &tokens, options).map(|f| (map, f))
}

fn parse_ok(src: &str) -> (Map, File) {
    parse_with(src, Options::default()).expect("parse should succeed")
}

fn expect_error(src: &str) -> ParseError {
    match parse_with(src, Options::default()) {
        Ok(_) => panic!("expected parse error, but parsing succeeded"),
        Err(e) => e,
    }
}

// =============================================================================
// use
// =============================================================================

#[test]
fn test_use_decl() {
    let (map, file) = parse_ok("use \"std/crc32\";\n");
    assert_eq!(file.decls.len(), 1);
    match &file.decls[0] {
        Node::Use(u) => {
            assert_eq!(map.by_id(u.path), "\"std/crc32\"");
            assert_eq!(u.loc.line, 1);
        }
        other => panic!("expected use node, got {:?}", other),
    }
}

#[test]
fn test_use_path_must_be_string() {
    let e = expect_error("use 42;\n");
    assert_eq!(
        e.to_string(),
        "parse: expected \"-string literal, got \"42\" at test.sable:1"
    );
}

// =============================================================================
// const
// =============================================================================

#[test]
fn test_const_decl() {
    let (map, file) = parse_ok("pub const FOO : base.u8 = 42;\n");
    assert_eq!(file.decls.len(), 1);
    match &file.decls[0] {
        Node::Const(c) => {
            assert!(c.flags.contains(Flags::PUBLIC));
            assert_eq!(map.by_id(c.name), "FOO");
            assert_eq!(c.loc.line, 1);
            assert_eq!(map.by_id(c.value.ident), "42");
        }
        other => panic!("expected const node, got {:?}", other),
    }
}

#[test]
fn test_const_private() {
    let (_, file) = parse_ok("pri const FOO : base.u8 = 42;\n");
    match &file.decls[0] {
        Node::Const(c) => assert!(!c.flags.contains(Flags::PUBLIC)),
        other => panic!("expected const node, got {:?}", other),
    }
}

#[test]
fn test_const_name_must_be_upper() {
    let e = expect_error("pub const foo : base.u8 = 1;\n");
    assert_eq!(
        e.to_string(),
        "parse: invalid const name \"foo\" at test.sable:1"
    );
}

#[test]
fn test_const_name_no_leading_double_underscore() {
    let e = expect_error("pub const __FOO : base.u8 = 1;\n");
    assert_eq!(e.message, "invalid const name \"__FOO\"");
}

#[test]
fn test_const_requires_value() {
    let e = expect_error("pub const FOO : base.u8;\n");
    assert_eq!(e.message, "const \"FOO\" has no value");
}

#[test]
fn test_const_list_value() {
    let (_, file) = parse_ok("pri const TABLE : array[4] base.u32 = [0, 1, 2, 3];\n");
    match &file.decls[0] {
        Node::Const(c) => {
            assert_eq!(c.value.operator, sable_ast::OP_LIST);
            assert_eq!(c.value.args.len(), 4);
        }
        other => panic!("expected const node, got {:?}", other),
    }
}

#[test]
fn test_const_nested_list_value() {
    let (_, file) = parse_ok("pri const T : array[2] array[2] base.u8 = [[1, 2], [3, 4]];\n");
    match &file.decls[0] {
        Node::Const(c) => {
            assert_eq!(c.value.args.len(), 2);
            let first = c.value.args[0].as_expr().expect("list element");
            assert_eq!(first.operator, sable_ast::OP_LIST);
        }
        other => panic!("expected const node, got {:?}", other),
    }
}

// =============================================================================
// func
// =============================================================================

#[test]
fn test_func_with_receiver_effect_and_out_type() {
    let src = "pri func p.q!(a : base.u8) base.u32 {\n    return 0\n}\n";
    let (map, file) = parse_ok(src);
    match &file.decls[0] {
        Node::Func(f) => {
            assert_eq!(map.by_id(f.receiver), "p");
            assert_eq!(map.by_id(f.name), "q");
            assert_eq!(f.effect(), Effect::Impure);
            assert_eq!(f.args.fields.len(), 1);
            let out = f.out.as_ref().expect("out type");
            assert_eq!(map.by_id(out.qid().0), "base");
            assert_eq!(map.by_id(out.qid().1), "u32");
            assert_eq!(f.body.len(), 1);
        }
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_func_free_standing_pure() {
    let (map, file) = parse_ok("pri func hash(x : base.u32) base.u32 {\n    return args.x\n}\n");
    match &file.decls[0] {
        Node::Func(f) => {
            assert_eq!(map.by_id(f.receiver), "");
            assert_eq!(f.effect(), Effect::Pure);
        }
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_func_coroutine() {
    let (_, file) = parse_ok("pub func d.decode?(src : base.u32) {\n    yield? \"$short read\"\n}\n");
    match &file.decls[0] {
        Node::Func(f) => {
            assert_eq!(f.effect(), Effect::ImpureCoroutine);
            assert!(f.flags.contains(Flags::PUBLIC));
        }
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_func_signature_asserts() {
    let src = "pri func f!(a : base.u8) base.u32,\n    pre a >= 1,\n    post a <= 9 {\n    return 0\n}\n";
    let (_, file) = parse_ok(src);
    match &file.decls[0] {
        Node::Func(f) => assert_eq!(f.asserts.len(), 2),
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_func_reserved_method_names() {
    let e = expect_error("pri func d.initialize!() {\n    x = 1\n}\n");
    assert_eq!(e.message, "cannot have a method named \"initialize\"");

    let e = expect_error("pri func d.reset!() {\n    x = 1\n}\n");
    assert_eq!(e.message, "cannot have a method named \"reset\"");
}

#[test]
fn test_func_reserved_names_allowed_with_option() {
    let opts = Options {
        allow_builtin_names: true,
        ..Options::default()
    };
    let r = parse_with("pri func d.initialize!() {\n    x = 1\n}\n", opts);
    assert!(r.is_ok(), "got {:?}", r.err());
}

#[test]
fn test_func_double_underscore_name() {
    let e = expect_error("pri func d.do__it!() {\n    x = 1\n}\n");
    assert_eq!(e.message, "double-underscore \"do__it\" used for func name");

    let opts = Options {
        allow_double_underscore_names: true,
        ..Options::default()
    };
    let r = parse_with("pri func d.do__it!() {\n    x = 1\n}\n", opts);
    assert!(r.is_ok(), "got {:?}", r.err());
}

#[test]
fn test_choosy_func() {
    let (_, file) = parse_ok("pri func d.crc!(), choosy {\n    x = 1\n}\n");
    match &file.decls[0] {
        Node::Func(f) => assert!(f.flags.contains(Flags::CHOOSY)),
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_choosy_cannot_be_pub() {
    let e = expect_error("pub func d.crc!(), choosy {\n    x = 1\n}\n");
    assert_eq!(e.message, "choosy function cannot be pub");
}

#[test]
fn test_choosy_cannot_be_coroutine() {
    let e = expect_error("pri func d.crc?(), choosy {\n    x = 1\n}\n");
    assert_eq!(e.message, "choosy function cannot be a coroutine");
}

#[test]
fn test_choose_cpu_arch_clause() {
    let (_, file) = parse_ok(
        "pri func d.crc_sse42!(), choose cpu_arch >= x86_sse42 {\n    x = 1\n}\n",
    );
    match &file.decls[0] {
        Node::Func(f) => assert!(f.flags.contains(Flags::HAS_CHOOSE_CPU_ARCH)),
        other => panic!("expected func node, got {:?}", other),
    }
}

#[test]
fn test_choose_condition_must_be_cpu_arch() {
    let e = expect_error("pri func d.crc!(), choose cpu_arch >= foo {\n    x = 1\n}\n");
    assert_eq!(e.message, "invalid \"choose\" condition");
}

#[test]
fn test_cpu_arch_func_cannot_be_public() {
    let e = expect_error("pub func d.crc!(), choose cpu_arch >= x86_sse42 {\n    x = 1\n}\n");
    assert_eq!(e.message, "cpu_arch function cannot be public");
}

#[test]
fn test_cpu_arch_func_cannot_be_choosy() {
    let e = expect_error(
        "pri func d.crc!(), choosy, choose cpu_arch >= x86_sse42 {\n    x = 1\n}\n",
    );
    assert_eq!(e.message, "cpu_arch function cannot be choosy");
}

// =============================================================================
// status
// =============================================================================

#[test]
fn test_status_decl() {
    let (map, file) = parse_ok("pub status \"@bad receiver\";\n");
    match &file.decls[0] {
        Node::Status(s) => {
            assert!(s.flags.contains(Flags::PUBLIC));
            assert_eq!(map.by_id(s.message), "\"@bad receiver\"");
        }
        other => panic!("expected status node, got {:?}", other),
    }
}

#[test]
fn test_status_sigils() {
    for sigil in ["@", "#", "$"] {
        let src = format!("pri status \"{}broken\";\n", sigil);
        let r = parse_with(&src, Options::default());
        assert!(r.is_ok(), "sigil {} should be accepted", sigil);
    }
}

#[test]
fn test_status_message_needs_sigil() {
    let e = expect_error("pub status \"broken\";\n");
    assert_eq!(
        e.to_string(),
        "parse: status message \"broken\" does not start with @, # or $ at test.sable:1"
    );
}

#[test]
fn test_status_message_must_be_string() {
    let e = expect_error("pub status broken;\n");
    assert_eq!(e.message, "expected \"-string literal, got \"broken\"");
}

// =============================================================================
// struct
// =============================================================================

#[test]
fn test_struct_decl() {
    let (map, file) = parse_ok("pri struct point(x : base.u32, y : base.u32);\n");
    match &file.decls[0] {
        Node::Struct(s) => {
            assert_eq!(map.by_id(s.name), "point");
            assert_eq!(s.fields.len(), 2);
            assert!(!s.flags.contains(Flags::CLASSY));
        }
        other => panic!("expected struct node, got {:?}", other),
    }
}

#[test]
fn test_classy_struct_with_implements() {
    let src = "pub struct decoder? implements base.hasher, base.io_transformer(\n    state : base.u32,\n);\n";
    let (_, file) = parse_ok(src);
    match &file.decls[0] {
        Node::Struct(s) => {
            assert!(s.flags.contains(Flags::CLASSY));
            assert_eq!(s.implements.len(), 2);
        }
        other => panic!("expected struct node, got {:?}", other),
    }
}

#[test]
fn test_struct_double_underscore_name() {
    let e = expect_error("pri struct a__b();\n");
    assert_eq!(e.message, "double-underscore \"a__b\" used for struct name");
}

#[test]
fn test_struct_extra_fields() {
    let src = "pri struct d?(\n    state : base.u32,\n) + (\n    buf : array[256] base.u8,\n    n : base.u64,\n);\n";
    let (_, file) = parse_ok(src);
    match &file.decls[0] {
        Node::Struct(s) => {
            assert_eq!(s.fields.len(), 3);
            let extra = s.fields[1].as_field().expect("field");
            assert!(extra.flags.contains(Flags::PRIVATE_DATA));
        }
        other => panic!("expected struct node, got {:?}", other),
    }
}

#[test]
fn test_extra_field_type_cannot_be_decorated() {
    let e = expect_error("pri struct d() + (buf : slice base.u8);\n");
    assert_eq!(
        e.message,
        "invalid extra-field type \"slice base.u8\""
    );
}

#[test]
fn test_extra_field_type_cannot_be_refined() {
    let e = expect_error("pri struct d() + (n : base.u8[0 ..= 9]);\n");
    assert_eq!(
        e.message,
        "invalid extra-field type \"base.u8[0 ..= 9]\""
    );
}

#[test]
fn test_extra_field_type_cannot_be_non_numeric_base() {
    let e = expect_error("pri struct d() + (r : base.io_reader);\n");
    assert_eq!(e.message, "invalid extra-field type \"base.io_reader\"");
}

#[test]
fn test_extra_field_foreign_struct_type_ok() {
    let r = parse_with("pri struct d() + (u : util.helper);\n", Options::default());
    assert!(r.is_ok(), "got {:?}", r.err());
}

#[test]
fn test_field_private_data_inference() {
    let (_, file) = parse_ok("pri struct s(r : other.reader, n : base.u32, m : local);\n");
    match &file.decls[0] {
        Node::Struct(s) => {
            let f0 = s.fields[0].as_field().unwrap();
            let f1 = s.fields[1].as_field().unwrap();
            let f2 = s.fields[2].as_field().unwrap();
            assert!(f0.flags.contains(Flags::PRIVATE_DATA));
            assert!(!f1.flags.contains(Flags::PRIVATE_DATA));
            assert!(!f2.flags.contains(Flags::PRIVATE_DATA));
        }
        other => panic!("expected struct node, got {:?}", other),
    }
}

#[test]
fn test_too_many_implements() {
    let list = (0..17).map(|i| format!("pkg.t{}", i)).collect::<Vec<_>>().join(", ");
    let src = format!("pri struct s implements {}();\n", list);
    let e = expect_error(&src);
    assert_eq!(e.message, "too many implements listed");
}

// =============================================================================
// file driver
// =============================================================================

#[test]
fn test_multiple_decls_in_order() {
    let src = "\
use \"std/crc32\";
pub status \"#truncated input\";
pri const LIMIT : base.u32 = 65536;
pri struct state(n : base.u32);
pri func state.step!() {
    this.n = this.n + 1
}
";
    let (_, file) = parse_ok(src);
    assert_eq!(file.decls.len(), 5);
    assert!(matches!(file.decls[0], Node::Use(_)));
    assert!(matches!(file.decls[1], Node::Status(_)));
    assert!(matches!(file.decls[2], Node::Const(_)));
    assert!(matches!(file.decls[3], Node::Struct(_)));
    assert!(matches!(file.decls[4], Node::Func(_)));
}

#[test]
fn test_unrecognized_top_level_decl() {
    let e = expect_error("while true { }\n");
    assert_eq!(
        e.to_string(),
        "parse: unrecognized top level declaration at test.sable:1"
    );
}

#[test]
fn test_unrecognized_after_visibility() {
    let e = expect_error("pub while();\n");
    assert_eq!(e.message, "unrecognized top level declaration");
}

#[test]
fn test_empty_file() {
    let (_, file) = parse_ok("");
    assert!(file.decls.is_empty());
}

#[test]
fn test_determinism() {
    let src = "pri func f!(a : base.u8) {\n    x = args.a + 1\n}\n";
    let mut map = Map::new();
    let tokens = sable_lexer::tokenize(&mut map, "test.sable", src).unwrap();
    let a = parse_file(&map, "test.sable", &tokens, Options::default()).unwrap();
    let b = parse_file(&map, "test.sable", &tokens, Options::default()).unwrap();
    assert_eq!(format!("{:?}", a), format!("{:?}", b));
}
