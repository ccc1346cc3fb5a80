// tests/parser_tests.rs

use tq_lang::ast::{CmpOp, Expr};
use tq_lang::error::SyntaxErrorKind;
use tq_lang::lexer::Lexer;
use tq_lang::options::Options;
use tq_lang::parser::{Parser, parse, parse_with};
use tq_lang::value::Value;

fn field(name: &str) -> Expr {
    Expr::field(name)
}

fn pipe(left: Expr, right: Expr) -> Expr {
    Expr::pipe(left, right)
}

fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

// ============================================================================
// Core path grammar
// ============================================================================

#[test]
fn test_identity() {
    assert_eq!(parse(".").unwrap(), Expr::Identity);
}

#[test]
fn test_empty_and_blank_queries_are_identity() {
    assert_eq!(parse("").unwrap(), Expr::Identity);
    assert_eq!(parse("   ").unwrap(), Expr::Identity);
}

#[test]
fn test_single_field() {
    assert_eq!(parse(".metadata").unwrap(), field("metadata"));
}

#[test]
fn test_field_chain() {
    assert_eq!(
        parse(".metadata.count").unwrap(),
        pipe(field("metadata"), field("count"))
    );
}

#[test]
fn test_field_then_iterate() {
    assert_eq!(
        parse(".users[]").unwrap(),
        pipe(field("users"), Expr::Iterate)
    );
}

#[test]
fn test_iterate_then_field_is_left_nested() {
    // Pipe(Pipe(Field(users), Iterate), Field(email))
    assert_eq!(
        parse(".users[].email").unwrap(),
        pipe(pipe(field("users"), Expr::Iterate), field("email"))
    );
}

#[test]
fn test_nested_iteration() {
    assert_eq!(
        parse(".users[].roles[]").unwrap(),
        pipe(
            pipe(pipe(field("users"), Expr::Iterate), field("roles")),
            Expr::Iterate
        )
    );
}

#[test]
fn test_bare_dot_with_brackets() {
    assert_eq!(parse(".[]").unwrap(), Expr::Iterate);
    assert_eq!(parse(".[3]").unwrap(), Expr::Index(3));
    assert_eq!(parse(".[-1]").unwrap(), Expr::Index(-1));
}

#[test]
fn test_index_after_field() {
    assert_eq!(
        parse(".items[0][1]").unwrap(),
        pipe(pipe(field("items"), Expr::Index(0)), Expr::Index(1))
    );
}

#[test]
fn test_whitespace_around_query() {
    assert_eq!(parse("  .users[].email \n").unwrap(), parse(".users[].email").unwrap());
}

// ============================================================================
// Extended path syntax
// ============================================================================

#[test]
fn test_slices() {
    assert_eq!(
        parse(".[1:3]").unwrap(),
        Expr::Slice {
            start: Some(1),
            end: Some(3)
        }
    );
    assert_eq!(
        parse(".[:-1]").unwrap(),
        Expr::Slice {
            start: None,
            end: Some(-1)
        }
    );
    assert_eq!(
        parse(".[2:]").unwrap(),
        Expr::Slice {
            start: Some(2),
            end: None
        }
    );
    assert_eq!(
        parse(".[:]").unwrap(),
        Expr::Slice {
            start: None,
            end: None
        }
    );
}

#[test]
fn test_quoted_keys() {
    assert_eq!(parse(r#"."first name""#).unwrap(), field("first name"));
    assert_eq!(
        parse(r#".user["first name"]"#).unwrap(),
        pipe(field("user"), field("first name"))
    );
    assert_eq!(parse(r#".["a.b"]"#).unwrap(), field("a.b"));
}

#[test]
fn test_keywords_are_field_names_after_dot() {
    assert_eq!(parse(".and").unwrap(), field("and"));
    assert_eq!(parse(".null.true").unwrap(), pipe(field("null"), field("true")));
    assert_eq!(parse(".select").unwrap(), field("select"));
}

#[test]
fn test_recursive_descent() {
    assert_eq!(parse("..").unwrap(), Expr::RecursiveDescent);
    assert_eq!(
        parse("..|.a?").unwrap(),
        pipe(
            Expr::RecursiveDescent,
            Expr::Optional(Box::new(field("a")))
        )
    );
}

#[test]
fn test_optional_wraps_accumulated_term() {
    assert_eq!(
        parse(".a[]?").unwrap(),
        Expr::Optional(Box::new(pipe(field("a"), Expr::Iterate)))
    );
    assert_eq!(
        parse(".a?.b").unwrap(),
        pipe(Expr::Optional(Box::new(field("a"))), field("b"))
    );
    assert_eq!(parse(".?").unwrap(), Expr::Optional(Box::new(Expr::Identity)));
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_explicit_pipe_matches_chained_path() {
    assert_eq!(
        parse(".users | .[] | .email").unwrap(),
        parse(".users[].email").unwrap()
    );
}

#[test]
fn test_comma_binds_tighter_than_pipe() {
    assert_eq!(
        parse(".a, .b | .c").unwrap(),
        pipe(Expr::comma(field("a"), field("b")), field("c"))
    );
}

#[test]
fn test_parentheses_group() {
    assert_eq!(
        parse(".a | (.b | .c)").unwrap(),
        pipe(field("a"), pipe(field("b"), field("c")))
    );
    assert_eq!(
        parse("(.a, .b)[0]").unwrap(),
        pipe(Expr::comma(field("a"), field("b")), Expr::Index(0))
    );
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_comparison() {
    let expr = parse(r#".status == "active""#).unwrap();
    assert_eq!(
        expr,
        Expr::Compare {
            op: CmpOp::Equal,
            left: Box::new(field("status")),
            right: Box::new(lit("active")),
        }
    );
}

#[test]
fn test_all_comparison_operators() {
    let test_cases = vec![
        ("==", CmpOp::Equal),
        ("!=", CmpOp::NotEqual),
        ("<", CmpOp::LessThan),
        (">", CmpOp::GreaterThan),
        ("<=", CmpOp::LessEqual),
        (">=", CmpOp::GreaterEqual),
    ];

    for (symbol, op) in test_cases {
        let query = format!(".x {} 1", symbol);
        match &parse(&query).unwrap() {
            Expr::Compare { op: parsed, .. } => assert_eq!(*parsed, op, "Failed for {}", symbol),
            other => panic!("Expected comparison for {}, got {:?}", symbol, other),
        }
    }
}

#[test]
fn test_literals() {
    assert_eq!(parse("42").unwrap(), lit(42i64));
    assert_eq!(parse("-42").unwrap(), lit(-42i64));
    assert_eq!(parse("-1.5").unwrap(), lit(-1.5));
    assert_eq!(parse("true").unwrap(), lit(true));
    assert_eq!(parse("null").unwrap(), Expr::Literal(Value::Null));
    assert_eq!(parse(r#""hi""#).unwrap(), lit("hi"));
}

#[test]
fn test_and_binds_tighter_than_or() {
    // a or (b and c)
    match &parse(".a or .b and .c").unwrap() {
        Expr::Or(left, right) => {
            assert_eq!(**left, field("a"));
            assert!(matches!(**right, Expr::And(..)));
        }
        other => panic!("Expected or, got {:?}", other),
    }
}

#[test]
fn test_spaced_dot_before_keyword_is_identity() {
    assert_eq!(
        parse(". and .x").unwrap(),
        Expr::And(Box::new(Expr::Identity), Box::new(field("x")))
    );
}

#[test]
fn test_suffixes_may_be_spaced_from_their_term() {
    let expected = pipe(pipe(field("a"), field("b")), Expr::Index(0));
    assert_eq!(parse(".a .b [0]").unwrap(), expected);
    assert_eq!(parse(".a\n.b\t[0]").unwrap(), expected);
    assert_eq!(
        parse(".a []?").unwrap(),
        Expr::Optional(Box::new(pipe(field("a"), Expr::Iterate)))
    );
}

#[test]
fn test_field_name_is_glued_to_its_dot() {
    let err = parse(". a").unwrap_err();
    assert_eq!(err.position, 2);

    let err = parse(".a . b").unwrap_err();
    assert_eq!(err.position, 5);
}

#[test]
fn test_select_and_not() {
    assert_eq!(
        parse(".users[] | select(.active | not)").unwrap(),
        pipe(
            pipe(field("users"), Expr::Iterate),
            Expr::Select(Box::new(pipe(field("active"), Expr::Not)))
        )
    );
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn test_unterminated_bracket_points_at_end_of_input() {
    let err = parse(".users[").unwrap_err();
    assert!(matches!(err.kind, SyntaxErrorKind::UnexpectedEof { .. }));
    assert_eq!(err.position, 7);
}

#[test]
fn test_unclosed_index() {
    let err = parse(".users[0").unwrap_err();
    assert!(matches!(err.kind, SyntaxErrorKind::UnexpectedEof { .. }));
    assert_eq!(err.position, 8);
}

#[test]
fn test_trailing_tokens_are_rejected() {
    let err = parse(".a ]").unwrap_err();
    assert_eq!(
        err.kind,
        SyntaxErrorKind::UnexpectedToken {
            found: "']'".to_string(),
            expected: "end of input",
        }
    );
    assert_eq!(err.position, 3);
}

#[test]
fn test_dangling_pipe() {
    let err = parse(".a |").unwrap_err();
    assert!(matches!(err.kind, SyntaxErrorKind::UnexpectedEof { .. }));
    assert_eq!(err.position, 4);
}

#[test]
fn test_field_name_must_follow_dot() {
    let err = parse(".a.[0]").unwrap_err();
    assert_eq!(err.position, 3);

    let err = parse(".a. b").unwrap_err();
    assert_eq!(err.position, 4);
}

#[test]
fn test_bad_bracket_content() {
    let err = parse(".[abc]").unwrap_err();
    assert_eq!(err.position, 2);
    assert!(matches!(err.kind, SyntaxErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_unknown_builtin() {
    let err = parse("length").unwrap_err();
    assert_eq!(err.position, 0);
}

#[test]
fn test_lexer_errors_surface_through_parser() {
    let err = parse(".a | .b @").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnexpectedCharacter('@'));
    assert_eq!(err.position, 8);
}

#[test]
fn test_parser_construction_reads_first_token() {
    let result = Parser::new(Lexer::new("#"));
    assert!(result.is_err());
}

// ============================================================================
// Nesting limit
// ============================================================================

#[test]
fn test_nesting_limit() {
    let options = Options::default().with_max_nesting(2);
    assert!(parse_with("((.a))", &options).is_ok());

    let err = parse_with("(((.a)))", &options).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::NestingTooDeep(2));
    assert_eq!(err.position, 2);
}

#[test]
fn test_nesting_counts_optionals_and_logical_chains() {
    let options = Options::default().with_max_nesting(2);
    assert!(parse_with(".a??", &options).is_ok());
    assert!(parse_with(".a???", &options).is_err());
    assert!(parse_with(".a or .b or .c", &options).is_ok());
    assert!(parse_with(".a or .b or .c or .d", &options).is_err());
}

#[test]
fn test_default_nesting_accepts_realistic_queries() {
    let query = (0..50)
        .map(|i| format!(".kind == {}", i))
        .collect::<Vec<_>>()
        .join(" or ");
    assert!(parse(&query).is_ok());
}

// ============================================================================
// Long paths
// ============================================================================

#[test]
fn test_long_path_parses_and_drops() {
    let query = ".a".repeat(100_000);
    let expr = parse(&query).unwrap();
    assert!(matches!(&expr, Expr::Pipe(_, right) if **right == field("a")));
    drop(expr);
}
