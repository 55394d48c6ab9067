//! Conditional compilation behavior through the full pipeline.

mod common;

use common::{preprocess_default, preprocess_err, preprocess_with};
use shaderpp::PreprocessorOptions;

#[test]
fn test_ifdef_takes_branch_when_defined() {
    let src = "#define HAS_NORMALS\n#ifdef HAS_NORMALS\nvec3 n;\n#endif\n";
    assert_eq!(preprocess_default(src), "vec3 n;\n");
}

#[test]
fn test_ifdef_skips_branch_when_undefined() {
    assert_eq!(preprocess_default("#ifdef MISSING\nvec3 n;\n#endif\n"), "");
}

#[test]
fn test_ifndef_inverts() {
    assert_eq!(
        preprocess_default("#ifndef MISSING\nfallback();\n#endif\n"),
        "fallback();\n"
    );
}

#[test]
fn test_elif_chain_takes_first_true() {
    let src = "#define LEVEL 2\n#if LEVEL == 1\nlow\n#elif LEVEL == 2\nmid\n#elif LEVEL == 3\nhigh\n#endif\n";
    assert_eq!(preprocess_default(src), "mid\n");
}

#[test]
fn test_else_when_nothing_matches() {
    let src = "#if 0\na\n#elif 0\nb\n#else\nfallback\n#endif\n";
    assert_eq!(preprocess_default(src), "fallback\n");
}

#[test]
fn test_defined_with_and_without_parens() {
    let src = "#define A\n#define B\n#if defined(A) && defined B\nboth\n#endif\n";
    assert_eq!(preprocess_default(src), "both\n");
}

#[test]
fn test_not_defined() {
    let src = "#if !defined(MISSING)\nok\n#endif\n";
    assert_eq!(preprocess_default(src), "ok\n");
}

#[test]
fn test_macro_expands_inside_if_expression() {
    let src = "#define SAMPLES 4\n#if SAMPLES * 2 == 8\neight\n#endif\n";
    assert_eq!(preprocess_default(src), "eight\n");
}

#[test]
fn test_undefined_name_evaluates_like_zero() {
    let src = "#if MISSING + 1 == 1\nzeroish\n#endif\n";
    assert_eq!(preprocess_default(src), "zeroish\n");
}

#[test]
fn test_undef_changes_later_conditionals() {
    let src = "#define F\n#ifdef F\nfirst\n#endif\n#undef F\n#ifdef F\nsecond\n#endif\n";
    assert_eq!(preprocess_default(src), "first\n");
}

#[test]
fn test_define_in_taken_branch_escapes_conditional() {
    let src = "#if 1\n#define INNER 7\n#endif\nINNER\n";
    assert_eq!(preprocess_default(src), "7\n");
}

#[test]
fn test_define_in_skipped_branch_never_happens() {
    let src = "#if 0\n#define INNER 7\n#endif\nINNER\n";
    assert_eq!(preprocess_default(src), "INNER\n");
}

#[test]
fn test_deeply_nested_conditionals() {
    let src = "\
#define A
#define B
#ifdef A
  #ifdef B
    #ifdef C
x
    #else
y
    #endif
  #endif
#endif
";
    assert_eq!(preprocess_default(src), "y\n");
}

#[test]
fn test_short_circuit_protects_division() {
    let src = "#define D 0\n#if D != 0 && 1 / D\nx\n#else\nsafe\n#endif\n";
    assert_eq!(preprocess_default(src), "safe\n");
}

#[test]
fn test_division_by_zero_reports_error() {
    let err = preprocess_err("#if 1 / 0\nx\n#endif\n", &PreprocessorOptions::default());
    assert_eq!(err.to_string(), "Division by zero in conditional expression");
}

#[test]
fn test_bitwise_and_shift_operators() {
    let src = "#if (1 << 4) | 2 == 18 - (16 ^ 0)\nx\n#else\ny\n#endif\n";
    // == binds tighter than |, so this is 16 | (2 == 2).
    assert_eq!(preprocess_default(src), "x\n");
}

#[test]
fn test_unterminated_conditional_is_syntax_error() {
    let err = preprocess_err("#ifdef A\nx\n", &PreprocessorOptions::default());
    assert!(err.to_string().contains("Syntax error"));
}

#[test]
fn test_error_directive_in_skipped_branch_is_inert() {
    let options = PreprocessorOptions {
        stop_on_error: true,
        ..PreprocessorOptions::default()
    };
    let src = "#if 0\n#error unreachable\n#endif\nok\n";
    assert_eq!(preprocess_with(src, &options).unwrap(), "ok\n");
}

#[test]
fn test_error_directive_in_taken_branch_fires() {
    let options = PreprocessorOptions {
        stop_on_error: true,
        ..PreprocessorOptions::default()
    };
    let err = preprocess_err("#if 1\n#error boom\n#endif\n", &options);
    assert_eq!(err.to_string(), "boom");
}
