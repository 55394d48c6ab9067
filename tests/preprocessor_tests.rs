//! End-to-end preprocessor scenarios.
//!
//! Each test drives the full pipeline (comment stripping, parsing, the
//! directive walk, generation) and asserts the exact output text, so these
//! double as the contract for line and whitespace preservation.

mod common;

use common::{preprocess_default, preprocess_err};
use shaderpp::PreprocessorOptions;

#[test]
fn test_chained_object_defines() {
    assert_eq!(preprocess_default("#define X Y\n#define Y Z\nX"), "Z");
}

#[test]
fn test_if_with_arithmetic() {
    assert_eq!(
        preprocess_default("\n#if 1 + 1 > 0\ntrue\n#endif\n"),
        "\ntrue\n"
    );
}

#[test]
fn test_nested_conditional_selects_inner_branch() {
    let src = "#define MACRO\n#ifdef NOT_DEFINED\nA\n#else\n  #ifdef MACRO\nB\n  #endif\n#endif\n";
    assert_eq!(preprocess_default(src), "B\n");
}

#[test]
fn test_self_referential_function_macro_terminates() {
    assert_eq!(preprocess_default("#define foo() foo()\nfoo()"), "\nfoo()");
}

#[test]
fn test_token_pasting_in_function_macro() {
    let src = "#define COMMAND(NAME) { NAME, NAME ## _command ## x ## y }\nCOMMAND(x)";
    assert_eq!(preprocess_default(src), "\n{ x, x_commandxy }");
}

#[test]
fn test_function_macro_argument_expansion() {
    let src = "#define foo( a, b ) a + b\nfoo(x + y, (z-t))";
    assert_eq!(preprocess_default(src), "\nx + y + (z-t)");
}

#[test]
fn test_function_macro_arity_error() {
    let src = "#define foo( a, b ) a + b\nfoo(1,2,3)";
    let err = preprocess_err(src, &PreprocessorOptions::default());
    assert_eq!(err.to_string(), "'foo': Too many arguments for macro");
}

#[test]
fn test_empty_define_expands_to_nothing() {
    assert_eq!(preprocess_default("#define X\nX"), "");
}

#[test]
fn test_unrelated_identifier_untouched() {
    assert_eq!(preprocess_default("#define X\nY"), "Y");
}

#[test]
fn test_macro_free_source_is_byte_identical() {
    let src = "precision highp float;\n\nvoid main() {\n  gl_FragColor = vec4(1.0, 0.5, 0.2, 1.0);\n}\n";
    assert_eq!(preprocess_default(src), src);
}

#[test]
fn test_seeded_define_does_not_touch_free_source() {
    let options = PreprocessorOptions {
        defines: vec![("WIDTH".to_string(), "1024".to_string())],
        ..PreprocessorOptions::default()
    };
    let src = "void main() {\n  float w = 2.0;\n}\n";
    assert_eq!(common::preprocess_with(src, &options).unwrap(), src);
}

#[test]
fn test_line_count_only_drops_removed_directive_lines() {
    let src = "a\n#define X 1\nb\n#if 1\nc\n#endif\nd\n";
    let out = preprocess_default(src);
    assert_eq!(out, "a\nb\nc\nd\n");
    let removed_directive_lines = 3; // #define, #if, #endif
    assert_eq!(
        out.matches('\n').count(),
        src.matches('\n').count() - removed_directive_lines
    );
}

#[test]
fn test_version_and_extension_survive() {
    let src = "#version 300 es\n#extension GL_OES_standard_derivatives : enable\nvoid main() {}\n";
    assert_eq!(preprocess_default(src), src);
}

#[test]
fn test_word_boundary_expansion() {
    let src = "#define light 1\nlighting light lighter\n";
    assert_eq!(preprocess_default(src), "lighting 1 lighter\n");
}

#[test]
fn test_defines_apply_inside_later_text_only() {
    let src = "X\n#define X 1\nX\n";
    assert_eq!(preprocess_default(src), "X\n1\n");
}

#[test]
fn test_redefinition_uses_latest_body() {
    let src = "#define X 1\n#define X 2\nX\n";
    assert_eq!(preprocess_default(src), "2\n");
}

#[test]
fn test_escaped_newline_in_define() {
    let src = "#define SUM(a, b) \\\n  a + b\nSUM(1, 2)\n";
    assert_eq!(preprocess_default(src), "\n1 + 2\n");
}
