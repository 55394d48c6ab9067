//! Serializes a `Program` back to source text.
//!
//! `Text` nodes are emitted verbatim and directive nodes re-emit the raw
//! source captured at parse time, so a program whose directives are all
//! preserved generates byte-identical output.

use crate::ast::{Node, Program};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Generates source text from a program.
pub fn generate(program: &Program) -> String {
    let mut out = String::new();
    for node in &program.nodes {
        write_node(node, &mut out);
    }
    out
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),

        Node::Define { raw, .. }
        | Node::DefineArguments { raw, .. }
        | Node::Undef { raw, .. }
        | Node::Error { raw, .. }
        | Node::Pragma { raw, .. }
        | Node::Version { raw, .. }
        | Node::Extension { raw, .. }
        | Node::Line { raw, .. } => out.push_str(raw),

        Node::Conditional {
            if_part,
            elif_parts,
            else_part,
            end_raw,
            ..
        } => {
            write_node(if_part, out);
            for part in elif_parts {
                write_node(part, out);
            }
            if let Some(part) = else_part {
                write_node(part, out);
            }
            out.push_str(end_raw);
        }

        Node::If { raw, body, .. }
        | Node::IfDef { raw, body, .. }
        | Node::IfNDef { raw, body, .. }
        | Node::ElseIf { raw, body, .. }
        | Node::Else { raw, body, .. } => {
            out.push_str(raw);
            for child in body {
                write_node(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceContext;
    use crate::syntax::parse;

    fn round_trip(source: &str) -> String {
        let program = parse(source, SourceContext::from_source("test", source)).unwrap();
        generate(&program)
    }

    #[test]
    fn test_plain_text_round_trips() {
        let src = "void main() {\n  gl_FragColor = vec4(1.0);\n}\n";
        assert_eq!(round_trip(src), src);
    }

    #[test]
    fn test_directives_round_trip() {
        let src = "#version 300 es\n#define X 1\nX\n#undef X\n";
        assert_eq!(round_trip(src), src);
    }

    #[test]
    fn test_conditional_round_trips() {
        let src = "#if A > 1\na\n#elif B\nb\n#else\nc\n#endif\ntail\n";
        assert_eq!(round_trip(src), src);
    }

    #[test]
    fn test_function_define_round_trips() {
        let src = "#define F(a, b) a + b\nF(1, 2)\n";
        assert_eq!(round_trip(src), src);
    }
}
