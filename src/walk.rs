//! The directive walker.
//!
//! A single pre-order pass over the `Program`: `#define`/`#undef` mutate
//! the macro environment, `Text` nodes are expanded under the environment
//! built up so far, conditionals are replaced by their selected branch
//! body, and directives are dropped unless the preservation policy keeps
//! them. Preservation never suppresses side effects: a preserved `#define`
//! still updates the environment.
//!
//! The walk is iterative. Selected branch bodies are pushed onto the front
//! of a worklist, so nested directives are processed in source order with
//! exactly the environment established before them, and environment changes
//! inside a taken branch persist after the conditional.

use std::collections::{HashMap, VecDeque};

use crate::ast::{Node, NodeKind, Program, Span};
use crate::engine::PreprocessorOptions;
use crate::errors::{
    to_source_span, ErrorKind, ErrorReporting, PreprocessorError, ReportContext, SourceContext,
};
use crate::eval::evaluate;
use crate::macros::{Macro, MacroEnv, MacroExpander};

// ============================================================================
// PRESERVATION POLICY
// ============================================================================

/// Predicate deciding whether one particular node is preserved.
pub type PreservePredicate = fn(&Node) -> bool;

/// Per-node-kind preservation behavior.
#[derive(Debug, Clone, Copy)]
pub enum PreserveRule {
    Always,
    Never,
    When(PreservePredicate),
}

/// Policy mapping node kinds to preservation rules. Kinds without an entry
/// are removed after their side effects are applied.
#[derive(Debug, Clone, Default)]
pub struct PreservePolicy {
    rules: HashMap<NodeKind, PreserveRule>,
}

impl PreservePolicy {
    /// No directive is preserved.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every directive is preserved.
    pub fn all() -> Self {
        let mut policy = Self::default();
        for kind in [
            NodeKind::Define,
            NodeKind::DefineArguments,
            NodeKind::Undef,
            NodeKind::Conditional,
            NodeKind::Error,
            NodeKind::Pragma,
            NodeKind::Version,
            NodeKind::Extension,
            NodeKind::Line,
        ] {
            policy.rules.insert(kind, PreserveRule::Always);
        }
        policy
    }

    pub fn set(&mut self, kind: NodeKind, rule: PreserveRule) -> &mut Self {
        self.rules.insert(kind, rule);
        self
    }

    pub fn should_preserve(&self, node: &Node) -> bool {
        match self.rules.get(&node.kind()) {
            Some(PreserveRule::Always) => true,
            Some(PreserveRule::Never) | None => false,
            Some(PreserveRule::When(predicate)) => predicate(node),
        }
    }

    /// The stock policy: `#version`, `#extension`, `#pragma` and `#line`
    /// survive (stripping `#version` would break any real consumer), all
    /// other directives are consumed.
    pub fn standard() -> Self {
        let mut policy = Self::default();
        for kind in [
            NodeKind::Pragma,
            NodeKind::Version,
            NodeKind::Extension,
            NodeKind::Line,
        ] {
            policy.rules.insert(kind, PreserveRule::Always);
        }
        policy
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Walks `program` in place and returns the final macro environment.
///
/// Errors are reported against a fallback source context; use
/// [`preprocess_ast_in`] when the original source text is at hand.
pub fn preprocess_ast(
    program: &mut Program,
    options: &PreprocessorOptions,
) -> Result<MacroEnv, PreprocessorError> {
    let ctx = ReportContext::new(SourceContext::fallback(&options.source_name), "preprocess");
    preprocess_ast_in(program, options, &ctx)
}

/// Walks `program` in place, reporting errors against `ctx`.
pub fn preprocess_ast_in(
    program: &mut Program,
    options: &PreprocessorOptions,
    ctx: &ReportContext,
) -> Result<MacroEnv, PreprocessorError> {
    let mut env = MacroEnv::seeded(
        options
            .defines
            .iter()
            .map(|(n, b)| (n.as_str(), b.as_str())),
    );

    let mut work: VecDeque<Node> = std::mem::take(&mut program.nodes).into();
    let mut out = Vec::new();

    while let Some(node) = work.pop_front() {
        let preserved = options.preserve.should_preserve(&node);

        match node {
            Node::Text { text, span } => {
                let expanded = MacroExpander::new(&env, ctx).expand(&text, span)?;
                out.push(Node::Text {
                    text: expanded,
                    span,
                });
            }

            Node::Define {
                ref name, ref body, ..
            } => {
                env.define(name, Macro::object(body.clone()));
                if preserved {
                    out.push(node);
                }
            }

            Node::DefineArguments {
                ref name,
                ref params,
                ref body,
                ..
            } => {
                env.define(name, Macro::function(params.clone(), body.clone()));
                if preserved {
                    out.push(node);
                }
            }

            Node::Undef { ref name, .. } => {
                env.undef(name);
                if preserved {
                    out.push(node);
                }
            }

            Node::Error {
                ref message, span, ..
            } => {
                if options.stop_on_error {
                    return Err(ctx.report(
                        ErrorKind::ErrorDirective {
                            message: message.clone(),
                        },
                        to_source_span(span),
                    ));
                }
                if preserved {
                    out.push(node);
                }
            }

            Node::Pragma { .. }
            | Node::Version { .. }
            | Node::Extension { .. }
            | Node::Line { .. } => {
                if preserved {
                    out.push(node);
                }
            }

            Node::Conditional {
                if_part,
                elif_parts,
                else_part,
                end_raw,
                span,
            } => {
                if preserved {
                    out.push(Node::Conditional {
                        if_part,
                        elif_parts,
                        else_part,
                        end_raw,
                        span,
                    });
                    continue;
                }
                let selected = select_branch(*if_part, elif_parts, else_part, &env, ctx)?;
                if let Some(body) = selected {
                    for child in body.into_iter().rev() {
                        work.push_front(child);
                    }
                }
            }

            // Branch parts never appear outside a Conditional.
            part => {
                return Err(ctx.report(
                    ErrorKind::NoEvaluator {
                        node_type: part.kind().name().to_string(),
                    },
                    to_source_span(part.span()),
                ));
            }
        }
    }

    program.nodes = out;
    Ok(env)
}

// ============================================================================
// CONDITIONAL SELECTION
// ============================================================================

/// Picks the first branch whose condition holds and returns its body, or
/// `None` when no branch matches and there is no `#else`.
fn select_branch(
    if_part: Node,
    elif_parts: Vec<Node>,
    else_part: Option<Box<Node>>,
    env: &MacroEnv,
    ctx: &ReportContext,
) -> Result<Option<Vec<Node>>, PreprocessorError> {
    let (taken, body) = match if_part {
        Node::If {
            mut expression,
            body,
            span,
            ..
        } => {
            expand_expr_identifiers(&mut expression, env, ctx, span)?;
            let value = evaluate(&expression, env, ctx)?;
            (value.truthy(), body)
        }
        Node::IfDef {
            identifier, body, ..
        } => (env.has(&identifier), body),
        Node::IfNDef {
            identifier, body, ..
        } => (!env.has(&identifier), body),
        other => {
            return Err(ctx.report(
                ErrorKind::NoEvaluator {
                    node_type: other.kind().name().to_string(),
                },
                to_source_span(other.span()),
            ))
        }
    };

    if taken {
        return Ok(Some(body));
    }

    for part in elif_parts {
        match part {
            Node::ElseIf {
                mut expression,
                body,
                span,
                ..
            } => {
                expand_expr_identifiers(&mut expression, env, ctx, span)?;
                if evaluate(&expression, env, ctx)?.truthy() {
                    return Ok(Some(body));
                }
            }
            other => {
                return Err(ctx.report(
                    ErrorKind::NoEvaluator {
                        node_type: other.kind().name().to_string(),
                    },
                    to_source_span(other.span()),
                ))
            }
        }
    }

    match else_part {
        Some(part) => match *part {
            Node::Else { body, .. } => Ok(Some(body)),
            other => Err(ctx.report(
                ErrorKind::NoEvaluator {
                    node_type: other.kind().name().to_string(),
                },
                to_source_span(other.span()),
            )),
        },
        None => Ok(None),
    }
}

/// Replaces every `Identifier` text in the expression with its macro
/// expansion under the current environment. `defined(X)` subtrees are
/// skipped so the operand stays a name.
fn expand_expr_identifiers(
    expr: &mut crate::ast::Expr,
    env: &MacroEnv,
    ctx: &ReportContext,
    span: Span,
) -> Result<(), PreprocessorError> {
    use crate::ast::Expr;

    match expr {
        Expr::Identifier { name, .. } => {
            let expanded = MacroExpander::new(env, ctx).expand(name, span)?;
            *name = expanded;
            Ok(())
        }
        Expr::Defined { .. } | Expr::IntConstant { .. } => Ok(()),
        Expr::Group { expression, .. } | Expr::Unary { expression, .. } => {
            expand_expr_identifiers(expression, env, ctx, span)
        }
        Expr::Binary { left, right, .. } => {
            expand_expr_identifiers(left, env, ctx, span)?;
            expand_expr_identifiers(right, env, ctx, span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PreprocessorOptions;
    use crate::errors::SourceContext;
    use crate::generate::generate;
    use crate::syntax::parse;

    fn run(source: &str, options: &PreprocessorOptions) -> Result<String, PreprocessorError> {
        let mut program = parse(source, SourceContext::from_source("test", source))?;
        let ctx = ReportContext::new(
            SourceContext::from_source("test", source),
            "preprocess",
        );
        preprocess_ast_in(&mut program, options, &ctx)?;
        Ok(generate(&program))
    }

    fn run_default(source: &str) -> String {
        run(source, &PreprocessorOptions::default()).unwrap()
    }

    #[test]
    fn test_define_then_expand() {
        assert_eq!(run_default("#define X Y\n#define Y Z\nX"), "Z");
    }

    #[test]
    fn test_undef_stops_expansion() {
        assert_eq!(run_default("#define X 1\n#undef X\nX\n"), "X\n");
    }

    #[test]
    fn test_environment_is_source_ordered() {
        // The text before the define must not see it.
        assert_eq!(run_default("X\n#define X 1\nX\n"), "X\n1\n");
    }

    #[test]
    fn test_conditional_selects_if_branch() {
        assert_eq!(run_default("\n#if 1 + 1 > 0\ntrue\n#endif\n"), "\ntrue\n");
    }

    #[test]
    fn test_conditional_selects_elif_branch() {
        assert_eq!(
            run_default("#if 0\na\n#elif 1\nb\n#else\nc\n#endif\n"),
            "b\n"
        );
    }

    #[test]
    fn test_conditional_selects_else_branch() {
        assert_eq!(
            run_default("#if 0\na\n#elif 0\nb\n#else\nc\n#endif\n"),
            "c\n"
        );
    }

    #[test]
    fn test_conditional_no_match_removes_block() {
        assert_eq!(run_default("#if 0\na\n#endif\nrest\n"), "rest\n");
    }

    #[test]
    fn test_first_true_elif_wins() {
        assert_eq!(
            run_default("#if 0\na\n#elif 1\nb\n#elif 1\nc\n#endif\n"),
            "b\n"
        );
    }

    #[test]
    fn test_nested_conditionals() {
        let src = "#define MACRO\n#ifdef NOT_DEFINED\nA\n#else\n  #ifdef MACRO\nB\n  #endif\n#endif\n";
        assert_eq!(run_default(src), "B\n");
    }

    #[test]
    fn test_define_inside_branch_persists() {
        let src = "#if 1\n#define A 5\n#endif\nA\n";
        assert_eq!(run_default(src), "5\n");
    }

    #[test]
    fn test_ifdef_sees_empty_define() {
        assert_eq!(run_default("#define FLAG\n#ifdef FLAG\nyes\n#endif\n"), "yes\n");
    }

    #[test]
    fn test_ifndef() {
        assert_eq!(run_default("#ifndef FLAG\nyes\n#endif\n"), "yes\n");
    }

    #[test]
    fn test_defined_operand_is_not_expanded() {
        // X expands to 1, but defined(X) must consult the name X itself.
        let src = "#define X 1\n#if defined(X) && X\nyes\n#endif\n";
        assert_eq!(run_default(src), "yes\n");
    }

    #[test]
    fn test_identifier_in_if_is_expanded() {
        let src = "#define LEVEL 3\n#if LEVEL > 2\nhigh\n#endif\n";
        assert_eq!(run_default(src), "high\n");
    }

    #[test]
    fn test_undefined_identifier_in_if_is_falsy() {
        assert_eq!(run_default("#if NOPE\nx\n#endif\nrest\n"), "rest\n");
    }

    #[test]
    fn test_error_directive_removed_by_default() {
        assert_eq!(run_default("#error bad things\nok\n"), "ok\n");
    }

    #[test]
    fn test_error_directive_stops_when_requested() {
        let options = PreprocessorOptions {
            stop_on_error: true,
            ..PreprocessorOptions::default()
        };
        let err = run("#error bad things\nok\n", &options).unwrap_err();
        assert_eq!(err.to_string(), "bad things");
    }

    #[test]
    fn test_version_preserved_by_default() {
        assert_eq!(
            run_default("#version 300 es\nvoid main() {}\n"),
            "#version 300 es\nvoid main() {}\n"
        );
    }

    #[test]
    fn test_preserve_none_strips_version() {
        let options = PreprocessorOptions {
            preserve: PreservePolicy::none(),
            ..PreprocessorOptions::default()
        };
        assert_eq!(
            run("#version 300 es\nvoid main() {}\n", &options).unwrap(),
            "void main() {}\n"
        );
    }

    #[test]
    fn test_preserved_define_still_defines() {
        let mut preserve = PreservePolicy::standard();
        preserve.set(NodeKind::Define, PreserveRule::Always);
        let options = PreprocessorOptions {
            preserve,
            ..PreprocessorOptions::default()
        };
        assert_eq!(
            run("#define X 1\nX\n", &options).unwrap(),
            "#define X 1\n1\n"
        );
    }

    #[test]
    fn test_preserved_conditional_left_unchanged() {
        let mut preserve = PreservePolicy::standard();
        preserve.set(NodeKind::Conditional, PreserveRule::Always);
        let options = PreprocessorOptions {
            preserve,
            ..PreprocessorOptions::default()
        };
        let src = "#if 1\na\n#endif\n";
        assert_eq!(run(src, &options).unwrap(), src);
    }

    #[test]
    fn test_preserve_predicate_sees_node() {
        fn keep_es(node: &Node) -> bool {
            matches!(node, Node::Version { raw, .. } if raw.contains("es"))
        }
        let mut preserve = PreservePolicy::none();
        preserve.set(NodeKind::Version, PreserveRule::When(keep_es));
        let options = PreprocessorOptions {
            preserve,
            ..PreprocessorOptions::default()
        };
        assert_eq!(
            run("#version 300 es\nx\n", &options).unwrap(),
            "#version 300 es\nx\n"
        );
        assert_eq!(run("#version 460\nx\n", &options).unwrap(), "x\n");
    }

    #[test]
    fn test_seeded_defines() {
        let options = PreprocessorOptions {
            defines: vec![("WIDTH".to_string(), "1024".to_string())],
            ..PreprocessorOptions::default()
        };
        assert_eq!(run("int w = WIDTH;\n", &options).unwrap(), "int w = 1024;\n");
    }

    #[test]
    fn test_macro_free_text_is_untouched() {
        let src = "void main() {\n  gl_FragColor = vec4(1.0);\n}\n";
        assert_eq!(run_default(src), src);
    }

    #[test]
    fn test_returns_final_environment() {
        let src = "#define A 1\n#define B 2\n#undef A\n";
        let mut program = parse(src, SourceContext::from_source("test", src)).unwrap();
        let env = preprocess_ast(&mut program, &PreprocessorOptions::default()).unwrap();
        assert!(!env.has("A"));
        assert!(env.has("B"));
    }
}
