//! Directive parser.
//!
//! Converts preprocessor source into a `Program` AST with source location
//! tracking. This parser is purely syntactic: directives are recognized and
//! their pieces captured, but no macro is expanded and no conditional is
//! evaluated here.

use crate::ast::{Expr, Node, Program, Span};
use crate::errors::{
    to_source_span, ErrorReporting, PreprocessorError, ReportContext, SourceContext,
};
use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct PreprocessorParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse preprocessor source into a `Program`.
pub fn parse(source_text: &str, source_context: SourceContext) -> Result<Program, PreprocessorError> {
    let ctx = ReportContext::new(source_context, "parse");

    let pairs = PreprocessorParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, &ctx))?;

    let program = pairs.peek().expect("pest guarantees the program rule exists");

    let nodes = program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_node(p, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Program::new(nodes))
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_node(pair: Pair<Rule>, ctx: &ReportContext) -> Result<Node, PreprocessorError> {
    let span = get_span(&pair);
    let raw = pair.as_str().to_string();

    match pair.as_rule() {
        Rule::text => Ok(Node::Text { text: raw, span }),

        Rule::define => {
            let mut inner = pair.into_inner();
            let name = expect_pair(inner.next(), "define name", span, ctx)?;
            let body = expect_pair(inner.next(), "define body", span, ctx)?;
            Ok(Node::Define {
                name: name.as_str().to_string(),
                body: body.as_str().trim().to_string(),
                raw,
                span,
            })
        }

        Rule::define_arguments => {
            let mut name = String::new();
            let mut params = Vec::new();
            let mut body = String::new();
            for piece in pair.into_inner() {
                match piece.as_rule() {
                    Rule::identifier => name = piece.as_str().to_string(),
                    Rule::params => {
                        params = piece.into_inner().map(|p| p.as_str().to_string()).collect();
                    }
                    Rule::rest => body = piece.as_str().trim().to_string(),
                    _ => {}
                }
            }
            Ok(Node::DefineArguments {
                name,
                params,
                body,
                raw,
                span,
            })
        }

        Rule::undef => {
            let name = expect_pair(pair.into_inner().next(), "undef name", span, ctx)?;
            Ok(Node::Undef {
                name: name.as_str().to_string(),
                raw,
                span,
            })
        }

        Rule::error_directive => {
            let message = expect_pair(pair.into_inner().next(), "error message", span, ctx)?;
            Ok(Node::Error {
                message: message.as_str().trim().to_string(),
                raw,
                span,
            })
        }

        Rule::pragma_directive => Ok(Node::Pragma { raw, span }),
        Rule::version_directive => Ok(Node::Version { raw, span }),
        Rule::extension_directive => Ok(Node::Extension { raw, span }),
        Rule::line_directive => Ok(Node::Line { raw, span }),

        Rule::conditional => build_conditional(pair, ctx),

        rule => Err(ctx.internal(
            format!("unsupported rule in node position: {:?}", rule),
            to_source_span(span),
        )),
    }
}

fn build_conditional(pair: Pair<Rule>, ctx: &ReportContext) -> Result<Node, PreprocessorError> {
    let span = get_span(&pair);
    let mut if_part = None;
    let mut elif_parts = Vec::new();
    let mut else_part = None;
    let mut end_raw = String::new();

    for piece in pair.into_inner() {
        match piece.as_rule() {
            Rule::if_part => if_part = Some(Box::new(build_branch(piece, ctx)?)),
            Rule::elseif_part => elif_parts.push(build_branch(piece, ctx)?),
            Rule::else_part => else_part = Some(Box::new(build_branch(piece, ctx)?)),
            Rule::endif_line => end_raw = piece.as_str().to_string(),
            rule => {
                return Err(ctx.internal(
                    format!("unsupported rule in conditional: {:?}", rule),
                    to_source_span(span),
                ))
            }
        }
    }

    let if_part = if_part
        .ok_or_else(|| ctx.internal("conditional without an if part", to_source_span(span)))?;

    Ok(Node::Conditional {
        if_part,
        elif_parts,
        else_part,
        end_raw,
        span,
    })
}

/// Builds one conditional branch (`if_part`, `elseif_part`, or `else_part`):
/// the directive line followed by its body nodes.
fn build_branch(pair: Pair<Rule>, ctx: &ReportContext) -> Result<Node, PreprocessorError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();

    let line = expect_pair(inner.next(), "branch directive line", span, ctx)?;
    let line_raw = line.as_str().to_string();
    let line_rule = line.as_rule();

    let body = match inner.next() {
        Some(body_pair) if body_pair.as_rule() == Rule::body => body_pair
            .into_inner()
            .map(|p| build_node(p, ctx))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    match line_rule {
        Rule::if_line => {
            let expr_pair = expect_pair(line.into_inner().next(), "if expression", span, ctx)?;
            Ok(Node::If {
                expression: build_expr(expr_pair, ctx)?,
                body,
                raw: line_raw,
                span,
            })
        }
        Rule::ifdef_line => {
            let name = expect_pair(line.into_inner().next(), "ifdef name", span, ctx)?;
            Ok(Node::IfDef {
                identifier: name.as_str().to_string(),
                body,
                raw: line_raw,
                span,
            })
        }
        Rule::ifndef_line => {
            let name = expect_pair(line.into_inner().next(), "ifndef name", span, ctx)?;
            Ok(Node::IfNDef {
                identifier: name.as_str().to_string(),
                body,
                raw: line_raw,
                span,
            })
        }
        Rule::elif_line => {
            let expr_pair = expect_pair(line.into_inner().next(), "elif expression", span, ctx)?;
            Ok(Node::ElseIf {
                expression: build_expr(expr_pair, ctx)?,
                body,
                raw: line_raw,
                span,
            })
        }
        Rule::else_line => Ok(Node::Else {
            body,
            raw: line_raw,
            span,
        }),
        rule => Err(ctx.internal(
            format!("unsupported branch line rule: {:?}", rule),
            to_source_span(span),
        )),
    }
}

// ============================================================================
// EXPRESSION BUILDERS
// ============================================================================

fn build_expr(pair: Pair<Rule>, ctx: &ReportContext) -> Result<Expr, PreprocessorError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::expr => {
            let inner = expect_pair(pair.into_inner().next(), "expression", span, ctx)?;
            build_expr(inner, ctx)
        }

        Rule::logical_or
        | Rule::logical_and
        | Rule::bit_or
        | Rule::bit_xor
        | Rule::bit_and
        | Rule::equality
        | Rule::relational
        | Rule::shift
        | Rule::additive
        | Rule::multiplicative => build_binary_chain(pair, ctx),

        Rule::unary => {
            let mut inner = pair.into_inner();
            let first = expect_pair(inner.next(), "unary operand", span, ctx)?;
            if first.as_rule() == Rule::unary_op {
                let operand = expect_pair(inner.next(), "unary operand", span, ctx)?;
                Ok(Expr::Unary {
                    operator: first.as_str().to_string(),
                    expression: Box::new(build_expr(operand, ctx)?),
                    span,
                })
            } else {
                build_expr(first, ctx)
            }
        }

        Rule::defined_expr => {
            let name = expect_pair(pair.into_inner().next(), "defined operand", span, ctx)?;
            Ok(Expr::Defined {
                identifier: name.as_str().to_string(),
                span,
            })
        }

        Rule::group => {
            let inner = expect_pair(pair.into_inner().next(), "group expression", span, ctx)?;
            Ok(Expr::Group {
                expression: Box::new(build_expr(inner, ctx)?),
                span,
            })
        }

        Rule::int_constant => Ok(Expr::IntConstant {
            token: pair.as_str().to_string(),
            span,
        }),

        Rule::identifier => Ok(Expr::Identifier {
            name: pair.as_str().to_string(),
            span,
        }),

        rule => Err(ctx.internal(
            format!("unsupported rule in expression position: {:?}", rule),
            to_source_span(span),
        )),
    }
}

/// Folds a `operand (op operand)*` chain into left-associative `Binary`
/// nodes. A chain with a single operand is just that operand.
fn build_binary_chain(pair: Pair<Rule>, ctx: &ReportContext) -> Result<Expr, PreprocessorError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();

    let first = expect_pair(inner.next(), "binary operand", span, ctx)?;
    let mut left = build_expr(first, ctx)?;

    while let Some(op) = inner.next() {
        let right_pair = expect_pair(inner.next(), "binary operand", span, ctx)?;
        let right = build_expr(right_pair, ctx)?;
        let combined = Span {
            start: left.span().start,
            end: right.span().end,
        };
        left = Expr::Binary {
            left: Box::new(left),
            operator: op.as_str().to_string(),
            right: Box::new(right),
            span: combined,
        };
    }

    Ok(left)
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn expect_pair<'a>(
    pair: Option<Pair<'a, Rule>>,
    what: &str,
    span: Span,
    ctx: &ReportContext,
) -> Result<Pair<'a, Rule>, PreprocessorError> {
    pair.ok_or_else(|| ctx.internal(format!("grammar produced no {}", what), to_source_span(span)))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, ctx: &ReportContext) -> PreprocessorError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let rendered = error.to_string();
    let message = if rendered.contains("endif_line") {
        "unterminated conditional (missing #endif)"
    } else if rendered.contains("expr") {
        "malformed conditional expression"
    } else {
        "malformed directive"
    };

    ctx.syntax(message, to_source_span(span))
}
