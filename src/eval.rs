//! Conditional expression evaluation.
//!
//! Folds an `#if`/`#elif` expression AST to a `Value` under the current
//! macro environment. The walker pre-expands `Identifier` nodes before
//! calling in here; `defined(X)` operands are never expanded and resolve
//! against the environment directly.
//!
//! Numeric semantics: operands coerce to `i64` in arithmetic position. An
//! identifier whose expanded text is not an integer coerces to `0`, so an
//! undefined name behaves like `0` the way C preprocessors treat it. In
//! logical position, any non-empty string other than `false` is true.

use crate::ast::Expr;
use crate::errors::{to_source_span, ErrorKind, ErrorReporting, PreprocessorError, ReportContext};
use crate::macros::MacroEnv;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The result of folding a conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Integer coercion: strings parse or collapse to 0, booleans are 0/1.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Str(s) => s.trim().parse::<i64>().unwrap_or(0),
            Value::Bool(b) => i64::from(*b),
        }
    }

    /// Truthiness: non-zero integers and non-empty strings are true;
    /// `0`, the empty string, and `false` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty() && s != "false",
            Value::Bool(b) => *b,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Int(i64::from(b))
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Evaluates a conditional expression under the given environment.
pub fn evaluate(
    expr: &Expr,
    env: &MacroEnv,
    ctx: &ReportContext,
) -> Result<Value, PreprocessorError> {
    match expr {
        Expr::IntConstant { token, span } => {
            token.parse::<i64>().map(Value::Int).map_err(|_| {
                ctx.report(
                    ErrorKind::InvalidIntConstant {
                        token: token.clone(),
                    },
                    to_source_span(*span),
                )
            })
        }

        Expr::Identifier { name, .. } => {
            let text = name.trim();
            Ok(match text.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::Str(text.to_string()),
            })
        }

        Expr::Defined { identifier, .. } => Ok(Value::Bool(env.has(identifier))),

        Expr::Group { expression, .. } => evaluate(expression, env, ctx),

        Expr::Unary {
            operator,
            expression,
            span,
        } => {
            let value = evaluate(expression, env, ctx)?;
            match operator.as_str() {
                "+" => Ok(Value::Int(value.as_int())),
                "-" => Ok(Value::Int(-value.as_int())),
                "!" => Ok(Value::from(!value.truthy())),
                "~" => Ok(Value::Int(!value.as_int())),
                _ => Err(ctx.report(
                    ErrorKind::UnknownUnaryOperator {
                        operator: operator.clone(),
                    },
                    to_source_span(*span),
                )),
            }
        }

        Expr::Binary {
            left,
            operator,
            right,
            span,
        } => evaluate_binary(left, operator, right, *span, env, ctx),
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

fn evaluate_binary(
    left: &Expr,
    operator: &str,
    right: &Expr,
    span: crate::ast::Span,
    env: &MacroEnv,
    ctx: &ReportContext,
) -> Result<Value, PreprocessorError> {
    // Short-circuit forms never evaluate the right side when the left
    // decides the result.
    match operator {
        "&&" => {
            if !evaluate(left, env, ctx)?.truthy() {
                return Ok(Value::Int(0));
            }
            return Ok(Value::from(evaluate(right, env, ctx)?.truthy()));
        }
        "||" => {
            if evaluate(left, env, ctx)?.truthy() {
                return Ok(Value::Int(1));
            }
            return Ok(Value::from(evaluate(right, env, ctx)?.truthy()));
        }
        _ => {}
    }

    let l = evaluate(left, env, ctx)?.as_int();
    let r = evaluate(right, env, ctx)?.as_int();

    let result = match operator {
        "*" => l.wrapping_mul(r),
        "/" => {
            if r == 0 {
                return Err(ctx.report(ErrorKind::DivisionByZero, to_source_span(span)));
            }
            l.wrapping_div(r)
        }
        "%" => {
            if r == 0 {
                return Err(ctx.report(ErrorKind::DivisionByZero, to_source_span(span)));
            }
            l.wrapping_rem(r)
        }
        "+" => l.wrapping_add(r),
        "-" => l.wrapping_sub(r),
        "<<" => l.wrapping_shl(r as u32),
        ">>" => l.wrapping_shr(r as u32),
        "<" => i64::from(l < r),
        ">" => i64::from(l > r),
        "<=" => i64::from(l <= r),
        ">=" => i64::from(l >= r),
        "==" => i64::from(l == r),
        "!=" => i64::from(l != r),
        "&" => l & r,
        "^" => l ^ r,
        "|" => l | r,
        _ => {
            return Err(ctx.report(
                ErrorKind::UnknownBinaryOperator {
                    operator: operator.to_string(),
                },
                to_source_span(span),
            ))
        }
    };

    Ok(Value::Int(result))
}
