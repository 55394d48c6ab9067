//! Unified error handling for the preprocessor.
//!
//! Every failure mode is a `PreprocessorError`: one struct carrying the
//! error kind, the source it occurred in, and diagnostic enhancements.
//! Errors are constructed through the `ErrorReporting` trait so that call
//! sites never assemble the struct by hand.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::ast::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source context for error reporting: a name (usually a file name or the
/// caller-supplied diagnostic label) and the content being processed.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real source content.
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("// {}", context),
        }
    }

    /// Convert to a NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The single error type: kind, location, diagnostics.
#[derive(Debug)]
pub struct PreprocessorError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it happened.
    pub source_info: SourceInfo,
    /// How to help.
    pub diagnostic_info: DiagnosticInfo,
}

/// All failure kinds. The message strings are part of the public contract;
/// tests assert them byte-for-byte.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Syntax errors - the source could not be parsed
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    // Malformed macro calls
    #[error("{text} unterminated macro invocation")]
    UnterminatedInvocation { text: String },
    #[error("'{name}': Too many arguments for macro")]
    TooManyArguments { name: String },
    #[error("'{name}': Not enough arguments for macro")]
    NotEnoughArguments { name: String },

    // Evaluation errors - conditional expression folding failed
    #[error("No evaluate() evaluator for {node_type}")]
    NoEvaluator { node_type: String },
    #[error("Preprocessing error: Unknown binary operator {operator}")]
    UnknownBinaryOperator { operator: String },
    #[error("Preprocessing error: Unknown unary operator {operator}")]
    UnknownUnaryOperator { operator: String },
    #[error("Division by zero in conditional expression")]
    DivisionByZero,
    #[error("Invalid integer constant '{token}'")]
    InvalidIntConstant { token: String },

    // User directives
    #[error("{message}")]
    ErrorDirective { message: String },

    // Engine bugs
    #[error("Internal error: {message}")]
    Internal { message: String },

    // I/O failures (CLI file reads)
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Source information for an error.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// Broad error category, used for diagnostic codes and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    MacroCall,
    Eval,
    Directive,
    Internal,
    Io,
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation. Each phase of the pipeline owns a
/// `ReportContext` and creates errors through this trait.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> PreprocessorError;

    fn syntax(&self, message: impl Into<String>, span: SourceSpan) -> PreprocessorError {
        self.report(
            ErrorKind::Syntax {
                message: message.into(),
            },
            span,
        )
    }

    fn internal(&self, message: impl Into<String>, span: SourceSpan) -> PreprocessorError {
        let mut error = self.report(
            ErrorKind::Internal {
                message: message.into(),
            },
            span,
        );
        error.diagnostic_info.help =
            Some("This is an internal preprocessor error. Please report this as a bug.".into());
        error
    }
}

/// General-purpose reporting context: the source being processed plus the
/// pipeline phase, stamped into every error it creates.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub source: SourceContext,
    pub phase: String,
}

impl ReportContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for ReportContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> PreprocessorError {
        let error_code = format!("shaderpp::{}::{}", self.phase, kind.code_suffix());

        PreprocessorError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

impl ErrorKind {
    /// Get the error category for diagnostic codes and test assertions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } => ErrorCategory::Syntax,

            Self::UnterminatedInvocation { .. }
            | Self::TooManyArguments { .. }
            | Self::NotEnoughArguments { .. } => ErrorCategory::MacroCall,

            Self::NoEvaluator { .. }
            | Self::UnknownBinaryOperator { .. }
            | Self::UnknownUnaryOperator { .. }
            | Self::DivisionByZero
            | Self::InvalidIntConstant { .. } => ErrorCategory::Eval,

            Self::ErrorDirective { .. } => ErrorCategory::Directive,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::UnterminatedInvocation { .. } => "unterminated_invocation",
            Self::TooManyArguments { .. } => "too_many_arguments",
            Self::NotEnoughArguments { .. } => "not_enough_arguments",
            Self::NoEvaluator { .. } => "no_evaluator",
            Self::UnknownBinaryOperator { .. } => "unknown_binary_operator",
            Self::UnknownUnaryOperator { .. } => "unknown_unary_operator",
            Self::DivisionByZero => "division_by_zero",
            Self::InvalidIntConstant { .. } => "invalid_int_constant",
            Self::ErrorDirective { .. } => "error_directive",
            Self::Internal { .. } => "internal",
            Self::Io { .. } => "io",
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl std::error::Error for PreprocessorError {}

impl fmt::Display for PreprocessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for PreprocessorError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl PreprocessorError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::Syntax { .. } => "invalid syntax".into(),
            ErrorKind::UnterminatedInvocation { .. } => "invocation never closed".into(),
            ErrorKind::TooManyArguments { .. } => "too many arguments".into(),
            ErrorKind::NotEnoughArguments { .. } => "not enough arguments".into(),
            ErrorKind::NoEvaluator { .. } => "cannot evaluate this node".into(),
            ErrorKind::UnknownBinaryOperator { .. } => "unknown operator".into(),
            ErrorKind::UnknownUnaryOperator { .. } => "unknown operator".into(),
            ErrorKind::DivisionByZero => "divides by zero".into(),
            ErrorKind::InvalidIntConstant { .. } => "invalid integer".into(),
            ErrorKind::ErrorDirective { .. } => "error directive".into(),
            ErrorKind::Internal { .. } => "internal error".into(),
            ErrorKind::Io { .. } => "i/o failed".into(),
        }
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Converts an AST `Span` to a miette `SourceSpan`.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

/// Placeholder span for errors not tied to a source location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Prints a `PreprocessorError` with full miette diagnostics.
///
/// Use this for user-facing error display in CLI contexts.
pub fn print_error(error: PreprocessorError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
