//! AST types for the preprocessor.
//!
//! A parsed source is a `Program`: a flat sequence of `Node`s, where each
//! node is either a raw `Text` run or a directive. Conditional directives
//! nest: a `Conditional` owns its branch parts, and each part owns the body
//! nodes between its directive line and the next branch line.
//!
//! Every directive node carries `raw`, the exact source text of its
//! directive line(s). Raw text is what the generator re-emits when a
//! directive is preserved, so preserved output is byte-identical to the
//! input.

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A parsed source file: text runs interleaved with directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    pub nodes: Vec<Node>,
}

/// One node of the preprocessor AST.
///
/// The conditional branch parts (`If`, `IfDef`, `IfNDef`, `ElseIf`, `Else`)
/// are node variants of their own; they only ever appear inside a
/// `Conditional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Raw source between directives.
    Text { text: String, span: Span },
    /// Object-like `#define NAME body`.
    Define {
        name: String,
        body: String,
        raw: String,
        span: Span,
    },
    /// Function-like `#define NAME(p1, p2) body`.
    DefineArguments {
        name: String,
        params: Vec<String>,
        body: String,
        raw: String,
        span: Span,
    },
    /// `#undef NAME`.
    Undef { name: String, raw: String, span: Span },
    /// A full `#if`/`#ifdef`/`#ifndef` ... `#endif` block.
    Conditional {
        if_part: Box<Node>,
        elif_parts: Vec<Node>,
        else_part: Option<Box<Node>>,
        /// The `#endif` line.
        end_raw: String,
        span: Span,
    },
    /// `#if expr` branch head with its body.
    If {
        expression: Expr,
        body: Vec<Node>,
        raw: String,
        span: Span,
    },
    /// `#ifdef NAME` branch head with its body.
    IfDef {
        identifier: String,
        body: Vec<Node>,
        raw: String,
        span: Span,
    },
    /// `#ifndef NAME` branch head with its body.
    IfNDef {
        identifier: String,
        body: Vec<Node>,
        raw: String,
        span: Span,
    },
    /// `#elif expr` branch with its body.
    ElseIf {
        expression: Expr,
        body: Vec<Node>,
        raw: String,
        span: Span,
    },
    /// `#else` branch with its body.
    Else {
        body: Vec<Node>,
        raw: String,
        span: Span,
    },
    /// `#error message`.
    Error {
        message: String,
        raw: String,
        span: Span,
    },
    /// `#pragma ...`, kept verbatim in `raw`.
    Pragma { raw: String, span: Span },
    /// `#version ...`, kept verbatim in `raw`.
    Version { raw: String, span: Span },
    /// `#extension ...`, kept verbatim in `raw`.
    Extension { raw: String, span: Span },
    /// `#line ...`, kept verbatim in `raw`.
    Line { raw: String, span: Span },
}

/// A conditional expression from an `#if` or `#elif` line.
///
/// Operators are stored as their source tokens; the evaluator dispatches on
/// the token and reports unknown ones verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Base-10 integer literal.
    IntConstant { token: String, span: Span },
    /// A bare identifier. The walker replaces `name` with its macro
    /// expansion before evaluation.
    Identifier { name: String, span: Span },
    /// `defined(NAME)` or `defined NAME`; the operand is never expanded.
    Defined { identifier: String, span: Span },
    /// Parenthesized expression.
    Group { expression: Box<Expr>, span: Span },
    Unary {
        operator: String,
        expression: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
        span: Span,
    },
}

/// The kind tag of a `Node`, used as the key of the preservation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Text,
    Define,
    DefineArguments,
    Undef,
    Conditional,
    If,
    IfDef,
    IfNDef,
    ElseIf,
    Else,
    Error,
    Pragma,
    Version,
    Extension,
    Line,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Node {
    /// Returns the kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text { .. } => NodeKind::Text,
            Node::Define { .. } => NodeKind::Define,
            Node::DefineArguments { .. } => NodeKind::DefineArguments,
            Node::Undef { .. } => NodeKind::Undef,
            Node::Conditional { .. } => NodeKind::Conditional,
            Node::If { .. } => NodeKind::If,
            Node::IfDef { .. } => NodeKind::IfDef,
            Node::IfNDef { .. } => NodeKind::IfNDef,
            Node::ElseIf { .. } => NodeKind::ElseIf,
            Node::Else { .. } => NodeKind::Else,
            Node::Error { .. } => NodeKind::Error,
            Node::Pragma { .. } => NodeKind::Pragma,
            Node::Version { .. } => NodeKind::Version,
            Node::Extension { .. } => NodeKind::Extension,
            Node::Line { .. } => NodeKind::Line,
        }
    }

    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Text { span, .. }
            | Node::Define { span, .. }
            | Node::DefineArguments { span, .. }
            | Node::Undef { span, .. }
            | Node::Conditional { span, .. }
            | Node::If { span, .. }
            | Node::IfDef { span, .. }
            | Node::IfNDef { span, .. }
            | Node::ElseIf { span, .. }
            | Node::Else { span, .. }
            | Node::Error { span, .. }
            | Node::Pragma { span, .. }
            | Node::Version { span, .. }
            | Node::Extension { span, .. }
            | Node::Line { span, .. } => *span,
        }
    }
}

impl NodeKind {
    /// Stable lowercase name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Define => "define",
            NodeKind::DefineArguments => "define_arguments",
            NodeKind::Undef => "undef",
            NodeKind::Conditional => "conditional",
            NodeKind::If => "if",
            NodeKind::IfDef => "ifdef",
            NodeKind::IfNDef => "ifndef",
            NodeKind::ElseIf => "elseif",
            NodeKind::Else => "else",
            NodeKind::Error => "error",
            NodeKind::Pragma => "pragma",
            NodeKind::Version => "version",
            NodeKind::Extension => "extension",
            NodeKind::Line => "line",
        }
    }
}

impl Expr {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::IntConstant { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Defined { span, .. }
            | Expr::Group { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. } => *span,
        }
    }
}

impl Program {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
