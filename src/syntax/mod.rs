//! Source-level syntax: the textual pre-passes and the directive parser.

pub mod comments;
pub mod parser;

pub use comments::{preprocess_comments, unescape_source};
pub use parser::parse;
