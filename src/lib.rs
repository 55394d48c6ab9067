pub use crate::errors::{ErrorKind, PreprocessorError, SourceContext};

pub mod ast;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod generate;
pub mod macros;
pub mod syntax;
pub mod walk;

pub use crate::engine::{preprocess, Pipeline, PreprocessorOptions};
pub use crate::generate::generate;
pub use crate::syntax::{parse, preprocess_comments, unescape_source};
pub use crate::walk::{preprocess_ast, PreservePolicy, PreserveRule};
