//! The preprocessing pipeline.
//!
//! Single source of truth for running a full preprocess: strip comments
//! (unless asked not to), splice escaped newlines, parse, walk, generate.
//! Library callers go through [`preprocess`] or a configured [`Pipeline`];
//! the individual stages stay available for callers that need only part of
//! the transformation.

use crate::errors::{PreprocessorError, ReportContext, SourceContext};
use crate::generate::generate;
use crate::syntax::{parse, preprocess_comments, unescape_source};
use crate::walk::{preprocess_ast_in, PreservePolicy};

// ============================================================================
// OPTIONS
// ============================================================================

/// Options controlling one preprocess run.
#[derive(Debug, Clone)]
pub struct PreprocessorOptions {
    /// Object-like macros seeded into the environment, in order, before the
    /// walk begins.
    pub defines: Vec<(String, String)>,
    /// Which directives survive into the output.
    pub preserve: PreservePolicy,
    /// Skip the comment-stripping pre-pass. The walker itself never touches
    /// comments, so with this set the comments flow through to the output.
    pub preserve_comments: bool,
    /// Fail on `#error` instead of removing it.
    pub stop_on_error: bool,
    /// Diagnostic label for error reporting, usually the file name.
    pub source_name: String,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            defines: Vec::new(),
            preserve: PreservePolicy::standard(),
            preserve_comments: false,
            stop_on_error: false,
            source_name: "<preprocess>".to_string(),
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// A configured preprocessing pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub options: PreprocessorOptions,
}

impl Pipeline {
    pub fn new(options: PreprocessorOptions) -> Self {
        Self { options }
    }

    /// Runs the full transformation and returns the preprocessed source.
    pub fn preprocess(&self, source: &str) -> Result<String, PreprocessorError> {
        let stripped = if self.options.preserve_comments {
            source.to_string()
        } else {
            preprocess_comments(source)
        };
        let spliced = unescape_source(&stripped);

        let source_context =
            SourceContext::from_source(self.options.source_name.as_str(), spliced.as_str());
        let mut program = parse(&spliced, source_context.clone())?;

        let ctx = ReportContext::new(source_context, "preprocess");
        preprocess_ast_in(&mut program, &self.options, &ctx)?;

        Ok(generate(&program))
    }
}

/// Preprocesses `source` with the given options.
pub fn preprocess(
    source: &str,
    options: &PreprocessorOptions,
) -> Result<String, PreprocessorError> {
    Pipeline::new(options.clone()).preprocess(source)
}
