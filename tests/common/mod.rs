#![allow(dead_code)]

//! Shared helpers for the integration test suites.
//!
//! Everything funnels through the library pipeline the same way the CLI
//! does, so the suites exercise the exact code path a consumer sees.

use shaderpp::{preprocess, PreprocessorError, PreprocessorOptions};

/// Runs the full pipeline with default options.
pub fn preprocess_default(source: &str) -> String {
    preprocess(source, &PreprocessorOptions::default())
        .unwrap_or_else(|e| panic!("preprocess failed: {}", e))
}

/// Runs the full pipeline with the given options.
pub fn preprocess_with(
    source: &str,
    options: &PreprocessorOptions,
) -> Result<String, PreprocessorError> {
    preprocess(source, options)
}

/// Runs the full pipeline and returns the error it must produce.
pub fn preprocess_err(source: &str, options: &PreprocessorOptions) -> PreprocessorError {
    match preprocess(source, options) {
        Ok(out) => panic!("expected an error, got output: {:?}", out),
        Err(e) => e,
    }
}
