//! The shaderpp command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! core library functions.

use clap::Parser;
use std::path::Path;
use std::{fs, process};

use crate::cli::args::{Command, ShaderppArgs};
use crate::engine::{Pipeline, PreprocessorOptions};
use crate::errors::{print_error, PreprocessorError, SourceContext};
use crate::syntax::{parse, preprocess_comments, unescape_source};
use crate::walk::{preprocess_ast, PreservePolicy};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = ShaderppArgs::parse();

    let result = match args.command {
        Command::Run {
            file,
            define,
            stop_on_error,
            keep_comments,
            no_preserve,
        } => handle_run(&file, &define, stop_on_error, keep_comments, no_preserve),
        Command::Ast { file } => handle_ast(&file),
        Command::Strip { file } => handle_strip(&file),
        Command::Defines { file, define } => handle_defines(&file, &define),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_run(
    file: &Path,
    defines: &[String],
    stop_on_error: bool,
    keep_comments: bool,
    no_preserve: bool,
) -> Result<(), PreprocessorError> {
    let source = read_source(file)?;

    let options = PreprocessorOptions {
        defines: parse_seed_defines(defines),
        preserve: if no_preserve {
            PreservePolicy::none()
        } else {
            PreservePolicy::standard()
        },
        preserve_comments: keep_comments,
        stop_on_error,
        source_name: file.display().to_string(),
    };

    let preprocessed = Pipeline::new(options).preprocess(&source)?;
    print!("{}", preprocessed);
    Ok(())
}

fn handle_ast(file: &Path) -> Result<(), PreprocessorError> {
    let source = read_source(file)?;
    let prepared = unescape_source(&preprocess_comments(&source));
    let program = parse(
        &prepared,
        SourceContext::from_source(file.display().to_string(), prepared.as_str()),
    )?;

    let json = serde_json::to_string_pretty(&program)
        .map_err(|e| io_error(format!("cannot serialize AST: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn handle_strip(file: &Path) -> Result<(), PreprocessorError> {
    let source = read_source(file)?;
    print!("{}", unescape_source(&preprocess_comments(&source)));
    Ok(())
}

fn handle_defines(file: &Path, defines: &[String]) -> Result<(), PreprocessorError> {
    let source = read_source(file)?;
    let prepared = unescape_source(&preprocess_comments(&source));
    let mut program = parse(
        &prepared,
        SourceContext::from_source(file.display().to_string(), prepared.as_str()),
    )?;

    let options = PreprocessorOptions {
        defines: parse_seed_defines(defines),
        source_name: file.display().to_string(),
        ..PreprocessorOptions::default()
    };
    let env = preprocess_ast(&mut program, &options)?;

    output::print_defines(&env);
    Ok(())
}

// ============================================================================
// UTILITIES
// ============================================================================

fn read_source(file: &Path) -> Result<String, PreprocessorError> {
    fs::read_to_string(file)
        .map_err(|e| io_error(format!("cannot read {}: {}", file.display(), e)))
}

/// Splits `-D NAME=BODY` seeds into ordered (name, body) pairs. A bare
/// `NAME` defines an empty macro, the way `#define NAME` does.
fn parse_seed_defines(defines: &[String]) -> Vec<(String, String)> {
    defines
        .iter()
        .map(|d| match d.split_once('=') {
            Some((name, body)) => (name.to_string(), body.to_string()),
            None => (d.to_string(), String::new()),
        })
        .collect()
}

fn io_error(message: String) -> PreprocessorError {
    use crate::errors::{unspanned, ErrorKind, ErrorReporting, ReportContext};
    let ctx = ReportContext::new(SourceContext::fallback("cli"), "cli");
    ctx.report(ErrorKind::Io { message }, unspanned())
}
