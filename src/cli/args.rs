//! Defines the command-line arguments and subcommands for the CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "shaderpp",
    version,
    about = "A source-to-source preprocessor for C-like shading languages."
)]
pub struct ShaderppArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full pipeline: strip comments, parse, expand, and print the result.
    Run {
        /// The path to the shader source file to preprocess.
        #[arg(required = true)]
        file: PathBuf,

        /// Seed an object-like macro, as NAME or NAME=BODY. Repeatable;
        /// definition order is expansion order.
        #[arg(short = 'D', value_name = "NAME[=BODY]")]
        define: Vec<String>,

        /// Fail on #error directives instead of removing them.
        #[arg(long)]
        stop_on_error: bool,

        /// Leave comments in place instead of stripping them.
        #[arg(long)]
        keep_comments: bool,

        /// Also remove #version, #extension, #pragma, and #line.
        #[arg(long)]
        no_preserve: bool,
    },
    /// Print the parsed AST as JSON without preprocessing it.
    Ast {
        /// The path to the shader source file to parse.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Strip comments and escaped newlines only.
    Strip {
        /// The path to the shader source file to strip.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List the macros still defined at the end of the file.
    Defines {
        /// The path to the shader source file to scan.
        #[arg(required = true)]
        file: PathBuf,

        /// Seed an object-like macro, as NAME or NAME=BODY.
        #[arg(short = 'D', value_name = "NAME[=BODY]")]
        define: Vec<String>,
    },
}
