//! Handles user-facing output for the CLI.
//!
//! Centralizing output logic here keeps the command handlers focused on
//! wiring and gives every command the same look.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::macros::MacroEnv;

/// Prints a user-facing error message with color.
pub fn print_failure(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    eprint!("error");
    let _ = stderr.reset();
    eprintln!(": {}", message);
}

/// Prints the macros of an environment, one per line, in definition order.
pub fn print_defines(env: &MacroEnv) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for (name, def) in env.iter() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        print!("{}", name);
        let _ = stdout.reset();
        match &def.params {
            Some(params) => println!("({}) = {}", params.join(", "), def.body),
            None => {
                if def.body.is_empty() {
                    println!();
                } else {
                    println!(" = {}", def.body);
                }
            }
        }
    }
}
