//! The macro expansion engine.
//!
//! `MacroExpander` rewrites a text under an environment: each defined macro
//! is applied in definition order, object-like macros by whole-word
//! replacement and function-like macros by argument scanning, parameter
//! substitution, and rescan.
//!
//! Self-reference is suppressed with a shadow stack: while a macro's body
//! (or its substituted call) is being expanded recursively, the macro's own
//! name is hidden from the environment. Hiding one name per recursion level
//! bounds the depth by the number of defined macros, so expansion always
//! terminates.

use regex::{NoExpand, Regex};
use std::collections::HashMap;

use crate::ast::Span;
use crate::errors::{
    to_source_span, ErrorKind, ErrorReporting, PreprocessorError, ReportContext,
};
use crate::macros::{Macro, MacroEnv};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Expands macro occurrences in raw text under a borrowed environment.
pub struct MacroExpander<'a> {
    env: &'a MacroEnv,
    ctx: &'a ReportContext,
    /// Names hidden from the environment while their expansion is rewritten.
    hidden: Vec<String>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl<'a> MacroExpander<'a> {
    pub fn new(env: &'a MacroEnv, ctx: &'a ReportContext) -> Self {
        Self {
            env,
            ctx,
            hidden: Vec::new(),
        }
    }

    /// Expands every visible macro in `text`, in definition order. `span`
    /// locates the text in the original source for error reporting.
    pub fn expand(&mut self, text: &str, span: Span) -> Result<String, PreprocessorError> {
        // Snapshot the entries: the environment cannot change mid-expansion,
        // but the hidden stack does, and it is consulted per macro below.
        let entries: Vec<(String, Macro)> = self
            .env
            .iter()
            .map(|(name, def)| (name.to_string(), def.clone()))
            .collect();

        let mut current = text.to_string();
        for (name, def) in &entries {
            if self.hidden.contains(name) {
                continue;
            }
            current = match &def.params {
                None => self.expand_object(name, &def.body, &current, span)?,
                Some(params) => self.expand_function(name, params, &def.body, &current, span)?,
            };
        }
        Ok(current)
    }

    // ------------------------------------------------------------------------
    // Object-like expansion
    // ------------------------------------------------------------------------

    /// Replaces every whole-word occurrence of `name` with its recursively
    /// expanded body. The recursion hides `name`, so a body that mentions
    /// its own macro leaves that mention as-is.
    fn expand_object(
        &mut self,
        name: &str,
        body: &str,
        text: &str,
        span: Span,
    ) -> Result<String, PreprocessorError> {
        let pattern = self.word_regex(name, span)?;
        if !pattern.is_match(text) {
            return Ok(text.to_string());
        }

        let replacement = self.with_hidden(name, |ex| ex.expand(body, span))?;
        let replaced = pattern
            .replace_all(text, NoExpand(&replacement))
            .into_owned();
        Ok(paste_tokens(&replaced))
    }

    // ------------------------------------------------------------------------
    // Function-like expansion
    // ------------------------------------------------------------------------

    /// Expands every `name(args)` call in `text`: scan the argument list,
    /// check arity, pre-expand each argument under the full environment,
    /// substitute all parameters in one pass, paste tokens, rescan with
    /// `name` hidden, and splice the result over the call. The cursor then
    /// advances past the splice, so an expansion that reproduces its own
    /// call is not expanded again.
    fn expand_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &str,
        text: &str,
        span: Span,
    ) -> Result<String, PreprocessorError> {
        let pattern = self.call_regex(name, span)?;
        let mut current = text.to_string();
        let mut cursor = 0usize;

        loop {
            let Some(found) = pattern.find(&current[cursor..]) else {
                break;
            };
            let call_start = cursor + found.start();
            let args_start = cursor + found.end();

            let Some((args, consumed)) = scan_arguments(&current[args_start..]) else {
                return Err(self.ctx.report(
                    ErrorKind::UnterminatedInvocation {
                        text: found.as_str().to_string(),
                    },
                    to_source_span(span),
                ));
            };

            if args.len() > params.len() {
                return Err(self.ctx.report(
                    ErrorKind::TooManyArguments {
                        name: name.to_string(),
                    },
                    to_source_span(span),
                ));
            }
            if args.len() < params.len() {
                return Err(self.ctx.report(
                    ErrorKind::NotEnoughArguments {
                        name: name.to_string(),
                    },
                    to_source_span(span),
                ));
            }

            let mut expanded_args = Vec::with_capacity(args.len());
            for arg in &args {
                expanded_args.push(self.expand(arg.trim(), span)?);
            }

            let substituted = self.substitute_params(body, params, &expanded_args, span)?;
            let pasted = paste_tokens(&substituted);
            let expanded = self.with_hidden(name, |ex| ex.expand(&pasted, span))?;

            let call_end = args_start + consumed;
            current.replace_range(call_start..call_end, &expanded);
            cursor = call_start + expanded.len();
        }

        Ok(current)
    }

    /// Substitutes every parameter occurrence in `body` with its expanded
    /// actual, in a single pass: an actual that happens to contain another
    /// parameter's name is never substituted a second time.
    fn substitute_params(
        &self,
        body: &str,
        params: &[String],
        actuals: &[String],
        span: Span,
    ) -> Result<String, PreprocessorError> {
        if params.is_empty() {
            return Ok(body.to_string());
        }

        let bindings: HashMap<&str, &str> = params
            .iter()
            .map(String::as_str)
            .zip(actuals.iter().map(String::as_str))
            .collect();

        let alternation = params
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = self.compile(&format!(r"\b(?:{})\b", alternation), span)?;

        Ok(pattern
            .replace_all(body, |caps: &regex::Captures| {
                bindings[&caps[0]].to_string()
            })
            .into_owned())
    }

    // ------------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------------

    /// Runs `f` with `name` hidden from the environment.
    fn with_hidden<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<T, PreprocessorError>,
    ) -> Result<T, PreprocessorError> {
        self.hidden.push(name.to_string());
        let result = f(self);
        self.hidden.pop();
        result
    }

    /// Whole-word occurrence of a macro name.
    fn word_regex(&self, name: &str, span: Span) -> Result<Regex, PreprocessorError> {
        self.compile(&format!(r"\b{}\b", regex::escape(name)), span)
    }

    /// Macro name followed by its opening parenthesis.
    fn call_regex(&self, name: &str, span: Span) -> Result<Regex, PreprocessorError> {
        self.compile(&format!(r"\b{}\s*\(", regex::escape(name)), span)
    }

    fn compile(&self, pattern: &str, span: Span) -> Result<Regex, PreprocessorError> {
        Regex::new(pattern).map_err(|e| {
            self.ctx
                .internal(format!("bad macro pattern: {}", e), to_source_span(span))
        })
    }
}

// ============================================================================
// ARGUMENT SCANNING
// ============================================================================

/// Scans a macro argument list starting just after the opening `(`.
///
/// Returns the argument strings and the number of bytes consumed, including
/// the closing `)`. Commas split arguments only at parenthesis depth zero.
/// `()` is an empty invocation with zero arguments, while `(,)` is two
/// empty arguments. Returns `None` when the input ends before the list is
/// balanced.
fn scan_arguments(input: &str) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for (offset, ch) in input.char_indices() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' if depth == 0 => {
                if !args.is_empty() || !current.trim().is_empty() {
                    args.push(current);
                }
                return Some((args, offset + 1));
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    None
}

/// Collapses whitespace-delimited `##` so the adjacent tokens join.
fn paste_tokens(text: &str) -> String {
    if !text.contains("##") {
        return text.to_string();
    }
    let pattern = Regex::new(r"\s+##\s+").expect("token paste pattern is valid");
    pattern.replace_all(text, "").into_owned()
}
