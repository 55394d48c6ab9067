//! The macro system: definitions, the ordered environment, and the
//! expansion engine.
//!
//! Expansion order is semantic: macros are applied to a text in the order
//! they were defined, so the environment is an insertion-ordered mapping
//! rather than a hash map. Overwriting a name keeps its original position;
//! `#undef` followed by a fresh `#define` moves the name to the end.

use serde::{Deserialize, Serialize};

pub mod expander;

pub use expander::MacroExpander;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A macro definition. `params` present means function-like; an empty
/// parameter vector is still function-like (`#define F()` takes zero
/// arguments, while `#define F` has no argument list at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    pub params: Option<Vec<String>>,
    pub body: String,
}

impl Macro {
    /// An object-like macro: every whole-word occurrence of the name is
    /// replaced by `body`.
    pub fn object(body: impl Into<String>) -> Self {
        Self {
            params: None,
            body: body.into(),
        }
    }

    /// A function-like macro: `NAME(args)` is replaced by `body` after
    /// parameter substitution.
    pub fn function(params: Vec<String>, body: impl Into<String>) -> Self {
        Self {
            params: Some(params),
            body: body.into(),
        }
    }

    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }
}

/// Insertion-ordered macro environment.
///
/// Lookups are linear; macro counts in real sources are small and the
/// ordering guarantees are what the expander depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroEnv {
    entries: Vec<(String, Macro)>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl MacroEnv {
    /// Creates a new, empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment seeded with object-like macros, in order.
    pub fn seeded<'a>(defines: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut env = Self::new();
        for (name, body) in defines {
            env.define(name, Macro::object(body));
        }
        env
    }

    /// Defines or redefines a macro. Redefinition keeps the name's original
    /// position in the expansion order.
    pub fn define(&mut self, name: &str, def: Macro) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = def;
        } else {
            self.entries.push((name.to_string(), def));
        }
    }

    /// Removes a macro. Undefining an unknown name is a no-op.
    pub fn undef(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Checks whether a macro with the given name is defined.
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Looks up a macro by name.
    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    /// Iterates over `(name, macro)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Macro)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Returns the number of defined macros.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
