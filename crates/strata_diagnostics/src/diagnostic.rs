//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::location::Location;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message located in a design.
///
/// Each diagnostic carries a severity and code, a one-line message, the
/// module/signal it concerns, and optional notes and help lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The module and signal the diagnostic concerns.
    pub location: Location,
    /// Explanatory footnotes (e.g., the members of a cycle).
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, code: DiagnosticCode, message: String, location: Location) -> Self {
        Self {
            severity,
            code,
            message,
            location,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, code, message.into(), location)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Warning, code, message.into(), location)
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Warning, 300);
        let diag = Diagnostic::warning(code, "combinational cycle", Location::signal("top", "a"))
            .with_note("cycle: a -> b -> a")
            .with_help("break the loop with a register");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
        assert_eq!(diag.location.signal.as_deref(), Some("a"));
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 301),
            "overlap",
            Location::module("m"),
        );
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(diag, back);
    }
}
