//! Design locations attached to diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in a design a diagnostic applies: a module and optionally a signal in it.
///
/// Names are stored resolved so that diagnostics outlive the interner that
/// produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The module name, if the diagnostic is module-specific.
    pub module: Option<String>,
    /// A wire, port-instance or driver name inside `module`.
    pub signal: Option<String>,
}

impl Location {
    /// A location that names nothing.
    pub const NONE: Location = Location {
        module: None,
        signal: None,
    };

    /// A location naming a whole module.
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            module: Some(name.into()),
            signal: None,
        }
    }

    /// A location naming a signal inside a module.
    pub fn signal(module: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            signal: Some(signal.into()),
        }
    }

    /// Returns `true` if neither a module nor a signal is named.
    pub fn is_none(&self) -> bool {
        self.module.is_none() && self.signal.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.module, &self.signal) {
            (Some(m), Some(s)) => write!(f, "module {m}, signal {s}"),
            (Some(m), None) => write!(f, "module {m}"),
            (None, Some(s)) => write!(f, "signal {s}"),
            (None, None) => Ok(()),
        }
    }
}
