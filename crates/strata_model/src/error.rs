//! Structural errors found while building the model.

use strata_diagnostics::{codes, Diagnostic, Location};
use strata_ir::DesignError;

/// A structural error. Any of these aborts model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Illegal strength, bad width, unknown reference or double assignment.
    #[error("inconsistent module {module}: {message}")]
    Consistency {
        /// The offending module.
        module: String,
        /// What is wrong.
        message: String,
    },
    /// An alias would drive a bit that is already driven.
    #[error("overlapping assignment in module {module}: {signal} is already driven")]
    Overlap {
        /// The offending module.
        module: String,
        /// The doubly driven bit.
        signal: String,
    },
    /// Aliases that connect only undriven bits.
    #[error("dangling alias in module {module}: {signal} never reaches a driver")]
    DanglingAlias {
        /// The offending module.
        module: String,
        /// One bit of the unresolved alias.
        signal: String,
    },
    /// The module hierarchy itself is malformed.
    #[error(transparent)]
    Design(#[from] DesignError),
}

impl ModelError {
    pub(crate) fn consistency(module: &str, message: impl Into<String>) -> Self {
        ModelError::Consistency {
            module: module.to_string(),
            message: message.into(),
        }
    }

    /// Renders the error as an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = self.to_string();
        match self {
            ModelError::Consistency { module, .. } => {
                Diagnostic::error(codes::E300, message, Location::module(module))
            }
            ModelError::Overlap { module, signal } => {
                Diagnostic::error(codes::E301, message, Location::signal(module, signal))
                    .with_help("remove one of the drivers or aliases")
            }
            ModelError::DanglingAlias { module, signal } => {
                Diagnostic::error(codes::E302, message, Location::signal(module, signal))
            }
            ModelError::Design(_) => Diagnostic::error(codes::E303, message, Location::NONE),
        }
    }
}
