//! Errors that stop the engine.

use strata_common::InternalError;
use strata_config::ConfigError;
use strata_diagnostics::{codes, Diagnostic, Location};
use strata_ir::DesignError;
use strata_model::ModelError;

/// A fatal engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The design file could not be read.
    #[error("failed to read design: {0}")]
    Io(#[from] std::io::Error),

    /// The design file is not valid JSON for a design.
    #[error("failed to parse design: {0}")]
    Parse(String),

    /// The design file parsed but its references do not resolve.
    #[error(transparent)]
    Design(#[from] DesignError),

    /// The hints are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A structural error in the design.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A self-consistency check failed.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl EngineError {
    /// Renders design problems as an error diagnostic.
    ///
    /// Returns `None` for errors that are not about the design's contents.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            EngineError::Model(e) => Some(e.to_diagnostic()),
            EngineError::Design(_) => {
                Some(Diagnostic::error(codes::E303, self.to_string(), Location::NONE))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_render() {
        let e = EngineError::from(ModelError::Overlap {
            module: "top".into(),
            signal: "a[0]".into(),
        });
        let d = e.to_diagnostic().unwrap();
        assert_eq!(d.code, codes::E301);
        assert_eq!(d.location, Location::signal("top", "a[0]"));
    }

    #[test]
    fn internal_errors_are_not_diagnostics() {
        let e = EngineError::from(InternalError::new("alias tables differ"));
        assert_eq!(e.to_string(), "internal error: alias tables differ");
        assert!(e.to_diagnostic().is_none());
    }

    #[test]
    fn design_errors_render() {
        let e = EngineError::from(DesignError::MissingTop(strata_ir::ModuleId::from_raw(3)));
        assert_eq!(e.to_diagnostic().unwrap().code, codes::E303);
    }
}
