//! Error types for hint loading and validation.

/// Errors that can occur when loading or validating a design hints file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the hints file.
    #[error("failed to read hints: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse hints: {0}")]
    ParseError(String),

    /// A hint value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(err.to_string(), "failed to parse hints: expected '=' at line 3");
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("empty clock name".to_string());
        assert_eq!(err.to_string(), "validation error: empty clock name");
    }

    #[test]
    fn display_io_error() {
        let err = ConfigError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("failed to read hints:"));
    }
}
