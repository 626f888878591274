//! Common result and error types for engine self-checks.

/// The result type for operations whose only failure mode is an engine bug.
///
/// `Err` indicates that a self-consistency check failed (for example the
/// bottom-up and top-down alias tables disagree), never a problem with the
/// user's design. Design problems are structural errors or diagnostics.
pub type StrataResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the engine, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("alias tables differ");
        assert_eq!(format!("{err}"), "internal error: alias tables differ");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
