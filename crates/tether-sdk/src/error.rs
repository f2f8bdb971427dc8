//! Error types raised by host-side handles

/// Result type for host handle calls
pub type HostResult<T> = Result<T, HostError>;

/// Failure raised while a host getter, setter or function runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// The host operation itself failed
    #[error("{0}")]
    Failed(String),

    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),
}

impl HostError {
    /// Shorthand for [`HostError::Failed`]
    pub fn failed(message: impl Into<String>) -> Self {
        HostError::Failed(message.into())
    }

    /// Shorthand for [`HostError::TypeMismatch`]
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        HostError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Failed(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Failed(s.to_string())
    }
}
