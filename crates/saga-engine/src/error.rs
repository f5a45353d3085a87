//! Engine error types.

use thiserror::Error;

/// Error raised by a saga while it runs. Propagated out of the drive as-is.
pub type SagaError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a saga drive. Every failure is fatal to the run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A malformed invocation or a yielded effect with no mapping entry.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// The saga was still running when the configured step ceiling was hit.
    #[error("step limit exceeded: saga still running after {limit} steps")]
    StepLimitExceeded { limit: u64 },

    /// The saga itself failed while being resumed.
    #[error("saga error: {0}")]
    Saga(#[source] SagaError),
}

impl EngineError {
    /// The assertion message, if this is an assertion failure.
    pub fn assertion_message(&self) -> Option<&str> {
        match self {
            Self::Assertion(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Engine result type alias.
pub type EngineResult<T> = Result<T, EngineError>;

/// Fail with [`EngineError::Assertion`] when `condition` is false.
///
/// An empty message is replaced with `"Assertion failed"`.
pub fn ensure(condition: bool, message: impl Into<String>) -> EngineResult<()> {
    if condition {
        return Ok(());
    }
    let message = message.into();
    if message.is_empty() {
        Err(EngineError::Assertion("Assertion failed".into()))
    } else {
        Err(EngineError::Assertion(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_passes() {
        assert!(ensure(true, "never shown").is_ok());
    }

    #[test]
    fn test_ensure_carries_message() {
        let err = ensure(false, "boom").unwrap_err();
        assert_eq!(err.assertion_message(), Some("boom"));
        assert_eq!(err.to_string(), "assertion failed: boom");
    }

    #[test]
    fn test_ensure_default_message() {
        let err = ensure(false, "").unwrap_err();
        assert_eq!(err.assertion_message(), Some("Assertion failed"));
    }
}
