use std::io;

use thiserror::Error;

/// Library-wide error type for socra operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Configuration values failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Concept bank content violates the bank schema.
    #[error("Malformed concept bank: {0}")]
    MalformedBank(String),

    /// Two concepts in the bank share a name.
    #[error("Duplicate concept '{0}' in concept bank")]
    DuplicateConcept(String),

    /// Concept lookup by name failed.
    #[error("Concept '{0}' not found")]
    ConceptNotFound(String),

    /// No concept scored at or above the confidence threshold.
    #[error("No concept matched with enough confidence (best score {best_score:.2})")]
    NoConfidentMatch { best_score: f64 },

    /// Completion service could not be reached or refused the request.
    #[error("Completion service unavailable: {message}")]
    GatewayUnavailable { message: String, status: Option<u16> },

    /// Completion service did not answer within the configured timeout.
    #[error("Completion service timed out after {timeout_secs}s")]
    GatewayTimeout { timeout_secs: u64 },

    /// Completion service answered with an empty, blocked, or unparseable body.
    #[error("Completion service returned an invalid response: {0}")]
    GatewayInvalidResponse(String),

    /// Session id is unknown or the session was ended.
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// A previous operation panicked while holding the session lock.
    #[error("Session '{0}' is unavailable after an internal failure")]
    SessionPoisoned(String),

    /// Prompt template rendering failed or produced an empty section.
    #[error("Prompt composition failed: {0}")]
    PromptComposition(String),

    /// Internal invariant violated.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn malformed_bank<S: Into<String>>(message: S) -> Self {
        AppError::MalformedBank(message.into())
    }

    /// Errors isolated to a single turn. The session is unchanged and the
    /// caller may retry the same input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NoConfidentMatch { .. }
                | AppError::GatewayUnavailable { .. }
                | AppError::GatewayTimeout { .. }
                | AppError::GatewayInvalidResponse(_)
        )
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_)
            | AppError::InvalidConfig(_)
            | AppError::TomlParseError(_)
            | AppError::MalformedBank(_)
            | AppError::PromptComposition(_)
            | AppError::NoConfidentMatch { .. } => io::ErrorKind::InvalidInput,
            AppError::DuplicateConcept(_) => io::ErrorKind::AlreadyExists,
            AppError::ConceptNotFound(_) | AppError::SessionNotFound(_) => io::ErrorKind::NotFound,
            AppError::GatewayTimeout { .. } => io::ErrorKind::TimedOut,
            AppError::GatewayUnavailable { .. } => io::ErrorKind::ConnectionRefused,
            AppError::GatewayInvalidResponse(_) => io::ErrorKind::InvalidData,
            AppError::SessionPoisoned(_) | AppError::InternalError(_) => io::ErrorKind::Other,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedBank(format!("invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_failures_are_recoverable() {
        assert!(AppError::GatewayTimeout { timeout_secs: 5 }.is_recoverable());
        assert!(AppError::GatewayUnavailable { message: "down".into(), status: None }.is_recoverable());
        assert!(AppError::GatewayInvalidResponse("empty".into()).is_recoverable());
        assert!(AppError::NoConfidentMatch { best_score: 0.1 }.is_recoverable());
    }

    #[test]
    fn bank_and_session_errors_are_not_recoverable() {
        assert!(!AppError::MalformedBank("x".into()).is_recoverable());
        assert!(!AppError::DuplicateConcept("x".into()).is_recoverable());
        assert!(!AppError::SessionNotFound("x".into()).is_recoverable());
    }

    #[test]
    fn kind_maps_lookup_failures_to_not_found() {
        assert_eq!(AppError::ConceptNotFound("x".into()).kind(), io::ErrorKind::NotFound);
        assert_eq!(AppError::SessionNotFound("x".into()).kind(), io::ErrorKind::NotFound);
        assert_eq!(AppError::GatewayTimeout { timeout_secs: 1 }.kind(), io::ErrorKind::TimedOut);
    }
}
