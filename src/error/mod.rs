//! Error types and stream-failure classification.

use thiserror::Error;

/// Primary error type for all Rivulet operations.
#[derive(Error, Debug)]
pub enum RivuletError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error ({kind}, code {code}): {message}")]
    Stream {
        kind: StreamFailureKind,
        code: u16,
        message: String,
    },

    #[error("Transport dropped mid-stream: {0}")]
    TransportDrop(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// How an already-open stream failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StreamFailureKind {
    /// Vendor returned 2xx but later emitted an error-shaped event.
    InBandError,
    /// Frame was well-formed but its payload was not parsable, not even as
    /// the vendor's error envelope. Raw text is preserved in the message.
    MalformedPayload,
    /// Bytes arrived that do not form a valid event frame.
    MalformedFrame,
}

/// Coarse classification used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    State,
    Unknown,
}

impl RivuletError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an in-flight stream error.
    pub fn stream(kind: StreamFailureKind, code: u16, message: impl Into<String>) -> Self {
        Self::Stream {
            kind,
            code,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::TransportDrop(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::InvalidState(_) => ErrorCategory::State,
            Self::Api { status, .. } => classify_status(*status),
            Self::Stream { code, .. } => classify_status(*code),
        }
    }

    /// Whether the caller's transport may safely re-attempt the request.
    ///
    /// The classifier only labels; retry execution belongs to the transport.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Vendor-reported numeric code, when one exists.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Stream { code, .. } => Some(*code),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

fn classify_status(status: u16) -> ErrorCategory {
    match status {
        401 | 403 => ErrorCategory::Authentication,
        429 => ErrorCategory::RateLimit,
        // 501 is a permanent refusal, not a transient server fault.
        501 => ErrorCategory::Api,
        500..=599 => ErrorCategory::Server,
        _ => ErrorCategory::Api,
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RivuletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable() {
        let err = RivuletError::RateLimited {
            retry_after_ms: Some(2000),
        };
        assert_eq!(err.category(), ErrorCategory::RateLimit);
        assert!(err.is_retryable());
    }

    #[test]
    fn server_codes_are_retryable() {
        for code in [500, 502, 503, 529] {
            let err = RivuletError::stream(StreamFailureKind::InBandError, code, "overloaded");
            assert!(err.is_retryable(), "code {code} should be retryable");
        }
    }

    #[test]
    fn not_implemented_is_terminal() {
        let err = RivuletError::api(501, "not implemented");
        assert!(!err.is_retryable());
    }

    #[test]
    fn client_errors_are_terminal() {
        assert!(!RivuletError::api(400, "bad request").is_retryable());
        assert!(!RivuletError::Authentication("bad key".into()).is_retryable());
        assert!(!RivuletError::InvalidState("apply after finish".into()).is_retryable());
    }

    #[test]
    fn transport_drop_is_retryable() {
        let err = RivuletError::TransportDrop("connection reset".into());
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
    }
}
