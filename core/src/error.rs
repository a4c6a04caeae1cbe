use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// The error type for bitbutter operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The signing secret is not valid base64
    SecretInvalid,

    /// HTTP method outside of GET, POST and DELETE
    MethodUnsupported,

    /// Transport failure or non-success response status
    RequestFailed,

    /// Response body is not valid JSON
    DecodeFailed,

    /// Configuration error (missing fields, conflicting identity)
    ConfigInvalid,

    /// Unexpected errors (header encoding, uri building, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the response status that caused this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the response status, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Check if this error was raised before anything was sent.
    ///
    /// Such errors are caused by local input and will fail again on retry.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::SecretInvalid | ErrorKind::MethodUnsupported | ErrorKind::ConfigInvalid
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a secret invalid error
    pub fn secret_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SecretInvalid, message)
    }

    /// Create a method unsupported error
    pub fn method_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodUnsupported, message)
    }

    /// Create a request failed error
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestFailed, message)
    }

    /// Create a decode failed error
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecodeFailed, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SecretInvalid => write!(f, "invalid secret"),
            ErrorKind::MethodUnsupported => write!(f, "unsupported method"),
            ErrorKind::RequestFailed => write!(f, "request failed"),
            ErrorKind::DecodeFailed => write!(f, "decode failed"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode_failed(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = Error::request_failed("GET /v1/exchanges");
        assert_eq!(err.to_string(), "request failed: GET /v1/exchanges");
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert!(err.status().is_none());
    }

    #[test]
    fn test_local_errors() {
        assert!(Error::secret_invalid("x").is_local());
        assert!(Error::method_unsupported("x").is_local());
        assert!(!Error::request_failed("x").is_local());
        assert!(!Error::decode_failed("x").is_local());
    }

    #[test]
    fn test_with_status() {
        let err = Error::request_failed("x").with_status(StatusCode::UNAUTHORIZED);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
