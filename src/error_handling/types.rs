//! Error type definitions.
//!
//! Every failure in the pipeline belongs to exactly one of four classes. The
//! `Display` text of each error is what the caller sees in the assembled
//! response; internal details stay in the server-side log.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Caller-visible message for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error while processing the request";

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the TLS configuration of the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] rustls::Error),
}

/// The request was rejected before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Method outside the allow-list.
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),

    /// Unparsable target, or a target (or redirect hop) pointing at a
    /// private or loopback address.
    #[error("invalid target URL")]
    InvalidTarget,

    /// Outbound body over the size cap.
    #[error("request body is too large")]
    RequestBodyTooLarge,

    /// Header name or value that cannot be sent on the wire.
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

/// The exchange with the target failed on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Deadline exceeded or the exchange was cancelled.
    #[error("request timed out")]
    Timeout,

    /// The target URL uses a scheme the client cannot speak.
    #[error("unsupported protocol scheme \"{0}\"")]
    UnsupportedScheme(String),

    /// Name resolution or connection failure.
    #[error("could not reach {0}")]
    Unreachable(String),
}

/// The response arrived but its content cannot be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// No formatting engine for a non-text media type.
    #[error("unsupported media type {0}")]
    UnsupportedMediaType(String),

    /// Content-Encoding with no matching decoder.
    #[error("unsupported content encoding {0}")]
    UnsupportedEncoding(String),

    /// Decompressed body over the size cap.
    #[error("response body is too large")]
    BodyTooLarge,
}

/// Any failure of the request pipeline.
///
/// `to_string()` is always safe to show to the caller. For `Internal`, the
/// real cause is only reachable through [`PlaygroundError::detail`].
#[derive(Error, Debug)]
pub enum PlaygroundError {
    /// Rejected before any network activity, or at a redirect hop.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed on the wire.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Received but not renderable.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Anything unexpected. Shown to the caller as a fixed message.
    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal {
        /// Server-side description of the failure.
        detail: String,
    },
}

impl PlaygroundError {
    /// Wraps an unexpected failure. The detail is never shown to the caller.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        PlaygroundError::Internal {
            detail: detail.to_string(),
        }
    }

    /// Returns the class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            PlaygroundError::Validation(_) => ErrorClass::Validation,
            PlaygroundError::Transport(_) => ErrorClass::Transport,
            PlaygroundError::Content(_) => ErrorClass::Content,
            PlaygroundError::Internal { .. } => ErrorClass::Internal,
        }
    }

    /// Full description for the server-side log.
    pub fn detail(&self) -> String {
        match self {
            PlaygroundError::Internal { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Failure classes, used to tag log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorClass {
    /// See [`PlaygroundError::Validation`].
    Validation,
    /// See [`PlaygroundError::Transport`].
    Transport,
    /// See [`PlaygroundError::Content`].
    Content,
    /// See [`PlaygroundError::Internal`].
    Internal,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorClass {
    /// Lower-case label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Validation => "validation error",
            ErrorClass::Transport => "transport error",
            ErrorClass::Content => "content error",
            ErrorClass::Internal => "internal error",
        }
    }
}
