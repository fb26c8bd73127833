//! Error handling.
//!
//! This module provides:
//! - The caller-facing error taxonomy (validation, transport, content, internal)
//! - Initialization errors for the logger and HTTP client
//! - Categorization of client and connection errors into the taxonomy
//!
//! Validation and content errors are shown to the caller verbatim. Transport
//! errors carry a caller-safe message, and internal errors only ever show a
//! generic message; their details go to the log.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_transport_error, is_http_scheme};
pub use types::{
    ContentError, ErrorClass, InitializationError, PlaygroundError, TransportError,
    ValidationError, INTERNAL_ERROR_MESSAGE,
};
