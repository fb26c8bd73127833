//! Configuration constants.
//!
//! This module defines the limits, timeouts, and fixed strings used throughout
//! the request pipeline.

use std::time::Duration;

// Request limits
/// Maximum accepted body size in bytes (5MB), applied both to the outbound
/// request body and to the decompressed response body.
pub const MAX_BODY_BYTES: usize = 5 << 20;

/// HTTP methods a caller may forward.
pub const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

// Network operation timeouts
/// Overall deadline for one forwarded exchange (all redirect hops plus the body read).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

// Redirect handling
/// Maximum number of redirect hops to follow.
/// The response to the hop after the last one is returned as-is, unfollowed.
pub const MAX_REDIRECT_HOPS: usize = 5;

// Formatting
/// Indentation unit for one nesting level.
pub const INDENT: &str = "  ";
/// HTML text up to this many characters may stay on the line of its opening tag.
pub const HTML_SHORT_TEXT_RUNES: usize = 80;

// Assembled response defaults
/// Identity reported in the `Server` header of synthesized error responses.
pub const SERVER_IDENTITY: &str = "http_playground (v0.1.0)";
/// Protocol used when no status line was ever captured.
pub const DEFAULT_STATUS_PROTO: &str = "HTTP/1.0";
/// Status used when no status line was ever captured.
pub const DEFAULT_STATUS: &str = "200 OK";
/// Content type of synthesized error responses.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
