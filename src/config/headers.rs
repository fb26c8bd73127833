//! HTTP header name constants.
//!
//! Header names as they appear in the assembled response. Keys are stored in
//! canonical form (`Content-Type`), so these are the canonical spellings.

/// Length of the assembled body
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
/// Declared media type
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Declared body encoding
pub const HEADER_CONTENT_ENCODING: &str = "Content-Encoding";
/// Time the response was synthesized
pub const HEADER_DATE: &str = "Date";
/// Identity of the synthesizing server
pub const HEADER_SERVER: &str = "Server";

/// Headers set by `ResponseBuilder::default_headers`, in serialization order.
pub const DEFAULT_HEADERS: &[&str] = &[
    HEADER_CONTENT_LENGTH,
    HEADER_CONTENT_TYPE,
    HEADER_DATE,
    HEADER_SERVER,
];
