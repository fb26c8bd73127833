//! Received response data.

use hyper::body::Incoming;
use hyper::ext::ReasonPhrase;
use hyper::{Response, StatusCode, Version};
use url::Url;

use crate::config::{HEADER_CONTENT_ENCODING, HEADER_CONTENT_TYPE};
use crate::error_handling::PlaygroundError;
use crate::fetch::headers::HeaderMultimap;

use super::body::read_capped;

/// What came back from the target, before any decoding or formatting.
#[derive(Debug, Clone)]
pub struct InboundResult {
    /// Protocol version, e.g. `HTTP/1.1`.
    pub proto: String,
    /// Status code and reason as received, e.g. `200 OK`.
    pub status: String,
    /// Response headers with canonical keys, as received.
    pub headers: HeaderMultimap,
    /// Raw body bytes, still content-encoded.
    pub body: Vec<u8>,
}

impl InboundResult {
    /// Captures status and headers, then reads the body under `limit`.
    pub(crate) async fn capture(
        response: Response<Incoming>,
        url: &Url,
        limit: usize,
    ) -> Result<Self, PlaygroundError> {
        let proto = proto_name(response.version());
        let status = status_text(
            response.status(),
            response.extensions().get::<ReasonPhrase>(),
        );
        let headers = HeaderMultimap::from_header_map(response.headers());

        log::debug!(
            "Captured {} {} from {} ({} header keys)",
            proto,
            status,
            url,
            headers.len()
        );

        let body = read_capped(response.into_body(), url, limit).await?;

        Ok(Self {
            proto,
            status,
            headers,
            body,
        })
    }

    /// Declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(HEADER_CONTENT_TYPE)
    }

    /// Declared `Content-Encoding`, if any.
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers.get(HEADER_CONTENT_ENCODING)
    }
}

/// Renders a protocol version the way it appears in a status line.
pub(crate) fn proto_name(version: Version) -> String {
    match version {
        Version::HTTP_09 => "HTTP/0.9".to_string(),
        Version::HTTP_10 => "HTTP/1.0".to_string(),
        Version::HTTP_11 => "HTTP/1.1".to_string(),
        Version::HTTP_2 => "HTTP/2.0".to_string(),
        Version::HTTP_3 => "HTTP/3.0".to_string(),
        other => format!("{other:?}"),
    }
}

/// Code and reason phrase, e.g. `200 OK`.
///
/// The client only records a reason when it differs from the canonical one
/// for the code, so the received phrase wins whenever there is one. An empty
/// or missing reason with no canonical fallback leaves just the code.
pub(crate) fn status_text(status: StatusCode, received: Option<&ReasonPhrase>) -> String {
    let reason = match received {
        Some(phrase) => Some(String::from_utf8_lossy(phrase.as_bytes()).into_owned()),
        None => status.canonical_reason().map(str::to_string),
    };

    match reason.filter(|reason| !reason.is_empty()) {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proto_name() {
        assert_eq!(proto_name(Version::HTTP_11), "HTTP/1.1");
        assert_eq!(proto_name(Version::HTTP_2), "HTTP/2.0");
    }

    #[test]
    fn test_status_text_canonical() {
        assert_eq!(status_text(StatusCode::OK, None), "200 OK");
        assert_eq!(status_text(StatusCode::NOT_FOUND, None), "404 Not Found");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap(), None), "599");
    }

    #[test]
    fn test_status_text_keeps_received_reason() {
        let reason = ReasonPhrase::from_static(b"Everything Is Fine");
        assert_eq!(
            status_text(StatusCode::OK, Some(&reason)),
            "200 Everything Is Fine"
        );

        let reason = ReasonPhrase::from_static(b"Site Overloaded");
        assert_eq!(
            status_text(StatusCode::from_u16(599).unwrap(), Some(&reason)),
            "599 Site Overloaded"
        );

        let empty = ReasonPhrase::from_static(b"");
        assert_eq!(status_text(StatusCode::OK, Some(&empty)), "200");
    }
}
