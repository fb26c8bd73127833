//! Outbound request construction.
//!
//! An `OutboundRequest` is built once from caller input and never changes
//! afterwards. Construction performs every check that needs no network:
//! method allow-list, body size, URL syntax, and header syntax.

use hyper::header::HeaderMap;
use hyper::Method;
use url::Url;

use crate::config::MAX_BODY_BYTES;
use crate::error_handling::ValidationError;
use crate::fetch::headers::HeaderMultimap;
use crate::security::validate_method;

/// A validated request ready to be forwarded.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    target: Url,
    headers: HeaderMultimap,
    header_map: HeaderMap,
    body: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Builds a request from caller input.
    ///
    /// Header keys and values are trimmed; pairs where both are empty are
    /// skipped, and keys are canonicalized. Values for a repeated key keep
    /// their order.
    ///
    /// # Errors
    ///
    /// Checks run in this order and the first failure is returned:
    /// - `MethodNotAllowed` for a method outside the allow-list
    /// - `RequestBodyTooLarge` for a body of 5 MiB or more
    /// - `InvalidTarget` for a target that does not parse as a URL
    /// - `InvalidHeader` for a header that cannot be sent
    ///
    /// The literal-IP target check is not done here; it runs in the
    /// forwarder for the target and every redirect hop alike.
    pub fn new<I, K, V>(
        method: &str,
        target: &str,
        headers: I,
        body: Option<impl Into<Vec<u8>>>,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let method = validate_method(method)?;

        let body = body.map(Into::into);
        if body.as_ref().is_some_and(|b| b.len() >= MAX_BODY_BYTES) {
            return Err(ValidationError::RequestBodyTooLarge);
        }

        let target = Url::parse(target.trim()).map_err(|e| {
            log::debug!("Target {:?} does not parse: {}", target, e);
            ValidationError::InvalidTarget
        })?;

        let mut multimap = HeaderMultimap::new();
        for (key, value) in headers {
            let (key, value) = (key.as_ref().trim(), value.as_ref().trim());
            if key.is_empty() && value.is_empty() {
                continue;
            }
            multimap.append(key, value);
        }
        let header_map = multimap.to_header_map()?;

        Ok(Self {
            method,
            target,
            headers: multimap,
            header_map,
            body,
        })
    }

    /// Allowed method, as given.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Parsed target of the first hop.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Caller headers with canonical keys.
    pub fn headers(&self) -> &HeaderMultimap {
        &self.headers
    }

    /// The same headers, ready for the wire.
    pub fn header_map(&self) -> &HeaderMap {
        &self.header_map
    }

    /// Body bytes, if the caller supplied one.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_BODY: Option<Vec<u8>> = None;
    const NO_HEADERS: [(&str, &str); 0] = [];

    #[test]
    fn test_new_trims_and_canonicalizes_headers() {
        let request = OutboundRequest::new(
            "GET",
            "https://example.com/",
            [
                ("  content-type ", " application/json "),
                ("", ""),
                ("x-trace", "a"),
                ("X-TRACE", "b"),
            ],
            NO_BODY,
        )
        .unwrap();

        assert_eq!(request.headers().len(), 2);
        assert_eq!(
            request.headers().get("Content-Type"),
            Some("application/json")
        );
        assert_eq!(
            request.headers().get_all("X-Trace"),
            &["a".to_string(), "b".to_string()]
        );
        assert_eq!(request.header_map().get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn test_new_rejects_disallowed_method_first() {
        let err = OutboundRequest::new("CONNECT", "not a url", NO_HEADERS, NO_BODY).unwrap_err();
        assert_eq!(err, ValidationError::MethodNotAllowed("CONNECT".into()));
    }

    #[test]
    fn test_new_rejects_unparsable_target() {
        let err = OutboundRequest::new("GET", "://nope", NO_HEADERS, NO_BODY).unwrap_err();
        assert_eq!(err, ValidationError::InvalidTarget);
    }

    #[test]
    fn test_new_rejects_large_body() {
        let body = vec![b'a'; MAX_BODY_BYTES];
        let err =
            OutboundRequest::new("POST", "https://example.com/", NO_HEADERS, Some(body)).unwrap_err();
        assert_eq!(err, ValidationError::RequestBodyTooLarge);
    }

    #[test]
    fn test_new_accepts_body_below_cap() {
        let request = OutboundRequest::new(
            "POST",
            "https://example.com/",
            NO_HEADERS,
            Some("{\"a\":1}"),
        )
        .unwrap();
        assert_eq!(request.body(), Some(&b"{\"a\":1}"[..]));
        assert_eq!(*request.method(), Method::POST);
    }

    #[test]
    fn test_new_rejects_unsendable_header_value() {
        let err = OutboundRequest::new(
            "GET",
            "https://example.com/",
            [("X-Bad", "line\nbreak")],
            NO_BODY,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidHeader("X-Bad".into()));
    }
}
