use std::fmt;
use std::io;

use chrono::Utc;

use crate::config::{
    DEFAULT_CONTENT_TYPE, DEFAULT_STATUS, DEFAULT_STATUS_PROTO, HEADER_CONTENT_LENGTH,
    HEADER_CONTENT_TYPE, HEADER_DATE, HEADER_SERVER, SERVER_IDENTITY,
};
use crate::error_handling::PlaygroundError;
use crate::fetch::HeaderMultimap;

/// RFC 1123 date as used in HTTP headers.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Accumulates a status line, headers, and a body, then serializes them.
///
/// Serialization writes the status line, every header sorted by key with
/// one line per value, a blank line, and the body verbatim.
///
/// # Examples
///
/// ```
/// use http_playground::response::ResponseBuilder;
///
/// let mut response = ResponseBuilder::new();
/// response.write(b"hello");
/// assert_eq!(response.to_string(), "HTTP/1.0 200 OK\n\nhello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    start_line: Option<String>,
    headers: HeaderMultimap,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// An empty response with the default status line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status line from a protocol version and a status such as
    /// `404 Not Found`. Both parts are trimmed.
    pub fn set_start_line(&mut self, proto: &str, status: &str) {
        self.start_line = Some(format!("{} {}", proto.trim(), status.trim()));
    }

    /// Copies `headers` in. A key present in both is replaced.
    pub fn set_headers(&mut self, headers: &HeaderMultimap) {
        for (key, values) in headers.iter() {
            self.headers.set_all(key, values.to_vec());
        }
    }

    /// Discards all headers and sets the ones used for synthesized
    /// responses. `Content-Length` reflects the body at the time of the call.
    pub fn default_headers(&mut self) {
        let mut headers = HeaderMultimap::new();
        headers.set(HEADER_CONTENT_LENGTH, self.body.len().to_string());
        headers.set(HEADER_CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        headers.set(HEADER_DATE, Utc::now().format(HTTP_DATE_FORMAT).to_string());
        headers.set(HEADER_SERVER, SERVER_IDENTITY);
        self.headers = headers;
    }

    /// Appends to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Replaces the body with the caller-visible message of `err`.
    pub fn write_error(&mut self, err: &PlaygroundError) {
        self.body.clear();
        self.body.extend_from_slice(err.to_string().as_bytes());
    }

    /// Status line, or `HTTP/1.0 200 OK` when none was set.
    pub fn status_line(&self) -> String {
        self.start_line
            .clone()
            .unwrap_or_else(|| format!("{DEFAULT_STATUS_PROTO} {DEFAULT_STATUS}"))
    }

    /// Headers as they will be serialized.
    pub fn headers(&self) -> &HeaderMultimap {
        &self.headers
    }

    /// Body bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.headers.len() * 32 + self.body.len());
        out.extend_from_slice(self.status_line().as_bytes());
        out.push(b'\n');
        for (key, values) in self.headers.iter() {
            for value in values {
                out.extend_from_slice(format!("{key}: {value}\n").as_bytes());
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out
    }
}

impl io::Write for ResponseBuilder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Lossy for bodies that are not valid UTF-8.
impl fmt::Display for ResponseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes()))
    }
}

/// Escapes markup and both quote characters so the serialized response can
/// be embedded in an HTML document, inside or outside an attribute.
pub fn escape_html(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    html_escape::encode_quoted_attribute(&text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{TransportError, ValidationError};
    use std::io::Write;

    const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing
elit. Proin gravida sed eros vel posuere.";

    fn fixed_headers() -> HeaderMultimap {
        let mut headers = HeaderMultimap::new();
        headers.set("server", "upstream/2.4");
        headers.set("Date", "Mon, 09 Sep 2024 13:39:17 GMT");
        headers.set("content-type", "text/plain; charset=utf-8");
        headers
    }

    #[test]
    fn test_new_builder_is_empty() {
        let response = ResponseBuilder::new();
        assert!(response.body().is_empty());
        assert!(response.headers().is_empty());
        assert_eq!(response.status_line(), "HTTP/1.0 200 OK");
    }

    #[test]
    fn test_set_start_line_trims() {
        let mut response = ResponseBuilder::new();
        response.set_start_line(" HTTP/1.1", "404 Not Found \n");
        assert_eq!(response.status_line(), "HTTP/1.1 404 Not Found");
    }

    #[test]
    fn test_serializes_headers_sorted() {
        let mut response = ResponseBuilder::new();
        response.set_headers(&fixed_headers());
        response.write(LOREM.as_bytes());

        let expected = format!(
            "HTTP/1.0 200 OK
Content-Type: text/plain; charset=utf-8
Date: Mon, 09 Sep 2024 13:39:17 GMT
Server: upstream/2.4

{LOREM}"
        );
        assert_eq!(response.to_string(), expected);
        assert_eq!(response.bytes(), expected.into_bytes());
    }

    #[test]
    fn test_multi_valued_header_repeats_key() {
        let mut headers = fixed_headers();
        for value in ["1", "2", "3"] {
            headers.append("x-value", value);
        }
        let mut response = ResponseBuilder::new();
        response.set_start_line("HTTP/2.0", "201 Created");
        response.set_headers(&headers);

        let rendered = response.to_string();
        assert!(rendered.starts_with("HTTP/2.0 201 Created\n"));
        assert!(rendered.ends_with("Server: upstream/2.4\nX-Value: 1\nX-Value: 2\nX-Value: 3\n\n"));
    }

    #[test]
    fn test_set_headers_replaces_existing_key() {
        let mut first = HeaderMultimap::new();
        first.append("X-A", "old");
        first.append("X-B", "kept");
        let mut second = HeaderMultimap::new();
        second.append("x-a", "new");

        let mut response = ResponseBuilder::new();
        response.set_headers(&first);
        response.set_headers(&second);
        assert_eq!(response.headers().get_all("X-A"), ["new".to_string()]);
        assert_eq!(response.headers().get("X-B"), Some("kept"));
    }

    #[test]
    fn test_default_headers_discard_previous() {
        let mut response = ResponseBuilder::new();
        response.set_headers(&fixed_headers());
        response.write(b"twelve bytes");
        response.default_headers();

        let keys: Vec<&str> = response.headers().iter().map(|(key, _)| key).collect();
        assert_eq!(keys, crate::config::DEFAULT_HEADERS);
        assert_eq!(response.headers().get("Content-Length"), Some("12"));
        assert_eq!(
            response.headers().get("Content-Type"),
            Some(DEFAULT_CONTENT_TYPE)
        );
        assert_eq!(response.headers().get("Server"), Some(SERVER_IDENTITY));

        let date = response.headers().get("Date").unwrap();
        assert!(date.ends_with(" GMT"));
        assert!(chrono::NaiveDateTime::parse_from_str(date, HTTP_DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_write_appends() {
        let mut response = ResponseBuilder::new();
        response.write(b"\nline1");
        write!(response, "\nline{}\n", 2).unwrap();
        assert_eq!(response.body(), b"\nline1\nline2\n");
    }

    #[test]
    fn test_write_error_replaces_body() {
        let mut response = ResponseBuilder::new();
        response.write(b"line1\nline2\nline3");
        response.write_error(&ValidationError::MethodNotAllowed("CONNECT".into()).into());
        assert_eq!(response.body(), b"method CONNECT is not allowed");

        response.write_error(&TransportError::Timeout.into());
        assert_eq!(response.body(), b"request timed out");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(b"<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
        assert_eq!(escape_html(b"plain"), "plain");
        assert_eq!(escape_html(b"caf\xc3\xa9 \xff"), "caf\u{e9} \u{fffd}");
    }
}
