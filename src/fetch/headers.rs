//! Header multimap with canonical keys.
//!
//! Keys are stored in canonical MIME form (`content-type` becomes
//! `Content-Type`) and kept sorted, so iteration order is the lexicographic
//! key order the assembled response is serialized in. Values keep their
//! insertion order per key.

use std::collections::BTreeMap;

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error_handling::ValidationError;

/// Ordered header multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMultimap {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderMultimap {
    /// An empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value after any existing values for the key.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(canonical_header_key(key))
            .or_default()
            .push(value.into());
    }

    /// Replaces all values for the key with a single value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(canonical_header_key(key), vec![value.into()]);
    }

    /// Replaces all values for the key.
    pub fn set_all(&mut self, key: &str, values: Vec<String>) {
        self.entries.insert(canonical_header_key(key), values);
    }

    /// First value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&canonical_header_key(key))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for the key, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&canonical_header_key(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates keys in lexicographic order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Copies headers received from the network.
    ///
    /// Values that are not valid UTF-8 are decoded lossily.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut multimap = Self::new();
        for (name, value) in headers {
            multimap.append(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        multimap
    }

    /// Converts to a wire header map, preserving every value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidHeader` naming the first key whose
    /// name or value cannot be sent.
    pub fn to_header_map(&self) -> Result<HeaderMap, ValidationError> {
        let mut headers = HeaderMap::new();
        for (key, values) in self.iter() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ValidationError::InvalidHeader(key.to_string()))?;
            for value in values {
                let value = HeaderValue::from_str(value)
                    .map_err(|_| ValidationError::InvalidHeader(key.to_string()))?;
                headers.append(name.clone(), value);
            }
        }
        Ok(headers)
    }
}

/// Returns the canonical format of a header key.
///
/// The first letter and any letter following a hyphen are upper case, the
/// rest are lower case. Keys containing a space or other characters invalid
/// in a header name are returned unchanged.
pub fn canonical_header_key(key: &str) -> String {
    if !key.bytes().all(is_token_byte) {
        return key.to_string();
    }

    let mut upper = true;
    key.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_header_key() {
        assert_eq!(canonical_header_key("content-type"), "Content-Type");
        assert_eq!(canonical_header_key("CONTENT-LENGTH"), "Content-Length");
        assert_eq!(canonical_header_key("x-request-id"), "X-Request-Id");
        assert_eq!(canonical_header_key("etag"), "Etag");
        assert_eq!(canonical_header_key("bad key"), "bad key");
    }

    #[test]
    fn test_values_keep_insertion_order() {
        let mut headers = HeaderMultimap::new();
        headers.append("accept", "text/html");
        headers.append("Accept", "application/json");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("ACCEPT"), Some("text/html"));
        assert_eq!(
            headers.get_all("accept"),
            &["text/html".to_string(), "application/json".to_string()]
        );
    }

    #[test]
    fn test_iteration_is_sorted_by_key() {
        let mut headers = HeaderMultimap::new();
        headers.set("x-zeta", "1");
        headers.set("content-type", "text/plain");
        headers.set("accept", "*/*");

        let keys: Vec<&str> = headers.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["Accept", "Content-Type", "X-Zeta"]);
    }

    #[test]
    fn test_set_replaces_values() {
        let mut headers = HeaderMultimap::new();
        headers.append("Vary", "Accept");
        headers.append("Vary", "Origin");
        headers.set("vary", "Cookie");
        assert_eq!(headers.get_all("Vary"), &["Cookie".to_string()]);
    }

    #[test]
    fn test_header_map_round_trip_keeps_multiple_values() {
        let mut wire = HeaderMap::new();
        wire.append("set-cookie", HeaderValue::from_static("a=1"));
        wire.append("set-cookie", HeaderValue::from_static("b=2"));
        wire.insert("content-type", HeaderValue::from_static("text/plain"));

        let headers = HeaderMultimap::from_header_map(&wire);
        assert_eq!(headers.get_all("Set-Cookie").len(), 2);

        let back = headers.to_header_map().unwrap();
        assert_eq!(back.get_all("set-cookie").iter().count(), 2);
        assert_eq!(back.get("content-type").unwrap(), "text/plain");
    }

    #[test]
    fn test_to_header_map_rejects_invalid_name() {
        let mut headers = HeaderMultimap::new();
        headers.append("bad key", "value");
        assert_eq!(
            headers.to_header_map(),
            Err(ValidationError::InvalidHeader("bad key".to_string()))
        );
    }
}
