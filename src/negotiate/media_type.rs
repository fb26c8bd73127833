//! Content-Type parsing.

use std::fmt;

/// A `type/subtype` pair with parameters stripped, lower case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    top: String,
    sub: String,
}

impl MediaType {
    /// Parses a `Content-Type` value such as `Application/JSON; charset=utf-8`.
    ///
    /// Returns `None` unless the part before any `;` is exactly two non-empty
    /// tokens separated by `/`.
    pub fn parse(value: &str) -> Option<Self> {
        let essence = value.split(';').next()?.trim();
        let (top, sub) = essence.split_once('/')?;
        let (top, sub) = (top.trim(), sub.trim());

        if !is_token(top) || !is_token(sub) {
            return None;
        }

        Some(Self {
            top: top.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
        })
    }

    /// Top-level type, e.g. `text`.
    pub fn top_level(&self) -> &str {
        &self.top
    }

    /// Subtype, e.g. `html`.
    pub fn subtype(&self) -> &str {
        &self.sub
    }

    /// `type/subtype`, the key used for engine lookup.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.top, self.sub)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.sub)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
