//! Body formatting engines.
//!
//! Each engine is a pure transform from raw body bytes to readable text for
//! one family of media types. Engines never fail: malformed input is logged
//! and degrades to empty or partial output.

mod html;
mod json;
mod text;
mod tokenizer;
mod xml;

use strum_macros::EnumIter as EnumIterMacro;

/// Formatting engines, selected by media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum Engine {
    /// Whitespace trimming only.
    Text,
    /// Two-space pretty printing.
    Json,
    /// Tag-per-line reindentation.
    Xml,
    /// Block-aware reindentation that keeps inline markup on its line.
    Html,
}

impl Engine {
    /// Formats `input` with this engine.
    pub fn format(self, input: &[u8]) -> Vec<u8> {
        match self {
            Engine::Text => text::format(input),
            Engine::Json => json::format(input),
            Engine::Xml => xml::format(input),
            Engine::Html => html::format(input),
        }
    }

    /// Engine name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Text => "text",
            Engine::Json => "json",
            Engine::Xml => "xml",
            Engine::Html => "html",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_engine_accepts_empty_input() {
        for engine in Engine::iter() {
            assert!(engine.format(b"").is_empty(), "{engine} should output nothing");
        }
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(Engine::Text.format(b"  hi \n"), b"hi");
        assert_eq!(Engine::Json.format(b"{\"a\":1}"), b"{\n  \"a\": 1\n}");
        assert_eq!(Engine::Xml.format(b"<a><b/></a>"), b"<a>\n  <b/>\n</a>");
        assert_eq!(Engine::Html.format(b"<ul><li>x</li></ul>"), b"<ul>\n  <li>x</li>\n</ul>");
    }
}
