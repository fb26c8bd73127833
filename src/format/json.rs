//! JSON engine.
//!
//! Re-indents the document as received: every token is copied through
//! byte for byte and only the whitespace between tokens is rewritten. So
//! duplicate keys, string escapes, and number spellings all survive, and
//! nesting depth is limited only by memory.
//!
//! Structure is checked with an explicit stack. Strings and numbers are
//! checked by `serde_json`, one token at a time.

use serde::de::IgnoredAny;
use thiserror::Error;

use crate::config::INDENT;

#[derive(Debug, Error)]
enum SyntaxError {
    #[error("unexpected byte {0:?} at offset {1}")]
    Unexpected(char, usize),

    #[error("unexpected end of input")]
    Eof,

    #[error("invalid token at offset {0}: {1}")]
    Token(usize, serde_json::Error),
}

/// Pretty-prints a JSON document with two-space indentation.
///
/// Malformed input is logged and produces no output.
pub(crate) fn format(input: &[u8]) -> Vec<u8> {
    if input.trim_ascii().is_empty() {
        return Vec::new();
    }

    match Reindenter::new(input).run() {
        Ok(out) => out,
        Err(e) => {
            log::warn!("Response body is not valid JSON: {}", e);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    /// Right after `[`.
    ValueOrClose,
    /// Right after `{`.
    KeyOrClose,
    /// After a `,` inside an object.
    Key,
    Colon,
    CommaOrClose,
    End,
}

struct Reindenter<'a> {
    input: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    stack: Vec<Container>,
    /// A line break is owed before the next key or value.
    pending_break: bool,
}

impl<'a> Reindenter<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::with_capacity(input.len() * 2),
            stack: Vec::new(),
            pending_break: false,
        }
    }

    fn run(mut self) -> Result<Vec<u8>, SyntaxError> {
        let mut expect = Expect::Value;

        loop {
            self.skip_whitespace();
            let Some(&byte) = self.input.get(self.pos) else {
                return if expect == Expect::End {
                    Ok(self.out)
                } else {
                    Err(SyntaxError::Eof)
                };
            };

            expect = match (expect, byte) {
                (Expect::ValueOrClose, b']') | (Expect::KeyOrClose, b'}') => self.close(),
                (Expect::CommaOrClose, b']') if self.top() == Some(Container::Array) => {
                    self.close()
                }
                (Expect::CommaOrClose, b'}') if self.top() == Some(Container::Object) => {
                    self.close()
                }
                (Expect::CommaOrClose, b',') => {
                    self.out.push(b',');
                    self.pos += 1;
                    self.pending_break = true;
                    match self.top() {
                        Some(Container::Object) => Expect::Key,
                        _ => Expect::Value,
                    }
                }
                (Expect::KeyOrClose | Expect::Key, b'"') => {
                    self.line_break();
                    self.string()?;
                    Expect::Colon
                }
                (Expect::Colon, b':') => {
                    self.out.extend_from_slice(b": ");
                    self.pos += 1;
                    Expect::Value
                }
                (Expect::Value | Expect::ValueOrClose, _) => self.value(byte)?,
                _ => return Err(self.unexpected(byte)),
            };
        }
    }

    fn top(&self) -> Option<Container> {
        self.stack.last().copied()
    }

    fn after_value(&self) -> Expect {
        if self.stack.is_empty() {
            Expect::End
        } else {
            Expect::CommaOrClose
        }
    }

    fn value(&mut self, byte: u8) -> Result<Expect, SyntaxError> {
        self.line_break();
        match byte {
            b'{' | b'[' => {
                self.out.push(byte);
                self.pos += 1;
                self.pending_break = true;
                if byte == b'{' {
                    self.stack.push(Container::Object);
                    return Ok(Expect::KeyOrClose);
                }
                self.stack.push(Container::Array);
                return Ok(Expect::ValueOrClose);
            }
            b'"' => self.string()?,
            b'-' | b'0'..=b'9' => self.number()?,
            b't' => self.literal(b"true")?,
            b'f' => self.literal(b"false")?,
            b'n' => self.literal(b"null")?,
            _ => return Err(self.unexpected(byte)),
        }
        Ok(self.after_value())
    }

    fn close(&mut self) -> Expect {
        let bracket = self.input[self.pos];
        self.stack.pop();
        if self.pending_break {
            // Empty container stays on one line.
            self.pending_break = false;
        } else {
            self.out.push(b'\n');
            self.indent();
        }
        self.out.push(bracket);
        self.pos += 1;
        self.after_value()
    }

    fn line_break(&mut self) {
        if self.pending_break {
            self.out.push(b'\n');
            self.indent();
            self.pending_break = false;
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.out.extend_from_slice(INDENT.as_bytes());
        }
    }

    fn string(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut end = start + 1;
        loop {
            match self.input.get(end) {
                None => return Err(SyntaxError::Eof),
                Some(b'\\') => end += 2,
                Some(b'"') => break,
                Some(_) => end += 1,
            }
        }
        self.copy_token(start, end + 1)
    }

    fn number(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let len = self.input[start..]
            .iter()
            .take_while(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
            .count();
        self.copy_token(start, start + len)
    }

    fn literal(&mut self, word: &[u8]) -> Result<(), SyntaxError> {
        if !self.input[self.pos..].starts_with(word) {
            let byte = self.input[self.pos];
            return Err(self.unexpected(byte));
        }
        self.out.extend_from_slice(word);
        self.pos += word.len();
        Ok(())
    }

    /// Checks a scalar token with `serde_json`, then copies it verbatim.
    fn copy_token(&mut self, start: usize, end: usize) -> Result<(), SyntaxError> {
        let token = &self.input[start..end];
        serde_json::from_slice::<IgnoredAny>(token).map_err(|e| SyntaxError::Token(start, e))?;
        self.out.extend_from_slice(token);
        self.pos = end;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.input.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, byte: u8) -> SyntaxError {
        SyntaxError::Unexpected(char::from(byte), self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(input: &str) -> String {
        String::from_utf8(format(input.as_bytes())).unwrap()
    }

    #[test]
    fn test_format_minified_object() {
        assert_eq!(pretty(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_format_nested_keeps_key_order() {
        let input = r#"  {"z":[1,2,{"b":null,"a":true}],"y":{}, "x":[ ]}  "#;
        let expected = r#"{
  "z": [
    1,
    2,
    {
      "b": null,
      "a": true
    }
  ],
  "y": {},
  "x": []
}"#;
        assert_eq!(pretty(input), expected);
    }

    #[test]
    fn test_format_keeps_number_literals() {
        assert_eq!(
            pretty("[1.0,12345678901234567890123,-0.5e-3]"),
            "[\n  1.0,\n  12345678901234567890123,\n  -0.5e-3\n]"
        );
    }

    #[test]
    fn test_format_scalar_document() {
        assert_eq!(pretty("\"hello\""), "\"hello\"");
        assert_eq!(pretty(" 42 "), "42");
    }

    #[test]
    fn test_format_keeps_duplicate_keys_and_escapes() {
        assert_eq!(
            pretty(r#"{"a":1,"a":2,"s":"<\/x>"}"#),
            "{\n  \"a\": 1,\n  \"a\": 2,\n  \"s\": \"<\\/x>\"\n}"
        );
        assert_eq!(
            pretty(r#"["\u00e9\n", "\"q\""]"#),
            "[\n  \"\\u00e9\\n\",\n  \"\\\"q\\\"\"\n]"
        );
    }

    #[test]
    fn test_format_deep_nesting() {
        let depth = 200;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let output = pretty(&input);

        assert!(!output.is_empty());
        assert!(output.starts_with("[\n  [\n    ["));
        let innermost = format!("{}[]", INDENT.repeat(depth - 1));
        assert!(output.contains(&innermost));
        assert!(output.ends_with("\n]"));
    }

    #[test]
    fn test_format_malformed_is_empty() {
        for input in [
            "{\"a\":",
            "not json",
            "{} trailing",
            "   ",
            "[1,]",
            "{\"a\" 1}",
            "{1:2}",
            "[01]",
            "[\"bad \\q escape\"]",
            "[tru]",
            "[1}",
            "\"open",
        ] {
            assert_eq!(pretty(input), "", "{input:?} should render nothing");
        }
    }
}
