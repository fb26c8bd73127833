//! HTML engine.
//!
//! Block elements start on their own line, indented by nesting depth.
//! Inline elements that follow text stay on the text's line, and short text
//! stays on the line of the tag that opened it. Tags are written as the
//! tokenizer rebuilds them.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{HTML_SHORT_TEXT_RUNES, INDENT};

use super::tokenizer::{tokenize, Token, TokenKind};

/// Elements that flow with surrounding text.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "cite", "code", "dfn", "em", "i", "ins", "kbd",
    "map", "q", "samp", "small", "span", "strong", "sub", "sup", "tt", "var",
];

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

static LEADING_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\t\n\x0C\r ]+[^\t\n\x0C\r ]").expect("valid leading regex"));
static TRAILING_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\t\n\x0C\r ][\t\n\x0C\r ]+$").expect("valid trailing regex"));

/// Reformats an HTML document.
///
/// Never fails: markup the tokenizer cannot finish, such as a tag still
/// open at end of input, is left out.
pub(crate) fn format(input: &[u8]) -> Vec<u8> {
    let source = String::from_utf8_lossy(input);
    let mut printer = HtmlPrinter::default();

    for token in tokenize(&source) {
        printer.push(&token);
    }

    printer.out.into_bytes()
}

fn is_inline(name: &str) -> bool {
    INLINE_ELEMENTS.contains(&name)
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug)]
struct HtmlPrinter {
    out: String,
    depth: usize,
    prev: Option<TokenKind>,
    /// Name of the latest non-text token, and of the one before it.
    tag_name: String,
    prev_name: String,
    /// Whether the latest text was put on a line of its own.
    long_text: bool,
    at_start: bool,
}

impl Default for HtmlPrinter {
    fn default() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            prev: None,
            tag_name: String::new(),
            prev_name: String::new(),
            long_text: false,
            at_start: true,
        }
    }
}

impl HtmlPrinter {
    fn push(&mut self, token: &Token) {
        if token.kind != TokenKind::Text {
            self.prev_name = std::mem::replace(&mut self.tag_name, token.name.clone());
        }

        match token.kind {
            TokenKind::StartTag => {
                if !(is_inline(&token.name) && self.prev == Some(TokenKind::Text)) {
                    self.new_line();
                }
                self.out.push_str(&token.raw);
                if !is_void(&token.name) {
                    self.depth += 1;
                }
            }
            TokenKind::SelfClosingTag | TokenKind::Comment | TokenKind::Doctype => {
                self.new_line();
                self.out.push_str(&token.raw);
            }
            TokenKind::EndTag => {
                self.depth = self.depth.saturating_sub(1);
                let own_line = self.prev_name != self.tag_name
                    || matches!(
                        self.prev,
                        Some(TokenKind::SelfClosingTag | TokenKind::Comment | TokenKind::Doctype)
                    )
                    || (self.prev == Some(TokenKind::Text) && self.long_text);
                if own_line {
                    self.new_line();
                }
                self.out.push_str(&token.raw);
            }
            TokenKind::Text => self.text(&token.raw),
        }

        self.prev = Some(token.kind);
    }

    fn text(&mut self, raw: &str) {
        let expanded = raw.replace('\t', INDENT);
        let mut text = expanded
            .trim_matches(|c: char| matches!(c, '\n' | '\r' | ' '))
            .to_string();
        if TRAILING_BLANK.is_match(&expanded) {
            text.push(' ');
        }

        self.long_text = false;
        if text.is_empty() {
            return;
        }

        let after_inline_end = self.prev == Some(TokenKind::EndTag) && is_inline(&self.tag_name);

        if text.contains('\n') {
            if !after_inline_end {
                self.new_line();
            } else if LEADING_BLANK.is_match(&expanded) {
                text.insert(0, ' ');
            }
            let adjusted = adjust_text_indentation(&text, self.depth);
            self.out.push_str(&adjusted);
            self.long_text = true;
            return;
        }

        let own_line = text.chars().count() > HTML_SHORT_TEXT_RUNES
            || self.prev != Some(TokenKind::StartTag);
        if own_line {
            if !after_inline_end {
                self.new_line();
                self.long_text = true;
            } else if LEADING_BLANK.is_match(&expanded) {
                text.insert(0, ' ');
            }
        }
        self.out.push_str(&text);
    }

    fn new_line(&mut self) {
        if self.at_start {
            self.at_start = false;
        } else {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }
}

/// Reindents the continuation lines of a multi-line text block.
///
/// The indentation shared by all non-blank continuation lines is replaced
/// with `depth` indent units; relative indentation is kept. Blank lines
/// stay empty.
fn adjust_text_indentation(text: &str, depth: usize) -> String {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let common = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let pad = INDENT.repeat(depth);

    let mut out = String::with_capacity(text.len() + rest.len() * pad.len());
    out.push_str(first);
    for line in rest {
        out.push('\n');
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(&pad);
        out.push_str(&line[common..]);
    }
    out
}
