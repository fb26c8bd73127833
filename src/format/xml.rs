//! XML engine.
//!
//! A single regex-driven pass: whitespace around tags is squeezed out, then
//! every tag is placed on its own line at the indentation of its depth. An
//! element holding only text stays on one line. Comments that contain markup
//! are masked first so their content is never split or reindented.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::INDENT;

/// ASCII whitespace, as XML defines it (plus form feed).
const WS: &str = r"[\t\n\x0C\r ]";

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("valid comment regex"));
static BLANKS_AROUND_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{WS}*(<|/?>){WS}*")).expect("valid blanks-around regex")
});
static BLANKS_BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">([^<]*[\n\r\t]| {3,})[^<]*<").expect("valid blanks-between regex")
});
static REPEATED_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{WS}{{2,}}")).expect("valid repeated-blanks regex"));
static ANY_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{WS}+")).expect("valid blanks regex"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([/!]?)([^>]+?)(/?)>").expect("valid tag regex"));

/// Reformats an XML document.
///
/// Inputs shorter than two bytes produce no output.
pub(crate) fn format(input: &[u8]) -> Vec<u8> {
    if input.len() < 2 {
        return Vec::new();
    }

    let source = String::from_utf8_lossy(input);
    let (masked, originals) = mask_comments(&source);

    let squeezed = BLANKS_AROUND_TAGS.replace_all(&masked, "${1}");
    let squeezed = BLANKS_BETWEEN_TAGS.replace_all(&squeezed, |caps: &Captures| {
        REPEATED_BLANKS.replace_all(&caps[0], " ").into_owned()
    });

    let mut state = XmlState::default();
    let mut out = String::with_capacity(squeezed.len() + squeezed.len() / 4);
    let mut last = 0;
    for tag in TAG.find_iter(&squeezed) {
        out.push_str(&squeezed[last..tag.start()]);
        state.emit(tag.as_str(), &mut out);
        last = tag.end();
    }
    out.push_str(&squeezed[last..]);

    let out = unmask_comments(&out, &originals);
    out.strip_prefix('\n').unwrap_or(&out).as_bytes().to_vec()
}

/// Kinds of tag the engine lays out differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    /// `<?xml ...?>`
    Declaration,
    /// `<x/>`, or a processing instruction other than the declaration
    Empty,
    /// `<!-- -->` or `<!DOCTYPE>`
    Markup,
    /// `</x>`
    End,
    /// `<x>`
    Start,
}

impl TagKind {
    pub(crate) fn of(tag: &str) -> Self {
        if tag.starts_with("<?xml") {
            TagKind::Declaration
        } else if tag.ends_with("/>") || tag.starts_with("<?") {
            TagKind::Empty
        } else if tag.starts_with("<!") {
            TagKind::Markup
        } else if tag.starts_with("</") {
            TagKind::End
        } else {
            TagKind::Start
        }
    }
}

/// Layout state threaded through the tag pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct XmlState {
    /// Number of currently open elements.
    pub(crate) depth: usize,
    /// Whether the last tag closed something (or nothing was seen yet). An
    /// end tag only gets its own line in that case; otherwise it closes an
    /// element holding nothing but text.
    pub(crate) after_close: bool,
}

impl Default for XmlState {
    fn default() -> Self {
        Self {
            depth: 0,
            after_close: true,
        }
    }
}

impl XmlState {
    /// Appends `tag` to `out` and advances the state.
    pub(crate) fn emit(&mut self, tag: &str, out: &mut String) {
        match TagKind::of(tag) {
            TagKind::Declaration => {
                out.push('\n');
                out.push_str(&ANY_BLANKS.replace_all(tag, " "));
            }
            TagKind::Empty => {
                self.new_line(out);
                out.push_str(tag);
                self.after_close = true;
            }
            TagKind::Markup => {
                self.new_line(out);
                if is_doctype(tag) {
                    out.push_str(&ANY_BLANKS.replace_all(tag, " "));
                } else {
                    out.push_str(tag);
                }
                self.after_close = true;
            }
            TagKind::End => {
                self.depth = self.depth.saturating_sub(1);
                if self.after_close {
                    self.new_line(out);
                }
                out.push_str(tag);
                self.after_close = true;
            }
            TagKind::Start => {
                self.new_line(out);
                out.push_str(&ANY_BLANKS.replace_all(tag, " "));
                self.depth += 1;
                self.after_close = false;
            }
        }
    }

    fn new_line(&self, out: &mut String) {
        out.push('\n');
        for _ in 0..self.depth {
            out.push_str(INDENT);
        }
    }
}

fn is_doctype(tag: &str) -> bool {
    tag.get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"))
}

/// Replaces `<` and `>` inside comment bodies with entities so the tag pass
/// sees each comment as one opaque tag.
///
/// Returns the masked text and, per comment in document order, the original
/// body if it was masked.
fn mask_comments(source: &str) -> (String, Vec<Option<String>>) {
    let mut originals = Vec::new();
    let masked = COMMENT.replace_all(source, |caps: &Captures| {
        let body = &caps[1];
        if body.contains(['<', '>']) {
            originals.push(Some(body.to_string()));
            format!("<!--{}-->", body.replace('<', "&lt;").replace('>', "&gt;"))
        } else {
            originals.push(None);
            caps[0].to_string()
        }
    });
    (masked.into_owned(), originals)
}

fn unmask_comments(formatted: &str, originals: &[Option<String>]) -> String {
    if originals.iter().all(Option::is_none) {
        return formatted.to_string();
    }

    let mut index = 0;
    COMMENT
        .replace_all(formatted, |caps: &Captures| {
            let restored = match originals.get(index) {
                Some(Some(body)) => format!("<!--{body}-->"),
                _ => caps[0].to_string(),
            };
            index += 1;
            restored
        })
        .into_owned()
}
