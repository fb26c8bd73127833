//! HTML tokenizer.
//!
//! Runs the html5ever tokenizer without a tree builder and turns its tokens
//! into text, tag, comment, and doctype tokens carrying rebuilt markup:
//!
//! - tag and attribute names come out lower-cased
//! - attribute values are double-quoted, and valueless attributes stay bare
//! - character references in text and attribute values are re-encoded with
//!   the minimal set of entities
//! - contents of `script`, `style`, and the other raw-text elements pass
//!   through untouched
//!
//! Adjacent character tokens are merged, so text between two tags is always
//! one token. A tag still open at end of input is dropped.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token as Html5Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Text,
    StartTag,
    EndTag,
    SelfClosingTag,
    Comment,
    Doctype,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Markup of the token as it is written back.
    pub(crate) raw: String,
    /// Lower-case tag name; empty for text, comments, and doctypes.
    pub(crate) name: String,
}

/// Splits `source` into tokens.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let tokenizer = Tokenizer::new(Collector::default(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(source));

    let _ = tokenizer.feed(&input);
    tokenizer.end();

    let state = tokenizer.sink.state.take();
    if state.parse_errors > 0 {
        log::debug!("HTML tokenizer reported {} parse errors", state.parse_errors);
    }
    state.tokens
}

#[derive(Debug, Default)]
struct Collector {
    state: RefCell<CollectorState>,
}

#[derive(Debug, Default)]
struct CollectorState {
    tokens: Vec<Token>,
    text: String,
    /// Inside `script`, `style`, and the like: text is copied as is.
    verbatim: bool,
    parse_errors: usize,
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&self, token: Html5Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();

        match token {
            Html5Token::CharacterTokens(text) => state.text(&text),
            Html5Token::NullCharacterToken => {}
            Html5Token::TagToken(tag) => return state.tag(tag),
            Html5Token::CommentToken(text) => {
                state.push(TokenKind::Comment, format!("<!--{text}-->"), String::new())
            }
            Html5Token::DoctypeToken(doctype) => {
                state.push(TokenKind::Doctype, doctype_markup(&doctype), String::new())
            }
            Html5Token::ParseError(_) => state.parse_errors += 1,
            Html5Token::EOFToken => state.flush_text(),
        }

        TokenSinkResult::Continue
    }
}

impl CollectorState {
    fn text(&mut self, chunk: &str) {
        if self.verbatim {
            self.text.push_str(chunk);
        } else {
            self.text.push_str(&html_escape::encode_text(chunk));
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.tokens.push(Token {
                kind: TokenKind::Text,
                raw: text,
                name: String::new(),
            });
        }
    }

    fn push(&mut self, kind: TokenKind, raw: String, name: String) {
        self.flush_text();
        self.tokens.push(Token { kind, raw, name });
    }

    fn tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();

        if tag.kind == TagKind::EndTag {
            // The tokenizer only leaves a raw-text state at its end tag.
            self.verbatim = false;
            self.push(TokenKind::EndTag, format!("</{name}>"), name);
            return TokenSinkResult::Continue;
        }

        let mut raw = format!("<{name}");
        for attr in &tag.attrs {
            raw.push(' ');
            raw.push_str(&attr.name.local);
            if !attr.value.is_empty() {
                raw.push_str("=\"");
                raw.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
                raw.push('"');
            }
        }

        if tag.self_closing {
            raw.push_str("/>");
            self.push(TokenKind::SelfClosingTag, raw, name);
            return TokenSinkResult::Continue;
        }

        raw.push('>');
        let next = content_model(&name);
        self.verbatim = matches!(
            next,
            TokenSinkResult::RawData(RawKind::ScriptData | RawKind::Rawtext)
                | TokenSinkResult::Plaintext
        );
        self.push(TokenKind::StartTag, raw, name);
        next
    }
}

/// Tokenizer state for the content of an element, as a tree builder would
/// switch it.
fn content_model(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

fn doctype_markup(doctype: &Doctype) -> String {
    let mut raw = String::from("<!DOCTYPE");
    if let Some(name) = &doctype.name {
        raw.push(' ');
        raw.push_str(name);
    }
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public), Some(system)) => {
            raw.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""))
        }
        (Some(public), None) => raw.push_str(&format!(" PUBLIC \"{public}\"")),
        (None, Some(system)) => raw.push_str(&format!(" SYSTEM \"{system}\"")),
        (None, None) => {}
    }
    raw.push('>');
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .map(|token| (token.kind, token.raw))
            .collect()
    }

    #[test]
    fn test_token_kinds_and_names() {
        let summary: Vec<(TokenKind, String)> =
            tokenize("<!DOCTYPE html><div class=a>hi</div><img src=x /><!--c-->")
                .into_iter()
                .map(|token| (token.kind, token.name))
                .collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Doctype, String::new()),
                (TokenKind::StartTag, "div".to_string()),
                (TokenKind::Text, String::new()),
                (TokenKind::EndTag, "div".to_string()),
                (TokenKind::SelfClosingTag, "img".to_string()),
                (TokenKind::Comment, String::new()),
            ]
        );
    }

    #[test]
    fn test_tags_are_rebuilt_normalized() {
        assert_eq!(
            tokens("<DIV Class=a ID='b' hidden>x</DIV >"),
            vec![
                (TokenKind::StartTag, "<div class=\"a\" id=\"b\" hidden>".to_string()),
                (TokenKind::Text, "x".to_string()),
                (TokenKind::EndTag, "</div>".to_string()),
            ]
        );
    }

    #[test]
    fn test_attribute_values_are_requoted() {
        assert_eq!(
            tokens("<a title='say \"hi\" > bye' href=/?a=1&amp;b=2>go</a>"),
            vec![
                (
                    TokenKind::StartTag,
                    "<a title=\"say &quot;hi&quot; &gt; bye\" href=\"/?a=1&amp;b=2\">".to_string()
                ),
                (TokenKind::Text, "go".to_string()),
                (TokenKind::EndTag, "</a>".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_is_merged_and_reencoded() {
        assert_eq!(
            tokens("a < b &lt;3 &amp; &copy;"),
            vec![(TokenKind::Text, "a &lt; b &lt;3 &amp; \u{a9}".to_string())]
        );
    }

    #[test]
    fn test_raw_text_element_is_verbatim() {
        assert_eq!(
            tokens("<script>if (a<b) { x = \"</p>\" && y; }</SCRIPT ><p>"),
            vec![
                (TokenKind::StartTag, "<script>".to_string()),
                (TokenKind::Text, "if (a<b) { x = \"</p>\" && y; }".to_string()),
                (TokenKind::EndTag, "</script>".to_string()),
                (TokenKind::StartTag, "<p>".to_string()),
            ]
        );
    }

    #[test]
    fn test_escapable_raw_text_keeps_markup_as_text() {
        assert_eq!(
            tokens("<title>A <b> &amp; B</title>"),
            vec![
                (TokenKind::StartTag, "<title>".to_string()),
                (TokenKind::Text, "A &lt;b&gt; &amp; B".to_string()),
                (TokenKind::EndTag, "</title>".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_is_dropped() {
        assert_eq!(
            tokens("<p>x<span class=\"a"),
            vec![
                (TokenKind::StartTag, "<p>".to_string()),
                (TokenKind::Text, "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_doctype_with_identifiers() {
        assert_eq!(
            tokens(
                "<!doctype HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"
            ),
            vec![(
                TokenKind::Doctype,
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_processing_instruction_is_comment() {
        assert_eq!(
            tokens("<?xml version=\"1.0\"?>"),
            vec![(TokenKind::Comment, "<!--?xml version=\"1.0\"?-->".to_string())]
        );
    }
}
