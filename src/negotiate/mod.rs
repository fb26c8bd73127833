//! Content negotiation.
//!
//! Maps a response's declared `Content-Type` to a formatting engine and its
//! `Content-Encoding` to a decoder, then decodes and formats the body under
//! the size cap. Both lookups go through immutable tables built once per
//! process.

mod encoding;
mod media_type;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error_handling::{ContentError, PlaygroundError};
use crate::format::Engine;

pub use encoding::{decode_capped, select_decoder, Decoder};
pub use media_type::MediaType;

/// Media types with a dedicated engine, keyed by `type/subtype`.
static FORMATTERS: LazyLock<HashMap<&'static str, Engine>> = LazyLock::new(|| {
    HashMap::from([
        ("application/xml", Engine::Xml),
        ("application/problem+xml", Engine::Xml),
        ("text/xml", Engine::Xml),
        ("application/json", Engine::Json),
        ("application/problem+json", Engine::Json),
        ("application/sql", Engine::Text),
        ("application/yaml", Engine::Text),
        ("text/html", Engine::Html),
    ])
});

/// A response body after decoding and formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBody {
    /// Engine that produced `bytes`.
    pub engine: Engine,
    /// Formatted body, ready for the assembled response.
    pub bytes: Vec<u8>,
}

/// Picks the engine for a declared `Content-Type`.
///
/// Absent or unparsable values, and any `text/*` type without a dedicated
/// engine, fall back to [`Engine::Text`].
///
/// # Errors
///
/// `ContentError::UnsupportedMediaType` carrying the declared value for any
/// other media type.
pub fn select_engine(content_type: Option<&str>) -> Result<Engine, ContentError> {
    let Some(value) = content_type else {
        return Ok(Engine::Text);
    };
    let Some(media) = MediaType::parse(value) else {
        log::debug!("Unparsable Content-Type {:?}, using text engine", value);
        return Ok(Engine::Text);
    };

    if let Some(engine) = FORMATTERS.get(media.essence().as_str()) {
        return Ok(*engine);
    }
    if media.top_level() == "text" {
        return Ok(Engine::Text);
    }

    Err(ContentError::UnsupportedMediaType(value.trim().to_string()))
}

/// Decodes and formats a response body.
///
/// The engine is chosen before anything is decoded, so an unsupported media
/// type fails without touching the body.
///
/// # Errors
///
/// - `ContentError::UnsupportedMediaType` / `UnsupportedEncoding` when no
///   engine or decoder matches
/// - `ContentError::BodyTooLarge` when the decoded body exceeds `limit`
/// - an internal error for a corrupt encoded stream
pub fn negotiate(
    content_type: Option<&str>,
    content_encoding: Option<&str>,
    body: Vec<u8>,
    limit: usize,
) -> Result<FormattedBody, PlaygroundError> {
    let engine = select_engine(content_type)?;
    let decoder = select_decoder(content_encoding)?;
    log::debug!(
        "Formatting {} body bytes with {} engine ({:?} decoder)",
        body.len(),
        engine,
        decoder
    );

    let decoded = decode_capped(body, decoder, limit)?;
    Ok(FormattedBody {
        engine,
        bytes: engine.format(&decoded),
    })
}
