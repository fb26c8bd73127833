//! Content-Encoding resolution and capped decompression.

use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};

use crate::error_handling::{ContentError, PlaygroundError};

/// How a body must be decoded before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// No encoding; bytes pass through.
    Identity,
    /// gzip, possibly multi-member.
    Gzip,
    /// zlib-wrapped deflate, or raw deflate when the zlib header is absent.
    Deflate,
    /// Raw deflate stream.
    RawDeflate,
}

static ENCODINGS: LazyLock<HashMap<&'static str, Decoder>> = LazyLock::new(|| {
    HashMap::from([
        ("identity", Decoder::Identity),
        ("gzip", Decoder::Gzip),
        ("x-gzip", Decoder::Gzip),
        ("deflate", Decoder::Deflate),
        ("flate", Decoder::Deflate),
        ("compress", Decoder::RawDeflate),
    ])
});

/// Maps a `Content-Encoding` value to its decoder.
///
/// A missing or blank value means identity. Matching ignores case and
/// surrounding whitespace.
///
/// # Errors
///
/// `ContentError::UnsupportedEncoding` carrying the original value when no
/// decoder matches.
pub fn select_decoder(encoding: Option<&str>) -> Result<Decoder, ContentError> {
    let Some(raw) = encoding else {
        return Ok(Decoder::Identity);
    };

    let key = raw.trim().to_ascii_lowercase();
    if key.is_empty() {
        return Ok(Decoder::Identity);
    }

    ENCODINGS.get(key.as_str()).copied().ok_or_else(|| {
        log::debug!("No decoder for Content-Encoding {:?}", raw);
        ContentError::UnsupportedEncoding(raw.trim().to_string())
    })
}

/// Decodes `body`, failing as soon as the decoded size passes `limit`.
///
/// The decoder reads through `Read::take(limit + 1)`, so a decompression
/// bomb never expands past one byte over the cap.
///
/// # Errors
///
/// - `ContentError::BodyTooLarge` when the decoded body exceeds `limit`
/// - an internal error when the encoded stream is corrupt
pub fn decode_capped(
    body: Vec<u8>,
    decoder: Decoder,
    limit: usize,
) -> Result<Vec<u8>, PlaygroundError> {
    let decoded = match decoder {
        Decoder::Identity => body,
        Decoder::Gzip => read_limited(MultiGzDecoder::new(body.as_slice()), limit)?,
        Decoder::Deflate if has_zlib_header(&body) => {
            read_limited(ZlibDecoder::new(body.as_slice()), limit)?
        }
        Decoder::Deflate | Decoder::RawDeflate => {
            read_limited(DeflateDecoder::new(body.as_slice()), limit)?
        }
    };

    if decoded.len() > limit {
        log::warn!(
            "Decoded body of {} bytes exceeds {}KB limit",
            decoded.len(),
            limit / 1024
        );
        return Err(ContentError::BodyTooLarge.into());
    }

    Ok(decoded)
}

fn read_limited(reader: impl Read, limit: usize) -> Result<Vec<u8>, PlaygroundError> {
    let mut out = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| {
            log::error!("Failed to decode response body: {}", e);
            PlaygroundError::internal(format!("failed to decode response body: {e}"))
        })?;
    Ok(out)
}

/// RFC 1950 header check: CM = 8 and the 16-bit header is a multiple of 31.
fn has_zlib_header(body: &[u8]) -> bool {
    match body {
        [cmf, flg, ..] => cmf & 0x0f == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}
