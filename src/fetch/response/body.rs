//! Capped body streaming.

use http_body_util::BodyExt;
use hyper::body::Incoming;
use url::Url;

use crate::error_handling::{categorize_transport_error, ContentError, PlaygroundError};

/// Reads the whole response body, failing once it grows past `limit` bytes.
///
/// The body is read frame by frame so an oversized body is abandoned as
/// soon as it crosses the limit. Trailers are ignored. Nothing read so far
/// is returned on failure.
///
/// # Errors
///
/// - `ContentError::BodyTooLarge` when the body exceeds `limit`
/// - a categorized transport error when the stream fails midway
pub(crate) async fn read_capped(
    mut body: Incoming,
    url: &Url,
    limit: usize,
) -> Result<Vec<u8>, PlaygroundError> {
    let mut buf = Vec::with_capacity(limit.min(16 * 1024));

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| categorize_transport_error(&e, url))?;
        let Ok(chunk) = frame.into_data() else {
            continue;
        };

        if buf.len() + chunk.len() > limit {
            log::warn!(
                "Response body from {} exceeds {}KB limit (aborting at {} bytes)",
                url,
                limit / 1024,
                buf.len() + chunk.len()
            );
            return Err(ContentError::BodyTooLarge.into());
        }

        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}
