//! Text engine.

/// Returns the input without leading or trailing whitespace.
///
/// Valid UTF-8 is trimmed of Unicode whitespace; anything else of ASCII
/// whitespace only.
pub(crate) fn format(input: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(input) {
        Ok(text) => text.trim().as_bytes().to_vec(),
        Err(_) => input.trim_ascii().to_vec(),
    }
}
