//! Byte/string helpers for payload consumers.
//!
//! These map each byte to the char with the same code point and back.
//! They are not text-encoding aware: `0xE9` becomes `'é'`, not part of
//! a UTF-8 sequence.

/// One char per byte, same numeric code point.
pub fn string_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`string_from_bytes`]; `None` if any char is above U+00FF.
pub fn bytes_from_string(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(c).ok()).collect()
}
