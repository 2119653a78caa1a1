//! Content hashing for change detection and cache keys.

/// Blake3 hash of embeddable content, hex-encoded.
///
/// The refresh pipeline compares this against the stored embedding's
/// `content_hash` to skip items whose description has not changed.
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
