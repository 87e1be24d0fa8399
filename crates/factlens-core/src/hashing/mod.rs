//! Stable identifiers derived from article URLs.
//!
//! Article ids are content-addressed: the same URL always maps to the same
//! id, so re-ingesting a feed supersedes existing records instead of
//! duplicating them. Qdrant point ids are a 64-bit truncation of the same
//! hash family; the full string id travels in the payload.

/// Derives a stable article id from a source URL.
///
/// Lowercase hex of the first 16 bytes of the BLAKE3 hash of the trimmed
/// URL. 128 bits is far beyond collision range for any realistic corpus.
pub fn article_id_from_url(url: &str) -> String {
    let hash = blake3::hash(url.trim().as_bytes());
    hash.as_bytes()[..16]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Truncation is acceptable here: point ids only need to be unique within
/// one collection, and a collision degrades to one record superseding
/// another, never to corruption.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Maps a string article id to the numeric point id used by the index.
#[inline]
pub fn point_id_for_article(article_id: &str) -> u64 {
    hash_to_u64(article_id.as_bytes())
}
