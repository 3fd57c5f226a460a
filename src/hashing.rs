//! Content Digests
//!
//! Rendering is deterministic, so the digest of an image (and of a whole
//! batch) only changes when its pixels or layout inputs change.

use sha2::{Digest, Sha256};

use crate::manifest::ImageRecord;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Digest over the engine version and every image record.
///
/// Output paths are left out so the same batch rendered into two
/// directories digests identically. Records are hashed in the order given.
pub fn batch_digest(engine_version: &str, images: &[ImageRecord]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(engine_version.as_bytes());

    for record in images {
        // NUL separators keep adjacent fields from running together.
        hasher.update([0]);
        hasher.update(record.file_name.as_bytes());
        hasher.update([0]);
        hasher.update(record.entity_id.map_or(-1, |id| id).to_le_bytes());
        hasher.update(format!("{:?}", record.layout).as_bytes());
        hasher.update((record.bytes as u64).to_le_bytes());
        hasher.update(record.sha256.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}
