//! Checksum validation for migrations
//!
//! SHA-256 of the migration SQL, recorded at apply time and compared on
//! every later run.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}
