//! Content digest utilities.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of a byte slice and returns it as a lowercase
/// hex string.
///
/// Every stored attachment carries this digest, computed once at upload time.
/// It is an integrity reference, not a deduplication key: the same content
/// uploaded twice produces two rows with equal digests.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
