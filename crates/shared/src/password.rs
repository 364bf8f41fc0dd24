//! Password hashing utilities using Argon2id.
//!
//! Account passwords are stored as PHC-formatted Argon2id hashes. The same
//! verification path backs both login and the credential check required
//! before a ticket can be deleted.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// Argon2id parameters following the OWASP password storage guidance.
const MEMORY_COST: u32 = 19456; // KiB
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password, returning a PHC-formatted string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let argon2 = create_argon2()?;
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(false)` for a well-formed hash that does not match, and
/// `Err(InvalidHashFormat)` when the stored value is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;
    let argon2 = create_argon2()?;
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generates a random alphanumeric temporary password.
///
/// Used when an administrator creates an account without supplying a
/// password; the generated value is returned to the caller exactly once.
pub fn generate_temp_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correto123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correto123", &hash).unwrap());
        assert!(!verify_password("errado123", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("mesma-senha").unwrap();
        let b = hash_password("mesma-senha").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let result = verify_password("qualquer", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_generate_temp_password_length_and_charset() {
        let pw = generate_temp_password(12);
        assert_eq!(pw.len(), 12);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_temp_password_is_random() {
        assert_ne!(generate_temp_password(16), generate_temp_password(16));
    }
}
