//! Session token generation and lookup hashing.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Raw token size in bytes (32 bytes = 256 bits of entropy)
pub const TOKEN_BYTES: usize = 32;

/// Generate a random session token (64 character hex string)
#[must_use]
pub fn generate_session_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// Hash a session token for storage and lookup (hex SHA-256).
///
/// Deliberately unsalted: the lookup key must be deterministic, and the
/// token's 256 bits of entropy make precomputation useless, so a salt would
/// add nothing. Passwords are low-entropy and use argon2 instead.
#[must_use]
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
