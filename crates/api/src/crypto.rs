//! Hashing and token material for the authentication flow.
//!
//! Codes and session tokens are hashed before storage so a compromised
//! store never leaks a usable credential.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the input.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Generates a random 6-digit login code.
pub fn login_code() -> String {
    let mut rng = rand::rng();
    (0..6).map(|_| rng.random_range(0..10).to_string()).collect()
}

/// Generates a random session token (32 bytes, hex encoded).
pub fn session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Compares two byte strings in time independent of where they differ.
/// Used for code verification to avoid timing side-channels.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
