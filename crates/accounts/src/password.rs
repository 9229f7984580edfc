//! Password hashing.
//!
//! Hashes are stored as `sha256$<iterations>$<salt>$<digest>`, where the
//! digest is SHA-256 applied `iterations` times over salt and password and
//! both salt and digest are hex encoded.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Rounds used for new hashes.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    encode(password, &salt, DEFAULT_ITERATIONS)
}

/// Checks a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    // Slices of different lengths compare unequal.
    digest(password, salt, iterations)
        .ct_eq(&expected)
        .unwrap_u8()
        == 1
}

fn encode(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{SCHEME}${iterations}${salt}${}",
        hex::encode(digest(password, salt, iterations))
    )
}

fn digest(password: &str, salt: &str, iterations: u32) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut hash = hasher.finalize();

    for _ in 1..iterations {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(hash);
        hash = hasher.finalize();
    }
    hash.to_vec()
}
