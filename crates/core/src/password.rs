//! Salted password digests in the `<hex sha256>,<salt>` storage format.
//!
//! The digest covers `username || password || salt`, so the same password
//! hashes differently per user even before salting. The salt is generated
//! fresh for every registration and persisted alongside the digest.

use rand::Rng;

use crate::hashing::sha256_hex;

/// Separator between the digest and the salt in the stored form.
pub const SALT_SEPARATOR: char = ',';

/// Number of ASCII letters in a generated salt.
pub const SALT_LENGTH: usize = 5;

const SALT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random salt of [`SALT_LENGTH`] ASCII letters.
pub fn make_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LENGTH)
        .map(|_| SALT_ALPHABET[rng.random_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}

/// Hash a password for storage.
///
/// With `salt = None` a new salt is generated; pass the stored salt to
/// re-derive an existing hash.
pub fn hash_password(username: &str, password: &str, salt: Option<&str>) -> String {
    let salt = match salt {
        Some(s) => s.to_string(),
        None => make_salt(),
    };
    let digest = sha256_hex(format!("{username}{password}{salt}").as_bytes());
    format!("{digest}{SALT_SEPARATOR}{salt}")
}

/// Check a login attempt against a stored `<digest>,<salt>` string.
pub fn verify_password(username: &str, password: &str, stored: &str) -> bool {
    let Some((_, salt)) = stored.rsplit_once(SALT_SEPARATOR) else {
        return false;
    };
    hash_password(username, password, Some(salt)) == stored
}
