//! Tamper-evident tokens for session cookies and other opaque values.
//!
//! A token is `value|hmac`, where `hmac` is the hex HMAC-SHA256 of `value`
//! under the process-wide secret. Verification re-signs the extracted value
//! and compares against the *whole* token, so a copied MAC never validates a
//! different value.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::hashing::hmac_sha256_hex;

/// Separator between the value and its MAC.
pub const SEPARATOR: char = '|';

/// Signs and verifies values with a shared secret.
#[derive(Clone)]
pub struct IntegrityCodec {
    secret: Vec<u8>,
}

impl IntegrityCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Produce `value|hmac(value)`. Deterministic for a fixed secret.
    pub fn sign(&self, value: &str) -> String {
        let mac = hmac_sha256_hex(&self.secret, value.as_bytes());
        format!("{value}{SEPARATOR}{mac}")
    }

    /// Return the signed value if `token` is exactly what [`sign`](Self::sign)
    /// would produce for it, `None` otherwise.
    ///
    /// The MAC is hex and never contains the separator, so splitting at the
    /// last separator recovers values that themselves contain one.
    pub fn verify<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (value, _) = token.rsplit_once(SEPARATOR)?;
        let expected = self.sign(value);
        if expected.len() != token.len() {
            return None;
        }
        bool::from(expected.as_bytes().ct_eq(token.as_bytes())).then_some(value)
    }
}

impl fmt::Debug for IntegrityCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrityCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}
