//! Integrity tags for dashboard snapshots
//!
//! Two schemes are supported. `Sha256` is an unkeyed content digest: it
//! catches corruption but anyone able to edit a snapshot can also recompute
//! the digest. `HmacSha256` binds the tag to a 32-byte key held by the
//! issuer and is the scheme to use when snapshots cross a trust boundary.

use crate::domain::IntegrityAlgorithm;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Key for HMAC-SHA256 snapshot tags
#[derive(Clone)]
pub struct SnapshotKey {
    key: [u8; 32],
}

/// Key loading errors
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid key: must be exactly 32 bytes (256 bits)")]
    InvalidKeyLength,

    #[error("Invalid base64 encoding: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl SnapshotKey {
    /// Create a new key from a 32-byte array
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Create a key from a base64-encoded string
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64.decode(encoded.trim())?;
        if bytes.len() != 32 {
            return Err(KeyError::InvalidKeyLength);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

// Never print key material
impl fmt::Debug for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SnapshotKey(..)")
    }
}

/// How a sealer computes and checks tags
#[derive(Debug, Clone)]
pub enum IntegrityScheme {
    Sha256,
    HmacSha256(SnapshotKey),
}

impl IntegrityScheme {
    pub fn algorithm(&self) -> IntegrityAlgorithm {
        match self {
            IntegrityScheme::Sha256 => IntegrityAlgorithm::Sha256,
            IntegrityScheme::HmacSha256(_) => IntegrityAlgorithm::HmacSha256,
        }
    }

    /// Compute the lowercase hex tag over `input`
    pub fn tag(&self, input: &[u8]) -> String {
        match self {
            IntegrityScheme::Sha256 => hex::encode(Sha256::digest(input)),
            IntegrityScheme::HmacSha256(key) => {
                let mut mac = new_mac(key);
                mac.update(input);
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }

    /// Check `expected_hex` against a freshly computed tag without
    /// short-circuiting on the first differing byte.
    pub fn verify(&self, input: &[u8], expected_hex: &str) -> bool {
        let expected = match hex::decode(expected_hex) {
            Ok(b) => b,
            Err(_) => return false,
        };

        match self {
            IntegrityScheme::Sha256 => {
                let computed = Sha256::digest(input);
                constant_time_eq(computed.as_slice(), &expected)
            }
            IntegrityScheme::HmacSha256(key) => {
                let mut mac = new_mac(key);
                mac.update(input);
                // CtOutput comparison inside the hmac crate
                mac.verify_slice(&expected).is_ok()
            }
        }
    }
}

/// Keys shorter than the SHA-256 block are zero-padded to it, which is the
/// HMAC key derivation for short keys.
fn new_mac(key: &SnapshotKey) -> HmacSha256 {
    let mut block = Key::<HmacSha256>::default();
    block[..key.as_bytes().len()].copy_from_slice(key.as_bytes());
    <HmacSha256 as KeyInit>::new(&block)
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SnapshotKey {
        SnapshotKey::new([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b,
            0x1c, 0x1d, 0x1e, 0x1f,
        ])
    }

    #[test]
    fn test_sha256_known_vector() {
        let tag = IntegrityScheme::Sha256.tag(b"abc");
        assert_eq!(
            tag,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_tag_is_deterministic() {
        let scheme = IntegrityScheme::HmacSha256(test_key());
        assert_eq!(
            scheme.tag(b"payload"),
            scheme.tag(b"payload")
        );
        assert_ne!(
            scheme.tag(b"payload"),
            scheme.tag(b"payloae")
        );
    }

    #[test]
    fn test_verify_roundtrip() {
        for scheme in [IntegrityScheme::Sha256, IntegrityScheme::HmacSha256(test_key())] {
            let tag = scheme.tag(b"resolved dashboard");
            assert!(scheme.verify(b"resolved dashboard", &tag));
            assert!(!scheme.verify(b"resolved dashboarD", &tag));
        }
    }

    #[test]
    fn test_hmac_depends_on_key() {
        let a = IntegrityScheme::HmacSha256(test_key());
        let b = IntegrityScheme::HmacSha256(SnapshotKey::new([0xffu8; 32]));
        let tag = a.tag(b"content");
        assert!(!b.verify(b"content", &tag));
        assert_ne!(IntegrityScheme::Sha256.tag(b"content"), tag);
    }

    #[test]
    fn test_verify_rejects_bad_hex_and_length() {
        let scheme = IntegrityScheme::Sha256;
        assert!(!scheme.verify(b"x", "not-hex"));
        assert!(!scheme.verify(b"x", "abcd"));
        assert!(!scheme.verify(b"x", ""));
    }

    #[test]
    fn test_padded_key_matches_slice_key() {
        let mut reference = <HmacSha256 as Mac>::new_from_slice(test_key().as_bytes()).unwrap();
        reference.update(b"content");
        let expected = hex::encode(reference.finalize().into_bytes());
        assert_eq!(IntegrityScheme::HmacSha256(test_key()).tag(b"content"), expected);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(!constant_time_eq(b"", b"a"));
    }

    #[test]
    fn test_key_from_base64() {
        let key_bytes = [0x42u8; 32];
        let encoded = BASE64.encode(key_bytes);
        let key = SnapshotKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &key_bytes);
    }

    #[test]
    fn test_key_from_base64_wrong_length() {
        let short_key = BASE64.encode([0x42u8; 16]);
        let result = SnapshotKey::from_base64(&short_key);
        assert!(matches!(result, Err(KeyError::InvalidKeyLength)));
    }

    #[test]
    fn test_key_from_base64_invalid_encoding() {
        let result = SnapshotKey::from_base64("not-valid-base64!!!");
        assert!(matches!(result, Err(KeyError::Base64Error(_))));
    }

    #[test]
    fn test_key_debug_hides_material() {
        assert_eq!(format!("{:?}", test_key()), "SnapshotKey(..)");
    }
}
