//! Frozen, portable resolution results

use crate::error::{DashboardError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current snapshot layout. Anything else is rejected by the verifier.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Domain separator mixed into every integrity tag
const SIGNING_DOMAIN: &[u8] = b"dashgate.snapshot";

/// How the integrity tag of a snapshot was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrityAlgorithm {
    /// Unkeyed SHA-256 digest; detects corruption, not forgery
    #[serde(rename = "sha256")]
    Sha256,
    /// HMAC-SHA256 under a key held by the issuer
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
}

impl IntegrityAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityAlgorithm::Sha256 => "sha256",
            IntegrityAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }
}

impl fmt::Display for IntegrityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tamper-evident, time-bounded copy of a [`ResolvedDashboard`](super::ResolvedDashboard).
///
/// The snapshot describes itself completely: a verifier needs nothing but
/// the snapshot (and, for keyed snapshots, the issuer's key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub format_version: u16,
    pub algorithm: IntegrityAlgorithm,
    pub declaration_id: String,
    /// Canonical JSON of the resolved dashboard
    pub payload: String,
    /// Epoch milliseconds
    pub issued_at: i64,
    /// Epoch milliseconds, exclusive
    pub expires_at: i64,
    /// Lowercase hex
    pub integrity_tag: String,
}

impl DashboardSnapshot {
    /// Bytes covered by the integrity tag.
    ///
    /// Variable-length fields are length-prefixed so no two distinct field
    /// combinations share an encoding.
    pub fn signing_input(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            SIGNING_DOMAIN.len() + self.declaration_id.len() + self.payload.len() + 64,
        );
        put_bytes(&mut out, SIGNING_DOMAIN);
        out.extend_from_slice(&self.format_version.to_be_bytes());
        put_bytes(&mut out, self.algorithm.as_str().as_bytes());
        put_bytes(&mut out, self.declaration_id.as_bytes());
        put_bytes(&mut out, self.payload.as_bytes());
        out.extend_from_slice(&self.issued_at.to_be_bytes());
        out.extend_from_slice(&self.expires_at.to_be_bytes());
        out
    }

    /// Export as an opaque URL-safe string for storage by the caller
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64.encode(json))
    }

    /// Parse a string previously produced by [`DashboardSnapshot::encode`]
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| DashboardError::SnapshotMalformed(format!("invalid base64: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DashboardError::SnapshotMalformed(format!("invalid snapshot: {}", e)))
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}
