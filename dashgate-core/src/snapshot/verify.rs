//! Snapshot verification
//!
//! Verification is a security check, not a parser: any parseable snapshot
//! yields a yes/no answer and never an error.

use super::SnapshotSealer;
use crate::crypto::IntegrityScheme;
use crate::domain::{DashboardSnapshot, SNAPSHOT_FORMAT_VERSION};
use crate::error::{DashboardError, Result};
use crate::telemetry::metrics as dash_metrics;
use chrono::{DateTime, Utc};
use metrics::counter;

impl SnapshotSealer {
    /// Integrity check only; the validity window is not compared to any clock.
    pub fn verify(&self, snapshot: &DashboardSnapshot) -> bool {
        record(check_integrity(&self.scheme, snapshot)).is_ok()
    }

    /// Integrity check plus `now < expires_at`.
    pub fn verify_with_expiry(&self, snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> bool {
        let outcome = check_integrity(&self.scheme, snapshot)
            .and_then(|()| check_expiry(snapshot, now.timestamp_millis()));
        record(outcome).is_ok()
    }
}

/// Integrity check with the unkeyed scheme
pub fn verify_snapshot(snapshot: &DashboardSnapshot) -> bool {
    SnapshotSealer::unkeyed().verify(snapshot)
}

/// Integrity and expiry check with the unkeyed scheme
pub fn verify_snapshot_with_expiry(snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> bool {
    SnapshotSealer::unkeyed().verify_with_expiry(snapshot, now)
}

/// Classify a snapshot's integrity.
///
/// `SnapshotMalformed` when the tag cannot be checked at all (unknown
/// version, foreign algorithm), `SnapshotTampered` when it does not match.
pub(crate) fn check_integrity(
    scheme: &IntegrityScheme,
    snapshot: &DashboardSnapshot,
) -> Result<()> {
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(DashboardError::SnapshotMalformed(format!(
            "unsupported format version {}",
            snapshot.format_version
        )));
    }
    if snapshot.algorithm != scheme.algorithm() {
        return Err(DashboardError::SnapshotMalformed(format!(
            "algorithm {} is not accepted by a {} verifier",
            snapshot.algorithm,
            scheme.algorithm()
        )));
    }
    if !scheme.verify(&snapshot.signing_input(), &snapshot.integrity_tag) {
        return Err(DashboardError::SnapshotTampered);
    }
    // Only reachable with a correctly tagged but inverted window
    if snapshot.expires_at <= snapshot.issued_at {
        return Err(DashboardError::SnapshotMalformed(
            "validity window is empty".to_string(),
        ));
    }
    Ok(())
}

/// Valid strictly before `expires_at`
pub(crate) fn check_expiry(snapshot: &DashboardSnapshot, now_millis: i64) -> Result<()> {
    if now_millis < snapshot.expires_at {
        Ok(())
    } else {
        Err(DashboardError::SnapshotExpired {
            expires_at: snapshot.expires_at,
            now: now_millis,
        })
    }
}

/// Count and log a verification outcome, passing it through unchanged
pub(crate) fn record(outcome: Result<()>) -> Result<()> {
    let result = match &outcome {
        Ok(()) => "valid",
        Err(err) => {
            tracing::warn!(error = %err, "Dashboard snapshot rejected");
            err.kind()
        }
    };
    counter!(dash_metrics::SNAPSHOT_VERIFICATIONS_TOTAL, "result" => result).increment(1);
    outcome
}
