//! Replay of verified snapshots

use super::verify::{check_expiry, check_integrity, record};
use super::SnapshotSealer;
use crate::domain::{DashboardSnapshot, ResolvedDashboard};
use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};

impl SnapshotSealer {
    /// Return the resolution frozen in `snapshot` as of `now`.
    ///
    /// Trust-then-replay: the snapshot must verify and be unexpired at `now`,
    /// after which the embedded resolution is returned as issued. No
    /// capability, entitlement or feature check is re-run.
    pub fn evaluate(
        &self,
        snapshot: &DashboardSnapshot,
        now: DateTime<Utc>,
    ) -> Result<ResolvedDashboard> {
        record(
            check_integrity(&self.scheme, snapshot)
                .and_then(|()| check_expiry(snapshot, now.timestamp_millis())),
        )?;

        let resolved: ResolvedDashboard = serde_json::from_str(&snapshot.payload)
            .map_err(|e| DashboardError::SnapshotMalformed(format!("invalid payload: {}", e)))?;

        if resolved.dashboard_id != snapshot.declaration_id {
            return Err(DashboardError::SnapshotMalformed(format!(
                "payload is for dashboard '{}', snapshot names '{}'",
                resolved.dashboard_id, snapshot.declaration_id
            )));
        }

        tracing::debug!(
            dashboard_id = %resolved.dashboard_id,
            visible = resolved.visible_sections.len(),
            "Dashboard replayed from snapshot"
        );
        Ok(resolved)
    }
}

/// Replay an unkeyed snapshot. See [`SnapshotSealer::evaluate`].
pub fn evaluate_from_snapshot(
    snapshot: &DashboardSnapshot,
    now: DateTime<Utc>,
) -> Result<ResolvedDashboard> {
    SnapshotSealer::unkeyed().evaluate(snapshot, now)
}
