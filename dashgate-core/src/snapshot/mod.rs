//! Snapshot issuing, verification and replay
//!
//! A [`SnapshotSealer`] freezes a [`ResolvedDashboard`] into a
//! [`DashboardSnapshot`] whose integrity tag covers the payload and its
//! validity window. The same sealer later verifies the snapshot and replays
//! the embedded resolution without consulting any collaborator.
//!
//! The free functions use the unkeyed SHA-256 scheme. Callers that hand
//! snapshots to untrusted parties should build a keyed sealer instead.

pub mod evaluate;
pub mod verify;

pub use evaluate::evaluate_from_snapshot;
pub use verify::{verify_snapshot, verify_snapshot_with_expiry};

use crate::config::{SnapshotConfig, DEFAULT_SNAPSHOT_TTL_MS};
use crate::crypto::{IntegrityScheme, SnapshotKey};
use crate::domain::{
    DashboardContext, DashboardDeclaration, DashboardSnapshot, IntegrityAlgorithm,
    ResolvedDashboard, SNAPSHOT_FORMAT_VERSION,
};
use crate::error::{DashboardError, Result};
use crate::telemetry::metrics as dash_metrics;
use metrics::counter;
use std::collections::HashSet;
use validator::Validate;

/// Issues and checks snapshots under one integrity scheme.
#[derive(Debug, Clone)]
pub struct SnapshotSealer {
    scheme: IntegrityScheme,
    default_ttl_ms: i64,
}

impl SnapshotSealer {
    pub fn new(scheme: IntegrityScheme) -> Self {
        Self {
            scheme,
            default_ttl_ms: DEFAULT_SNAPSHOT_TTL_MS,
        }
    }

    /// SHA-256 content digest, no key
    pub fn unkeyed() -> Self {
        Self::new(IntegrityScheme::Sha256)
    }

    /// HMAC-SHA256 under `key`
    pub fn keyed(key: SnapshotKey) -> Self {
        Self::new(IntegrityScheme::HmacSha256(key))
    }

    /// Scheme from the signing key, lifetime for [`generate_default`](Self::generate_default)
    /// from `default_ttl_ms`.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        let sealer = match &config.signing_key {
            Some(key) => Self::keyed(key.clone()),
            None => {
                tracing::warn!(
                    "No snapshot signing key configured, snapshots use an unkeyed SHA-256 digest"
                );
                Self::unkeyed()
            }
        };
        Self {
            default_ttl_ms: config.default_ttl_ms,
            ..sealer
        }
    }

    pub fn algorithm(&self) -> IntegrityAlgorithm {
        self.scheme.algorithm()
    }

    pub fn default_ttl_ms(&self) -> i64 {
        self.default_ttl_ms
    }

    /// [`generate`](Self::generate) with the configured default lifetime
    pub fn generate_default(
        &self,
        declaration: &DashboardDeclaration,
        resolved: &ResolvedDashboard,
        context: &DashboardContext,
    ) -> Result<DashboardSnapshot> {
        self.generate(declaration, resolved, context, self.default_ttl_ms)
    }

    /// Freeze `resolved` into a snapshot valid for `ttl_millis` from
    /// `context.evaluation_time`.
    pub fn generate(
        &self,
        declaration: &DashboardDeclaration,
        resolved: &ResolvedDashboard,
        context: &DashboardContext,
        ttl_millis: i64,
    ) -> Result<DashboardSnapshot> {
        if ttl_millis <= 0 {
            return Err(DashboardError::InvalidTtl(ttl_millis));
        }
        declaration.validate()?;
        check_resolution_matches(declaration, resolved)?;

        let issued_at = context.evaluation_time.timestamp_millis();
        let expires_at = issued_at
            .checked_add(ttl_millis)
            .ok_or(DashboardError::InvalidTtl(ttl_millis))?;

        let mut snapshot = DashboardSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            algorithm: self.algorithm(),
            declaration_id: declaration.dashboard_id.clone(),
            payload: serde_json::to_string(resolved)?,
            issued_at,
            expires_at,
            integrity_tag: String::new(),
        };
        snapshot.integrity_tag = self.scheme.tag(&snapshot.signing_input());

        tracing::debug!(
            dashboard_id = %snapshot.declaration_id,
            algorithm = %snapshot.algorithm,
            issued_at,
            expires_at,
            "Dashboard snapshot issued"
        );
        counter!(dash_metrics::SNAPSHOTS_ISSUED_TOTAL, "algorithm" => snapshot.algorithm.as_str())
            .increment(1);

        Ok(snapshot)
    }
}

impl Default for SnapshotSealer {
    fn default() -> Self {
        Self::unkeyed()
    }
}

/// Issue an unkeyed snapshot. See [`SnapshotSealer::generate`].
pub fn generate_dashboard_snapshot(
    declaration: &DashboardDeclaration,
    resolved: &ResolvedDashboard,
    context: &DashboardContext,
    ttl_millis: i64,
) -> Result<DashboardSnapshot> {
    SnapshotSealer::unkeyed().generate(declaration, resolved, context, ttl_millis)
}

/// The resolution must classify exactly the declared sections and give one
/// reason per hidden section, in the same order.
fn check_resolution_matches(
    declaration: &DashboardDeclaration,
    resolved: &ResolvedDashboard,
) -> Result<()> {
    if resolved.dashboard_id != declaration.dashboard_id {
        return Err(DashboardError::Validation(format!(
            "resolution is for dashboard '{}', not '{}'",
            resolved.dashboard_id, declaration.dashboard_id
        )));
    }

    let declared: HashSet<&str> = declaration.section_ids().collect();
    let classified: Vec<&str> = resolved
        .visible_sections
        .iter()
        .map(|s| s.section_id.as_str())
        .chain(resolved.hidden_sections.iter().map(String::as_str))
        .collect();
    let unique: HashSet<&str> = classified.iter().copied().collect();

    if classified.len() != declared.len() || unique != declared {
        return Err(DashboardError::Validation(
            "resolution does not classify every declared section exactly once".to_string(),
        ));
    }

    let reason_ids = resolved.reasons.iter().map(|r| r.section_id.as_str());
    if !reason_ids.eq(resolved.hidden_sections.iter().map(String::as_str)) {
        return Err(DashboardError::Validation(
            "resolution reasons do not match its hidden sections".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EntitlementSnapshot, FeatureSnapshot, PermissionResult, SectionDeclaration,
    };
    use crate::policy::resolve_dashboard;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn fixture() -> (DashboardDeclaration, DashboardContext, ResolvedDashboard) {
        let decl = DashboardDeclaration {
            dashboard_id: "partner-dashboard".to_string(),
            label: "Partner Dashboard".to_string(),
            allowed_subjects: ["partner_admin".to_string()].into_iter().collect(),
            sections: vec![
                SectionDeclaration::new("overview", "Overview"),
                SectionDeclaration::new("billing", "Billing").requires("MANAGE_BILLING"),
            ],
        };
        let ctx = DashboardContext {
            tenant_id: "tenant-001".to_string(),
            partner_id: None,
            subject_id: "user-001".to_string(),
            subject_type: "partner_admin".to_string(),
            roles: vec![],
            evaluation_time: Utc.with_ymd_and_hms(2026, 1, 21, 12, 0, 0).unwrap(),
        };
        let resolved = resolve_dashboard(
            &decl,
            &ctx,
            &PermissionResult::new("user-001", ["VIEW_DASHBOARD"]),
            &EntitlementSnapshot::default(),
            &FeatureSnapshot::default(),
        )
        .unwrap();
        (decl, ctx, resolved)
    }

    #[test]
    fn test_generate_sets_window() {
        let (decl, ctx, resolved) = fixture();
        let snapshot = generate_dashboard_snapshot(&decl, &resolved, &ctx, 3_600_000).unwrap();

        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.algorithm, IntegrityAlgorithm::Sha256);
        assert_eq!(snapshot.declaration_id, "partner-dashboard");
        assert_eq!(snapshot.issued_at, 1_768_996_800_000);
        assert_eq!(snapshot.expires_at, 1_768_996_800_000 + 3_600_000);
        assert_eq!(snapshot.integrity_tag.len(), 64);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let (decl, ctx, resolved) = fixture();
        let a = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000).unwrap();
        let b = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000).unwrap();
        assert_eq!(a, b);

        let c = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_001).unwrap();
        assert_ne!(a.integrity_tag, c.integrity_tag);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    fn test_generate_rejects_invalid_ttl(#[case] ttl: i64) {
        let (decl, ctx, resolved) = fixture();
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, ttl);
        assert!(matches!(result, Err(DashboardError::InvalidTtl(t)) if t == ttl));
    }

    #[test]
    fn test_generate_rejects_mismatched_resolution() {
        let (decl, ctx, mut resolved) = fixture();
        resolved.dashboard_id = "other-dashboard".to_string();
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));

        let (decl, ctx, mut resolved) = fixture();
        resolved.hidden_sections.push("overview".to_string());
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));

        let (decl, ctx, mut resolved) = fixture();
        resolved.hidden_sections.clear();
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));

        let (decl, ctx, mut resolved) = fixture();
        resolved.reasons.clear();
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));

        let (decl, ctx, mut resolved) = fixture();
        let reason = resolved.reasons[0].clone();
        resolved.reasons.push(reason);
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));

        let (decl, ctx, mut resolved) = fixture();
        resolved.reasons[0].section_id = "overview".to_string();
        let result = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000);
        assert!(matches!(result, Err(DashboardError::Validation(_))));
    }

    #[test]
    fn test_keyed_sealer_uses_hmac() {
        let (decl, ctx, resolved) = fixture();
        let sealer = SnapshotSealer::keyed(SnapshotKey::new([3u8; 32]));
        let keyed = sealer.generate(&decl, &resolved, &ctx, 1_000).unwrap();
        let unkeyed = generate_dashboard_snapshot(&decl, &resolved, &ctx, 1_000).unwrap();

        assert_eq!(keyed.algorithm, IntegrityAlgorithm::HmacSha256);
        assert_eq!(keyed.payload, unkeyed.payload);
        assert_ne!(keyed.integrity_tag, unkeyed.integrity_tag);
    }

    #[test]
    fn test_from_config() {
        let sealer = SnapshotSealer::from_config(&SnapshotConfig::default());
        assert_eq!(sealer.algorithm(), IntegrityAlgorithm::Sha256);

        let config = SnapshotConfig {
            signing_key: Some(SnapshotKey::new([1u8; 32])),
            ..SnapshotConfig::default()
        };
        let sealer = SnapshotSealer::from_config(&config);
        assert_eq!(sealer.algorithm(), IntegrityAlgorithm::HmacSha256);
        assert_eq!(sealer.default_ttl_ms(), DEFAULT_SNAPSHOT_TTL_MS);
    }

    #[test]
    fn test_generate_default_uses_configured_ttl() {
        let (decl, ctx, resolved) = fixture();
        let config = SnapshotConfig {
            default_ttl_ms: 60_000,
            ..SnapshotConfig::default()
        };
        let sealer = SnapshotSealer::from_config(&config);

        let snapshot = sealer.generate_default(&decl, &resolved, &ctx).unwrap();
        assert_eq!(snapshot.expires_at - snapshot.issued_at, 60_000);
        assert_eq!(
            snapshot,
            sealer.generate(&decl, &resolved, &ctx, 60_000).unwrap()
        );

        let unconfigured = SnapshotSealer::unkeyed()
            .generate_default(&decl, &resolved, &ctx)
            .unwrap();
        assert_eq!(
            unconfigured.expires_at - unconfigured.issued_at,
            DEFAULT_SNAPSHOT_TTL_MS
        );
    }
}
