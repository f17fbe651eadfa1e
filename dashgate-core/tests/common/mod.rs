//! Common test fixtures

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use dashgate_core::{
    DashboardContext, DashboardDeclaration, EntitlementSnapshot, FeatureSnapshot,
    PermissionResult, ResolvedDashboard, SectionDeclaration,
};

pub const TENANT_ID: &str = "tenant-001";
pub const SUBJECT_ID: &str = "user-001";

/// 2026-01-21T12:00:00Z
pub fn evaluation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 21, 12, 0, 0).unwrap()
}

pub fn context(subject_type: &str) -> DashboardContext {
    DashboardContext {
        tenant_id: TENANT_ID.to_string(),
        partner_id: Some("partner-001".to_string()),
        subject_id: SUBJECT_ID.to_string(),
        subject_type: subject_type.to_string(),
        roles: vec![subject_type.to_string()],
        evaluation_time: evaluation_time(),
    }
}

/// `overview` needs nothing, `billing` needs MANAGE_BILLING
pub fn overview_billing() -> DashboardDeclaration {
    DashboardDeclaration {
        dashboard_id: "partner-dashboard".to_string(),
        label: "Partner Dashboard".to_string(),
        allowed_subjects: ["partner_admin".to_string(), "staff".to_string()]
            .into_iter()
            .collect(),
        sections: vec![
            SectionDeclaration::new("overview", "Overview"),
            SectionDeclaration::new("billing", "Billing").requires("MANAGE_BILLING"),
        ],
    }
}

pub fn permissions(capabilities: &[&str]) -> PermissionResult {
    PermissionResult::new(SUBJECT_ID, capabilities.iter().copied())
}

pub fn no_entitlements() -> EntitlementSnapshot {
    EntitlementSnapshot::new(TENANT_ID, Vec::<String>::new())
}

pub fn no_features() -> FeatureSnapshot {
    FeatureSnapshot::default()
}

/// Resolve `overview_billing` for a partner admin holding only VIEW_DASHBOARD
pub fn view_only_resolution() -> (DashboardDeclaration, DashboardContext, ResolvedDashboard) {
    let decl = overview_billing();
    let ctx = context("partner_admin");
    let resolved = dashgate_core::resolve_dashboard(
        &decl,
        &ctx,
        &permissions(&["VIEW_DASHBOARD"]),
        &no_entitlements(),
        &no_features(),
    )
    .unwrap();
    (decl, ctx, resolved)
}
