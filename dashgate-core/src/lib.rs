//! Dashgate Core - Dashboard Resolution Engine
//!
//! This crate decides which sections of a declared dashboard a subject may
//! see, given their capabilities, the tenant's entitlements and the active
//! feature flags, and freezes the outcome into tamper-evident, time-bounded
//! snapshots that can be replayed without consulting those sources again.
//!
//! Everything a consumer needs is re-exported from the crate root.

pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod policy;
pub mod snapshot;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use crypto::{IntegrityScheme, SnapshotKey};
pub use domain::{
    DashboardContext, DashboardDeclaration, DashboardReason, DashboardSnapshot,
    EntitlementSnapshot, FeatureGate, FeatureSnapshot, HiddenReason, IntegrityAlgorithm,
    PermissionResult, ReasonCode, ResolvedDashboard, SectionDeclaration,
};
pub use error::{DashboardError, Result};
pub use policy::resolve_dashboard;
pub use snapshot::{
    evaluate_from_snapshot, generate_dashboard_snapshot, verify_snapshot,
    verify_snapshot_with_expiry, SnapshotSealer,
};
