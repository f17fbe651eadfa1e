//! Partner dashboard preset
//!
//! Standard sections, permissions and feature flags for the partner-facing
//! dashboard, plus helpers to turn a partner configuration into a
//! [`DashboardDeclaration`].

use super::context::PermissionResult;
use super::declaration::{DashboardDeclaration, SectionDeclaration};
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub const PARTNER_DASHBOARD_ID: &str = "partner-dashboard";
pub const PARTNER_DASHBOARD_LABEL: &str = "Partner Dashboard";
pub const PARTNER_SUBJECT_TYPES: [&str; 2] = ["partner_admin", "staff"];

/// Feature flags a partner configuration may reference
pub const KNOWN_PARTNER_FLAGS: [&str; 4] = [
    "dashboard-v2",
    "analytics-basic",
    "advanced-analytics",
    "api-access",
];

/// Capability tags understood by the partner dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerPermission {
    ViewDashboard,
    ViewAnalytics,
    EditProfile,
    ManageBilling,
    ManageUsers,
    ViewReports,
}

impl PartnerPermission {
    pub fn all() -> [PartnerPermission; 6] {
        [
            PartnerPermission::ViewDashboard,
            PartnerPermission::ViewAnalytics,
            PartnerPermission::EditProfile,
            PartnerPermission::ManageBilling,
            PartnerPermission::ManageUsers,
            PartnerPermission::ViewReports,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerPermission::ViewDashboard => "VIEW_DASHBOARD",
            PartnerPermission::ViewAnalytics => "VIEW_ANALYTICS",
            PartnerPermission::EditProfile => "EDIT_PROFILE",
            PartnerPermission::ManageBilling => "MANAGE_BILLING",
            PartnerPermission::ManageUsers => "MANAGE_USERS",
            PartnerPermission::ViewReports => "VIEW_REPORTS",
        }
    }
}

impl fmt::Display for PartnerPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section of the partner dashboard, guarded by a single permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSection {
    pub id: String,
    pub label: String,
    pub required_permission: PartnerPermission,
}

impl PartnerSection {
    fn new(id: &str, label: &str, required_permission: PartnerPermission) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            required_permission,
        }
    }
}

/// The stock section list, in display order
pub fn default_partner_sections() -> Vec<PartnerSection> {
    vec![
        PartnerSection::new("overview", "Overview", PartnerPermission::ViewDashboard),
        PartnerSection::new("analytics", "Analytics", PartnerPermission::ViewAnalytics),
        PartnerSection::new("profile", "Profile", PartnerPermission::EditProfile),
        PartnerSection::new("billing", "Billing", PartnerPermission::ManageBilling),
        PartnerSection::new("users", "Users", PartnerPermission::ManageUsers),
        PartnerSection::new("reports", "Reports", PartnerPermission::ViewReports),
    ]
}

/// Section-to-flag wiring for a partner dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDashboardFeatureFlags {
    /// section id -> flag that must not be disabled
    #[serde(default)]
    pub section_flags: Vec<(String, String)>,
    /// Flags that must be explicitly enabled (default-off)
    #[serde(default)]
    pub opt_in: BTreeSet<String>,
}

/// Per-partner dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDashboardConfig {
    pub partner_id: String,
    pub sections: Vec<PartnerSection>,
    #[serde(default)]
    pub feature_flags: PartnerDashboardFeatureFlags,
}

impl PartnerDashboardConfig {
    pub fn with_defaults(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            sections: default_partner_sections(),
            feature_flags: PartnerDashboardFeatureFlags::default(),
        }
    }
}

/// Check a partner configuration before it is turned into a declaration.
pub fn validate_partner_dashboard_config(config: &PartnerDashboardConfig) -> Result<()> {
    if config.partner_id.trim().is_empty() {
        return Err(DashboardError::Validation(
            "partner id must not be blank".to_string(),
        ));
    }
    if config.sections.is_empty() {
        return Err(DashboardError::Validation(
            "partner dashboard needs at least one section".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for section in &config.sections {
        if section.id.trim().is_empty() {
            return Err(DashboardError::Validation(
                "section id must not be blank".to_string(),
            ));
        }
        if !seen.insert(section.id.as_str()) {
            return Err(DashboardError::Validation(format!(
                "duplicate section id '{}'",
                section.id
            )));
        }
    }

    for (section_id, flag) in &config.feature_flags.section_flags {
        if !seen.contains(section_id.as_str()) {
            return Err(DashboardError::Validation(format!(
                "feature flag '{}' targets unknown section '{}'",
                flag, section_id
            )));
        }
        if !KNOWN_PARTNER_FLAGS.contains(&flag.as_str()) {
            return Err(DashboardError::Validation(format!(
                "unknown feature flag '{}'",
                flag
            )));
        }
    }
    if let Some(flag) = config
        .feature_flags
        .opt_in
        .iter()
        .find(|f| !KNOWN_PARTNER_FLAGS.contains(&f.as_str()))
    {
        return Err(DashboardError::Validation(format!(
            "unknown feature flag '{}'",
            flag
        )));
    }

    Ok(())
}

/// Build the declaration for a validated partner configuration
pub fn partner_dashboard_declaration(
    config: &PartnerDashboardConfig,
) -> Result<DashboardDeclaration> {
    validate_partner_dashboard_config(config)?;

    let sections = config
        .sections
        .iter()
        .map(|section| {
            let mut decl = SectionDeclaration::new(section.id.clone(), section.label.clone())
                .requires(section.required_permission.as_str());
            if let Some((_, flag)) = config
                .feature_flags
                .section_flags
                .iter()
                .find(|(id, _)| id == &section.id)
            {
                let default_enabled = !config.feature_flags.opt_in.contains(flag);
                decl = decl.with_feature(flag.clone(), default_enabled);
            }
            decl
        })
        .collect();

    Ok(DashboardDeclaration {
        dashboard_id: PARTNER_DASHBOARD_ID.to_string(),
        label: PARTNER_DASHBOARD_LABEL.to_string(),
        allowed_subjects: PARTNER_SUBJECT_TYPES.iter().map(|s| s.to_string()).collect(),
        sections,
    })
}

/// Flattened view of what a subject may do on the partner dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDashboardCapabilities {
    pub can_view_dashboard: bool,
    pub can_view_analytics: bool,
    pub can_edit_profile: bool,
    pub can_manage_billing: bool,
    pub can_manage_users: bool,
    pub can_view_reports: bool,
}

impl PartnerDashboardCapabilities {
    pub fn from_permissions(permissions: &PermissionResult) -> Self {
        let holds = |p: PartnerPermission| permissions.holds(p.as_str());
        Self {
            can_view_dashboard: holds(PartnerPermission::ViewDashboard),
            can_view_analytics: holds(PartnerPermission::ViewAnalytics),
            can_edit_profile: holds(PartnerPermission::EditProfile),
            can_manage_billing: holds(PartnerPermission::ManageBilling),
            can_manage_users: holds(PartnerPermission::ManageUsers),
            can_view_reports: holds(PartnerPermission::ViewReports),
        }
    }
}
