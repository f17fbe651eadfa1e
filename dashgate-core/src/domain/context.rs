//! Per-request inputs supplied by the external collaborators
//!
//! The identity provider builds [`DashboardContext`], the capability provider
//! builds [`PermissionResult`], the entitlement service builds
//! [`EntitlementSnapshot`] and the feature flag service builds
//! [`FeatureSnapshot`]. The engine only reads these values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity and time frame of an evaluation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardContext {
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    pub subject_id: String,
    pub subject_type: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// The only clock the engine ever looks at
    pub evaluation_time: DateTime<Utc>,
}

/// Capability grants for the acting subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResult {
    pub subject_id: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub denied_capabilities: BTreeSet<String>,
}

impl PermissionResult {
    pub fn new<I, S>(subject_id: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            denied_capabilities: BTreeSet::new(),
        }
    }

    pub fn deny<I, S>(mut self, denied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_capabilities
            .extend(denied.into_iter().map(Into::into));
        self
    }

    /// A capability is held only if granted and not denied. Denial wins.
    pub fn holds(&self, capability: &str) -> bool {
        self.capabilities.contains(capability) && !self.denied_capabilities.contains(capability)
    }
}

/// Commercial entitlements of the tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    pub tenant_id: String,
    #[serde(default)]
    pub active_entitlements: BTreeSet<String>,
    #[serde(default)]
    pub expired_entitlements: BTreeSet<String>,
}

impl EntitlementSnapshot {
    pub fn new<I, S>(tenant_id: impl Into<String>, active: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tenant_id: tenant_id.into(),
            active_entitlements: active.into_iter().map(Into::into).collect(),
            expired_entitlements: BTreeSet::new(),
        }
    }

    pub fn expire<I, S>(mut self, expired: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expired_entitlements
            .extend(expired.into_iter().map(Into::into));
        self
    }
}

/// Feature toggles in effect for the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    #[serde(default)]
    pub enabled_features: BTreeSet<String>,
    #[serde(default)]
    pub disabled_features: BTreeSet<String>,
}

impl FeatureSnapshot {
    pub fn new<I, S>(enabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled_features: enabled.into_iter().map(Into::into).collect(),
            disabled_features: BTreeSet::new(),
        }
    }

    pub fn disable<I, S>(mut self, disabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_features
            .extend(disabled.into_iter().map(Into::into));
        self
    }
}
