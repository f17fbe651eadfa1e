//! Resolution output models

use super::declaration::SectionDeclaration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-checkable reason a section is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    SubjectNotAllowed,
    InsufficientCapability,
    EntitlementExpired,
    EntitlementMissing,
    FeatureDisabled,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::SubjectNotAllowed => "SUBJECT_NOT_ALLOWED",
            ReasonCode::InsufficientCapability => "INSUFFICIENT_CAPABILITY",
            ReasonCode::EntitlementExpired => "ENTITLEMENT_EXPIRED",
            ReasonCode::EntitlementMissing => "ENTITLEMENT_MISSING",
            ReasonCode::FeatureDisabled => "FEATURE_DISABLED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one section was hidden
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenReason {
    pub section_id: String,
    pub code: ReasonCode,
    /// Offending tags (capabilities, entitlement or flag)
    pub details: Vec<String>,
}

/// Why the whole dashboard was withheld from the subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReason {
    pub code: ReasonCode,
    pub details: Vec<String>,
}

/// Result of resolving a declaration against one request.
///
/// Every declared section is either in `visible_sections` or in
/// `hidden_sections`, and each hidden section has exactly one entry in
/// `reasons`. Field and element order are stable so serialized output is
/// identical for identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDashboard {
    pub dashboard_id: String,
    pub visible_sections: Vec<SectionDeclaration>,
    pub hidden_sections: Vec<String>,
    pub reasons: Vec<HiddenReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_reason: Option<DashboardReason>,
}

impl ResolvedDashboard {
    pub fn is_visible(&self, section_id: &str) -> bool {
        self.visible_sections
            .iter()
            .any(|s| s.section_id == section_id)
    }

    pub fn reason_for(&self, section_id: &str) -> Option<&HiddenReason> {
        self.reasons.iter().find(|r| r.section_id == section_id)
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible_sections
            .iter()
            .map(|s| s.section_id.as_str())
            .collect()
    }
}
