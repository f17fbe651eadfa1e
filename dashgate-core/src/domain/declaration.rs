//! Dashboard declaration domain models

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use validator::{Validate, ValidationError};

/// Static description of a dashboard and its sections.
///
/// Declarations are authored or configured ahead of time and are treated as
/// immutable while a request is being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDeclaration {
    #[validate(length(min = 1, max = 128))]
    pub dashboard_id: String,
    pub label: String,
    /// Subject-type tags allowed to see this dashboard at all
    #[validate(custom(function = "validate_allowed_subjects"))]
    pub allowed_subjects: BTreeSet<String>,
    /// Sections in display order
    #[validate(custom(function = "validate_sections"))]
    pub sections: Vec<SectionDeclaration>,
}

/// A single section of a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDeclaration {
    pub section_id: String,
    pub label: String,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_entitlement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureGate>,
}

/// Feature flag gating a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGate {
    pub flag: String,
    /// When false the flag must be explicitly enabled for the section to show
    #[serde(default = "default_enabled")]
    pub default_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SectionDeclaration {
    pub fn new(section_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            label: label.into(),
            required_capabilities: vec![],
            required_entitlement: None,
            feature: None,
        }
    }

    pub fn requires(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.push(capability.into());
        self
    }

    pub fn with_entitlement(mut self, entitlement: impl Into<String>) -> Self {
        self.required_entitlement = Some(entitlement.into());
        self
    }

    pub fn with_feature(mut self, flag: impl Into<String>, default_enabled: bool) -> Self {
        self.feature = Some(FeatureGate {
            flag: flag.into(),
            default_enabled,
        });
        self
    }
}

impl DashboardDeclaration {
    /// Iterate section ids in declaration order
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.section_id.as_str())
    }
}

fn validate_allowed_subjects(subjects: &BTreeSet<String>) -> Result<(), ValidationError> {
    if subjects.is_empty() {
        return Err(ValidationError::new("empty_allowed_subjects")
            .with_message(Cow::from("allowedSubjects must not be empty")));
    }
    if subjects.iter().any(|s| s.trim().is_empty()) {
        return Err(ValidationError::new("blank_subject_type")
            .with_message(Cow::from("allowedSubjects contains a blank entry")));
    }
    Ok(())
}

/// Section ids must be present and unique; capability tags must be non-blank
/// and unique within a section.
fn validate_sections(sections: &[SectionDeclaration]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(sections.len());
    for section in sections {
        if section.section_id.trim().is_empty() {
            return Err(ValidationError::new("blank_section_id")
                .with_message(Cow::from("section id must not be blank")));
        }
        if !seen.insert(section.section_id.as_str()) {
            return Err(ValidationError::new("duplicate_section_id").with_message(Cow::from(
                format!("duplicate section id '{}'", section.section_id),
            )));
        }
        if section
            .required_capabilities
            .iter()
            .any(|c| c.trim().is_empty())
        {
            return Err(ValidationError::new("blank_capability").with_message(Cow::from(
                format!("section '{}' requires a blank capability", section.section_id),
            )));
        }
        let mut capabilities = HashSet::with_capacity(section.required_capabilities.len());
        if let Some(dup) = section
            .required_capabilities
            .iter()
            .find(|c| !capabilities.insert(c.as_str()))
        {
            return Err(ValidationError::new("duplicate_capability").with_message(Cow::from(
                format!(
                    "section '{}' requires '{}' more than once",
                    section.section_id, dup
                ),
            )));
        }
        if let Some(gate) = &section.feature {
            if gate.flag.trim().is_empty() {
                return Err(ValidationError::new("blank_feature_flag").with_message(Cow::from(
                    format!("section '{}' is gated by a blank flag", section.section_id),
                )));
            }
        }
    }
    Ok(())
}
