//! Dashboard resolution engine.
//!
//! Classifies every declared section as visible or hidden for one request.
//! Resolution reads nothing but its arguments, so identical inputs always
//! produce identical output.

use crate::domain::{
    DashboardContext, DashboardDeclaration, DashboardReason, EntitlementSnapshot,
    FeatureSnapshot, HiddenReason, PermissionResult, ReasonCode, ResolvedDashboard,
    SectionDeclaration,
};
use crate::error::Result;
use crate::telemetry::metrics as dash_metrics;
use metrics::counter;
use validator::Validate;

/// Outcome of the per-section checks
type CheckResult = std::result::Result<(), (ReasonCode, Vec<String>)>;

/// Resolve which sections of `declaration` the subject may see.
///
/// The declaration is validated first. After that, resolution cannot fail:
/// an ineligible subject or a missing capability yields hidden sections with
/// reasons, not an error.
pub fn resolve_dashboard(
    declaration: &DashboardDeclaration,
    context: &DashboardContext,
    permissions: &PermissionResult,
    entitlements: &EntitlementSnapshot,
    features: &FeatureSnapshot,
) -> Result<ResolvedDashboard> {
    declaration.validate()?;

    if !declaration.allowed_subjects.contains(&context.subject_type) {
        tracing::debug!(
            dashboard_id = %declaration.dashboard_id,
            subject_type = %context.subject_type,
            "Subject type not allowed on dashboard"
        );
        counter!(dash_metrics::RESOLUTIONS_TOTAL, "outcome" => "subject_not_allowed")
            .increment(1);
        return Ok(withhold_dashboard(declaration, context));
    }

    let mut resolved = ResolvedDashboard {
        dashboard_id: declaration.dashboard_id.clone(),
        visible_sections: Vec::with_capacity(declaration.sections.len()),
        hidden_sections: vec![],
        reasons: vec![],
        dashboard_reason: None,
    };

    for section in &declaration.sections {
        match evaluate_section(section, permissions, entitlements, features) {
            Ok(()) => resolved.visible_sections.push(section.clone()),
            Err((code, details)) => {
                tracing::debug!(
                    dashboard_id = %declaration.dashboard_id,
                    section_id = %section.section_id,
                    reason = %code,
                    "Section hidden"
                );
                counter!(dash_metrics::SECTIONS_HIDDEN_TOTAL, "reason" => code.as_str())
                    .increment(1);
                resolved.hidden_sections.push(section.section_id.clone());
                resolved.reasons.push(HiddenReason {
                    section_id: section.section_id.clone(),
                    code,
                    details,
                });
            }
        }
    }

    counter!(dash_metrics::RESOLUTIONS_TOTAL, "outcome" => "resolved").increment(1);
    Ok(resolved)
}

/// Checks run in a fixed order; the first failure is the recorded reason.
fn evaluate_section(
    section: &SectionDeclaration,
    permissions: &PermissionResult,
    entitlements: &EntitlementSnapshot,
    features: &FeatureSnapshot,
) -> CheckResult {
    check_capabilities(section, permissions)?;
    check_entitlement(section, entitlements)?;
    check_feature(section, features)?;
    Ok(())
}

fn check_capabilities(section: &SectionDeclaration, permissions: &PermissionResult) -> CheckResult {
    let offending: Vec<String> = section
        .required_capabilities
        .iter()
        .filter(|cap| !permissions.holds(cap))
        .cloned()
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err((ReasonCode::InsufficientCapability, offending))
    }
}

fn check_entitlement(
    section: &SectionDeclaration,
    entitlements: &EntitlementSnapshot,
) -> CheckResult {
    let Some(required) = &section.required_entitlement else {
        return Ok(());
    };

    if entitlements.expired_entitlements.contains(required) {
        return Err((ReasonCode::EntitlementExpired, vec![required.clone()]));
    }
    if !entitlements.active_entitlements.contains(required) {
        return Err((ReasonCode::EntitlementMissing, vec![required.clone()]));
    }
    Ok(())
}

fn check_feature(section: &SectionDeclaration, features: &FeatureSnapshot) -> CheckResult {
    let Some(gate) = &section.feature else {
        return Ok(());
    };

    let disabled = features.disabled_features.contains(&gate.flag);
    let enabled = features.enabled_features.contains(&gate.flag);
    if disabled || (!gate.default_enabled && !enabled) {
        return Err((ReasonCode::FeatureDisabled, vec![gate.flag.clone()]));
    }
    Ok(())
}

/// Zero visible sections. Each section still gets its own reason record so
/// hidden ids and reasons stay in one-to-one correspondence.
fn withhold_dashboard(
    declaration: &DashboardDeclaration,
    context: &DashboardContext,
) -> ResolvedDashboard {
    let details = vec![context.subject_type.clone()];
    ResolvedDashboard {
        dashboard_id: declaration.dashboard_id.clone(),
        visible_sections: vec![],
        hidden_sections: declaration
            .section_ids()
            .map(str::to_string)
            .collect(),
        reasons: declaration
            .sections
            .iter()
            .map(|s| HiddenReason {
                section_id: s.section_id.clone(),
                code: ReasonCode::SubjectNotAllowed,
                details: details.clone(),
            })
            .collect(),
        dashboard_reason: Some(DashboardReason {
            code: ReasonCode::SubjectNotAllowed,
            details,
        }),
    }
}
