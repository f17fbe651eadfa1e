//! Unified error handling for Dashgate Core

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Engine error types
///
/// A hidden section is never an error; these variants only cover malformed
/// input and snapshots that must not be trusted.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid ttl: {0}ms (must be a positive number of milliseconds)")]
    InvalidTtl(i64),

    #[error("Snapshot tampered: integrity tag mismatch")]
    SnapshotTampered,

    #[error("Snapshot expired at {expires_at} (evaluated at {now})")]
    SnapshotExpired { expires_at: i64, now: i64 },

    #[error("Snapshot malformed: {0}")]
    SnapshotMalformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl DashboardError {
    /// Stable label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Validation(_) => "validation",
            DashboardError::InvalidTtl(_) => "invalid_ttl",
            DashboardError::SnapshotTampered => "tampered",
            DashboardError::SnapshotExpired { .. } => "expired",
            DashboardError::SnapshotMalformed(_) => "malformed",
            DashboardError::Serialization(_) => "serialization",
            DashboardError::Config(_) => "config",
        }
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for DashboardError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DashboardError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::InvalidTtl(0);
        assert_eq!(
            err.to_string(),
            "Invalid ttl: 0ms (must be a positive number of milliseconds)"
        );

        let err = DashboardError::SnapshotExpired {
            expires_at: 10,
            now: 11,
        };
        assert_eq!(err.to_string(), "Snapshot expired at 10 (evaluated at 11)");
    }

    #[test]
    fn test_error_conversion() {
        let err: DashboardError = anyhow::anyhow!("bad key").into();
        assert!(matches!(err, DashboardError::Config(_)));
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_validation_errors_conversion() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("sections", validator::ValidationError::new("duplicate_section_id"));
        let err: DashboardError = errors.into();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            DashboardError::Validation(String::new()).kind(),
            DashboardError::InvalidTtl(-1).kind(),
            DashboardError::SnapshotTampered.kind(),
            DashboardError::SnapshotExpired {
                expires_at: 0,
                now: 0,
            }
            .kind(),
            DashboardError::SnapshotMalformed(String::new()).kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
