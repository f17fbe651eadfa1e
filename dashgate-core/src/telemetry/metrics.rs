//! Metric names and descriptions
//!
//! The engine only talks to the `metrics` facade. Installing a recorder and
//! exporting the values is left to the host process.

use metrics::{counter, describe_counter};

pub const RESOLUTIONS_TOTAL: &str = "dashgate_resolutions_total";
pub const SECTIONS_HIDDEN_TOTAL: &str = "dashgate_sections_hidden_total";
pub const SNAPSHOTS_ISSUED_TOTAL: &str = "dashgate_snapshots_issued_total";
pub const SNAPSHOT_VERIFICATIONS_TOTAL: &str = "dashgate_snapshot_verifications_total";

/// Register metric descriptions and emit initial zero values so exporters
/// show HELP/TYPE lines before the first resolution.
pub fn describe_metrics() {
    describe_counter!(
        RESOLUTIONS_TOTAL,
        "Dashboard resolutions by outcome (resolved/subject_not_allowed)"
    );
    describe_counter!(SECTIONS_HIDDEN_TOTAL, "Hidden sections by reason code");
    describe_counter!(SNAPSHOTS_ISSUED_TOTAL, "Snapshots issued by integrity algorithm");
    describe_counter!(
        SNAPSHOT_VERIFICATIONS_TOTAL,
        "Snapshot verifications by result (valid/tampered/expired/malformed)"
    );

    counter!(RESOLUTIONS_TOTAL, "outcome" => "resolved").absolute(0);
    counter!(SNAPSHOTS_ISSUED_TOTAL, "algorithm" => "sha256").absolute(0);
    counter!(SNAPSHOT_VERIFICATIONS_TOTAL, "result" => "valid").absolute(0);
    counter!(SNAPSHOT_VERIFICATIONS_TOTAL, "result" => "tampered").absolute(0);
}
