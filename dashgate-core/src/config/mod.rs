//! Configuration management for Dashgate Core

use crate::crypto::SnapshotKey;
use anyhow::{bail, Context, Result};
use std::env;

/// Default snapshot lifetime: one hour
pub const DEFAULT_SNAPSHOT_TTL_MS: i64 = 3_600_000;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot issuing configuration
    pub snapshot: SnapshotConfig,
    /// Logging and metrics configuration
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Lifetime used by `SnapshotSealer::generate_default`
    pub default_ttl_ms: i64,
    /// HMAC key. Without one, snapshots carry an unkeyed SHA-256 digest.
    pub signing_key: Option<SnapshotKey>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_SNAPSHOT_TTL_MS,
            signing_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    /// Register metric descriptions on init. Counters are emitted to the
    /// host's recorder either way.
    pub describe_metrics: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            describe_metrics: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_ttl_ms: i64 = lookup("DASHGATE_SNAPSHOT_TTL_MS")
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_TTL_MS.to_string())
            .parse()
            .context("Invalid DASHGATE_SNAPSHOT_TTL_MS")?;
        if default_ttl_ms <= 0 {
            bail!("DASHGATE_SNAPSHOT_TTL_MS must be positive, got {}", default_ttl_ms);
        }

        let signing_key = match lookup("DASHGATE_SNAPSHOT_KEY") {
            Some(raw) if !raw.trim().is_empty() => Some(
                SnapshotKey::from_base64(&raw).context("Invalid DASHGATE_SNAPSHOT_KEY")?,
            ),
            _ => None,
        };

        let log_format = lookup("DASHGATE_LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());
        if log_format != "json" && log_format != "pretty" {
            bail!(
                "DASHGATE_LOG_FORMAT must be \"json\" or \"pretty\", got {:?}",
                log_format
            );
        }

        let describe_metrics = lookup("DASHGATE_DESCRIBE_METRICS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        Ok(Self {
            snapshot: SnapshotConfig {
                default_ttl_ms,
                signing_key,
            },
            telemetry: TelemetryConfig {
                log_format,
                describe_metrics,
            },
        })
    }
}
