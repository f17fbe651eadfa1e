//! Telemetry initialization: structured logging and metric descriptions

pub mod metrics;

use crate::config::TelemetryConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed by the host, in
/// which case the host's subscriber stays in effect.
pub fn init(config: &TelemetryConfig) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dashgate_core=info".into());

    if config.describe_metrics {
        metrics::describe_metrics();
    }

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.log_format == "json" {
        // Flatten event fields so `message` is top-level in each JSON line
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true);
        registry.with(fmt_layer).try_init().is_ok()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init().is_ok()
    };

    if installed {
        tracing::debug!(log_format = %config.log_format, "Telemetry initialised");
    }
    installed
}
