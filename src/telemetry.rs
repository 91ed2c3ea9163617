use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::pledge::Address;

/// Initialize structured logging.
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!("dao-pledge telemetry initialized");
    Ok(())
}

/// Generate a correlation ID linking every log line of one submission attempt
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one submission attempt
pub fn create_submission_span(
    organization: &Address,
    applicant: &Address,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "pledge_submission",
        organization = %organization,
        applicant = %applicant,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}

pub fn shutdown_telemetry() {
    tracing::info!("dao-pledge telemetry shutdown complete");
}
