//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Create a tracing span for a listener generation operation
///
/// ```rust,ignore
/// let span = lds_span!("build_inbound_chain", proxy);
/// let span = lds_span!("build_outbound_chain", dst, route_table = "RDS_Outbound");
/// ```
#[macro_export]
macro_rules! lds_span {
    ($operation:expr, $identity:expr) => {
        tracing::debug_span!(
            "lds_operation",
            operation = %$operation,
            identity = %$identity,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $identity:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "lds_operation",
            operation = %$operation,
            identity = %$identity,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the env filter from the configured level, falling back to `info`
fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber, writing to stderr.
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = if config.json_logging {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()
    };

    result.map_err(|e| Error::config_with_source("Failed to initialize logging", Box::new(e)))?;

    tracing::debug!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        "Logging initialized"
    );

    Ok(())
}
