use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "gknight_cache_hit_total",
            Unit::Count,
            "Total number of cache reads that found a live entry."
        );
        describe_counter!(
            "gknight_cache_miss_total",
            Unit::Count,
            "Total number of cache reads that found nothing usable."
        );
        describe_counter!(
            "gknight_cache_expired_total",
            Unit::Count,
            "Total number of entries evicted because they were read after expiry."
        );
        describe_counter!(
            "gknight_rate_limit_rejected_total",
            Unit::Count,
            "Total number of requests rejected by the token bucket limiter."
        );
        describe_counter!(
            "gknight_upstream_failure_total",
            Unit::Count,
            "Total number of failed catalog requests."
        );
        describe_histogram!(
            "gknight_upstream_request_ms",
            Unit::Milliseconds,
            "Catalog request latency in milliseconds."
        );
    });
}
