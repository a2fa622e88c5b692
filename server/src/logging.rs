//! Tracing subscriber setup.
//!
//! Library code logs through the `log` facade; `LogTracer` forwards those
//! records into tracing so one subscriber formats everything. The filter
//! defaults to `info` and honours `RUST_LOG`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use guideline::config::LogFormat;

use crate::error::ServerError;

pub fn init_logging(format: LogFormat) -> Result<(), ServerError> {
    tracing_log::LogTracer::init().map_err(|e| ServerError::Logging(e.to_string()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().json().with_current_span(true)),
        ),
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().with_target(true)),
        ),
    };

    result.map_err(|e| ServerError::Logging(e.to_string()))
}
