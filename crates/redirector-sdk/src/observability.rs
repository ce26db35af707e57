//! Tracing subscriber initialisation

use crate::error::{Result, SdkError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str =
    "redirector_sdk=info,redirector_runtime=info,redirector_repository=info";

/// Install a global `fmt` subscriber filtered by `RUST_LOG` or `default_filter`
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| SdkError::ConfigError(format!("Failed to initialize tracing: {}", e)))
}
