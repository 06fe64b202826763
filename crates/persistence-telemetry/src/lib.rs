//! # Persistence Telemetry
//!
//! Logging bootstrap for binaries built on the state persistence crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use persistence_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `state-persistence` | Service name in logs |
//! | `SP_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SP_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `SP_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Log a persistence event with the tier attached as a structured field.
///
/// # Example
///
/// ```rust,ignore
/// log_tier_event!(warn, "large_capacity", "write failed", size = 1024);
/// ```
#[macro_export]
macro_rules! log_tier_event {
    ($level:ident, $tier:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            tier = %$tier,
            $($($field)*,)?
            $msg
        )
    };
}
