//! Logging setup for datasource.
//!
//! Resolution steps log at `debug`, pool registration at `info` and failed
//! shutdown hooks at `warn`. Output is controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `DATASOURCE_DEBUG=true|1|yes` - Enable debug logging
//! - `DATASOURCE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `DATASOURCE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use datasource_core::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! Without the `tracing-subscriber` feature [`init`] installs nothing and the
//! host is expected to install its own subscriber.

use std::env;
use std::sync::Once;

/// Enables debug logging.
pub const DEBUG_VAR: &str = "DATASOURCE_DEBUG";

/// Overrides the log level.
pub const LEVEL_VAR: &str = "DATASOURCE_LOG_LEVEL";

/// Selects the output format.
pub const FORMAT_VAR: &str = "DATASOURCE_LOG_FORMAT";

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `DATASOURCE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| parse_debug(&v))
        .unwrap_or(false)
}

fn parse_debug(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// The configured log level.
///
/// Defaults to "debug" if `DATASOURCE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    level_from(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

fn level_from(level: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// The configured log format. Defaults to "json".
pub fn get_log_format() -> &'static str {
    format_from(env::var(FORMAT_VAR).ok().as_deref())
}

fn format_from(format: Option<&str>) -> &'static str {
    match format.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Initialize logging. Subsequent calls are no-ops.
///
/// Nothing is installed unless `DATASOURCE_DEBUG` or `DATASOURCE_LOG_LEVEL`
/// is set.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "datasource={},datasource_core={},datasource_cli={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "Datasource logging initialized"
            );
        }
    });
}

/// Debug logging gated on `DATASOURCE_DEBUG` at runtime.
#[macro_export]
macro_rules! datasource_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}
