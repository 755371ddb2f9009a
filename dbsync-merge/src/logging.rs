//! Logging setup for dbsync.
//!
//! The engine logs through `tracing` macros. Nothing is printed unless a
//! subscriber is installed, either by the application or by [`init`]
//! (feature `tracing-subscriber`).
//!
//! # Environment Variables
//!
//! - `DBSYNC_DEBUG=true|1|yes` - Enable debug logging
//! - `DBSYNC_LOG_LEVEL=trace|debug|info|warn|error` - Set the level explicitly
//! - `DBSYNC_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use dbsync_merge::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "DBSYNC_DEBUG";
const LEVEL_VAR: &str = "DBSYNC_LOG_LEVEL";
const FORMAT_VAR: &str = "DBSYNC_LOG_FORMAT";

/// Whether `DBSYNC_DEBUG` is set to a truthy value.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Level from `DBSYNC_LOG_LEVEL`, else `debug` when debugging, else `warn`.
pub fn log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// Format from `DBSYNC_LOG_FORMAT`, default `json`.
pub fn log_format() -> &'static str {
    resolve_format(env::var(FORMAT_VAR).ok().as_deref())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };

    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Install the dbsync subscriber once. Later calls do nothing.
///
/// Skipped entirely unless `DBSYNC_DEBUG` or `DBSYNC_LOG_LEVEL` is set.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = log_level();
            let filter = EnvFilter::try_new(format!(
                "dbsync={},dbsync_merge={},dbsync_schema={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            match log_format() {
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

            tracing::info!(level = level, format = log_format(), "dbsync logging initialized");
        }
    });
}

/// Set `DBSYNC_LOG_LEVEL` and call [`init`].
///
/// # Safety
///
/// Modifies the process environment. Call at startup before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: called at startup before other threads exist.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_resolution() {
        assert_eq!(resolve_level(None, false), "warn");
        assert_eq!(resolve_level(None, true), "debug");
        assert_eq!(resolve_level(Some("INFO"), false), "info");
        assert_eq!(resolve_level(Some("verbose"), false), "warn");
        assert_eq!(resolve_level(Some("verbose"), true), "debug");
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(resolve_format(None), "json");
        assert_eq!(resolve_format(Some("Pretty")), "pretty");
        assert_eq!(resolve_format(Some("compact")), "compact");
        assert_eq!(resolve_format(Some("xml")), "json");
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("YES"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
