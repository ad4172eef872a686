//! Logging setup.
//!
//! The crate only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. With the `tracing-subscriber` feature enabled,
//! [`init`] installs one configured from the environment:
//!
//! - `AEROSPIKE_URL_DEBUG=true|1|yes` - enable debug logging
//! - `AEROSPIKE_URL_LOG_LEVEL=trace|debug|info|warn|error` - set the level
//! - `AEROSPIKE_URL_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! Malformed policy values in a connection string are reported at `warn`
//! level, so the default level already surfaces them.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `AEROSPIKE_URL_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("AEROSPIKE_URL_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `AEROSPIKE_URL_LOG_LEVEL`.
///
/// Defaults to "debug" if debug logging is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };

    match env::var("AEROSPIKE_URL_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `AEROSPIKE_URL_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("AEROSPIKE_URL_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize logging. Subsequent calls are no-ops.
///
/// Does nothing unless `AEROSPIKE_URL_DEBUG` or `AEROSPIKE_URL_LOG_LEVEL` is
/// set, or when the `tracing-subscriber` feature is disabled.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("AEROSPIKE_URL_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("aerospike_url={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "aerospike-url logging initialized"
                );
            }
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented to be called at program startup before threads exist.
    unsafe {
        env::set_var("AEROSPIKE_URL_LOG_LEVEL", level);
    }
    init();
}

/// Initialize debug logging, equivalent to `AEROSPIKE_URL_DEBUG=true` then [`init`].
///
/// # Safety
///
/// Same constraints as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: documented to be called at program startup before threads exist.
    unsafe {
        env::set_var("AEROSPIKE_URL_DEBUG", "true");
    }
    init();
}
