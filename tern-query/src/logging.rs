//! Log setup for Tern.
//!
//! Tern logs through `tracing`. Nothing is printed unless a subscriber is
//! installed, either by the application or by [`init`] (which needs the
//! `tracing-subscriber` feature).
//!
//! # Environment Variables
//!
//! - `TERN_DEBUG=true|1|yes` - Enable debug logging
//! - `TERN_LOG_LEVEL=trace|debug|info|warn|error` - Set the level explicitly
//! - `TERN_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use tern_query::logging;
//!
//! logging::init();
//! ```
//!
//! Targets used inside the workspace: `tern_query::wire` for encode/decode,
//! `tern_client::client` for requests and response classification.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TERN_DEBUG";
const LEVEL_VAR: &str = "TERN_LOG_LEVEL";
const FORMAT_VAR: &str = "TERN_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ => Self::Json,
        }
    }

    /// Format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

fn truthy(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

fn resolve_level(level: Option<&str>, debug: bool) -> &'static str {
    match level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ if debug => "debug",
        _ => "warn",
    }
}

/// Check if `TERN_DEBUG` is set to a true value.
#[inline]
pub fn is_debug_enabled() -> bool {
    truthy(env::var(DEBUG_VAR).ok().as_deref())
}

/// The level from `TERN_LOG_LEVEL`, falling back to `debug` when
/// `TERN_DEBUG` is on and `warn` otherwise.
pub fn get_log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The format from `TERN_LOG_FORMAT`.
pub fn get_log_format() -> LogFormat {
    LogFormat::parse(env::var(FORMAT_VAR).ok().as_deref())
}

/// Install a subscriber for the Tern crates. Later calls are no-ops, as is a
/// call with neither `TERN_DEBUG` nor `TERN_LOG_LEVEL` set.
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
                "tern={level},tern_query={level},tern_client={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            // A subscriber installed by the application wins.
            let installed = match get_log_format() {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level = level, format = get_log_format().as_str(), "Tern logging initialized");
            }
        }
    });
}

/// Set `TERN_LOG_LEVEL` and call [`init`].
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it at startup before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as a startup-only call.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

/// Set `TERN_DEBUG=true` and call [`init`].
///
/// # Safety
///
/// Same constraint as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: documented as a startup-only call.
    unsafe {
        env::set_var(DEBUG_VAR, "true");
    }
    init();
}

/// Debug event emitted only when `TERN_DEBUG` is on.
#[macro_export]
macro_rules! tern_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Trace event emitted only when `TERN_DEBUG` is on.
#[macro_export]
macro_rules! tern_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::trace!($($arg)*);
        }
    };
}
