//! Diagnostics setup
//!
//! The bridge reports through `tracing` events (`proxy_created`,
//! `proxy_disabled`, `default_fallback`, `unresolvable_method`,
//! `fallback_failed`, ...). Hosts that already install a subscriber need
//! nothing from this module; `init` is a convenience for those that don't.

use std::io;

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for `proxybridge` events when `RUST_LOG` is not set
    pub level: Level,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
    /// Show span enter/close events
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PROXYBRIDGE_LOG: trace, debug, info, warn, error
        if let Some(level) = std::env::var("PROXYBRIDGE_LOG")
            .ok()
            .as_deref()
            .and_then(parse_level)
        {
            config.level = level;
        }

        config.json_format = std::env::var("PROXYBRIDGE_LOG_JSON").is_ok();
        config.show_spans = std::env::var("PROXYBRIDGE_LOG_SPANS").is_ok();

        config
    }

    /// Verbose config: every call and fallback is traced
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            json_format: false,
            show_spans: true,
        }
    }
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with a custom configuration.
///
/// Only the first call has an effect. If the host already installed a global
/// subscriber, that one is kept.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("proxybridge={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = if config.json_format {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_span_events(span_events),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_span_events(span_events)
                        .with_target(true)
                        .with_thread_ids(cfg!(debug_assertions)),
                )
                .try_init()
        };

        if installed.is_err() {
            tracing::debug!(event = "logging_skipped", "Global subscriber already set");
        }
    });
}

/// Whether `init` has run
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}
