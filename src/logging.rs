//! Log setup. stdout carries the status line, so every event goes to stderr.

use std::io;

use tracing_subscriber::{fmt, EnvFilter};

use crate::bootstrap::parse_flag;
use crate::core::consts::env;

/// Used when `RUST_LOG` is unset. Keeps h2/hyper/tower quiet.
pub const DEFAULT_FILTER: &str = "lnboot=info,warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `LNBOOT_LOG_JSON` truthy → one JSON object per event.
    pub fn from_env() -> Self {
        match std::env::var(env::LOG_JSON) {
            Ok(value) if parse_flag(&value) => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_logging() {
    init_logging_with(LogFormat::from_env(), DEFAULT_FILTER);
}

/// Safe to call more than once; later calls are ignored.
pub fn init_logging_with(format: LogFormat, default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
