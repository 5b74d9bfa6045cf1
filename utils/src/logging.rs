//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Output format of the fmt subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    /// Parse `"human"` or `"json"`; anything else falls back to human output.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Human
        }
    }
}

/// Human-readable output filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    init_tracing_with(LogFormat::Human, "info");
}

/// Initialize tracing with an explicit format and default level.
///
/// `RUST_LOG` still wins when set. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing_with(format: LogFormat, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.try_init(),
    };
}
