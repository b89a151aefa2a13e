use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output (for interactive CLI use).
    Human,
    /// Structured JSON output (for scripted use).
    Json,
}

impl LogFormat {
    /// Map the `--log-json` flag onto a format.
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }
}

/// Directives used when `RUST_LOG` is unset: info+ from the forge
/// crates, warnings only from dependencies.
fn default_filter() -> EnvFilter {
    EnvFilter::new("warn,forge_client=info,forge_cli=info")
}

/// Initialize the global tracing subscriber. Call once at startup;
/// `RUST_LOG` overrides the default filter.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        // Interactive sessions drop timestamps and targets; the output
        // shares a terminal with tables and progress bars.
        LogFormat::Human => registry
            .with(fmt::layer().without_time().with_target(false).compact())
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}
