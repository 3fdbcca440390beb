//! Tracing subscriber setup for the `tabdash` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Full filter directive override, e.g. `TABDASH_LOG=tabdash_core=debug`.
pub const ENV_LOG: &str = "TABDASH_LOG";

/// `TABDASH_LOG` wins when it parses; otherwise the configured level applies.
pub fn env_filter(level: &str, directive: Option<&str>) -> EnvFilter {
    directive
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.trim().to_lowercase()))
}

/// Install the global subscriber. Log lines go to stderr so command output
/// on stdout stays machine readable.
pub fn init_logging(cfg: &LoggingConfig) -> Result<(), String> {
    let directive = std::env::var(ENV_LOG).ok();
    let filter = env_filter(&cfg.level, directive.as_deref());
    let registry = tracing_subscriber::registry().with(filter);

    let result = if cfg.format.trim().eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|err| format!("init logging: {err}"))
}
