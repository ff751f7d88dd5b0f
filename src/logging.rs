//! Logging and tracing initialization.
//!
//! Structured logging via the `tracing` ecosystem, with pretty console output
//! for people and JSON output for machine parsing.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Configuration for the logging system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
}

impl From<&AppConfig> for LogConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            json: config.log_json,
            verbose: config.verbose,
        }
    }
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    format!("scale_ui_state={}", level.as_str().to_lowercase())
}

/// Initialize the tracing subscriber.
///
/// Call once, early in `main()`, after config is loaded. `RUST_LOG`
/// overrides the level chosen here. Logs go to stderr so command output on
/// stdout stays parseable.
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.verbose)));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_follows_verbosity() {
        assert_eq!(default_directive(false), "scale_ui_state=info");
        assert_eq!(default_directive(true), "scale_ui_state=debug");
    }

    #[test]
    fn log_config_from_app_config() {
        let app = AppConfig {
            verbose: true,
            log_json: true,
            ..Default::default()
        };
        let log = LogConfig::from(&app);
        assert!(log.json);
        assert!(log.verbose);
    }
}
