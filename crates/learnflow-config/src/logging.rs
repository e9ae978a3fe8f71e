//! Logging initialization.
//!
//! Thin wrapper over the observability crate so binaries only need a
//! level and the resolved [`Paths`].

use crate::Paths;

/// Initialize structured logging for the CLI.
///
/// JSONL goes to `<base>/logs/learnflow.jsonl`; `also_stderr` mirrors
/// events to the terminal (useful with `--log-level debug`).
pub fn init_logging(paths: &Paths, level: &str, also_stderr: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: "cli".into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
