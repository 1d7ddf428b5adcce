use std::path::PathBuf;

use maa_ocrlog_core::EmptyTaskPolicy;

use crate::terminal_output::supports_color;

/// Analyzer runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level for diagnostics on stderr
    pub log_level: String,
    /// Directory for rolling NDJSON diagnostics; none disables file logging
    pub log_dir: Option<PathBuf>,
    /// Meaning of an empty `--task`
    pub empty_task_policy: EmptyTaskPolicy,
    /// ANSI colour on the report
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
            empty_task_policy: EmptyTaskPolicy::Literal,
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("MAA_OCRLOG_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var_os("MAA_OCRLOG_LOG_DIR").map(PathBuf::from),
            empty_task_policy: std::env::var("MAA_OCRLOG_EMPTY_TASK")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.empty_task_policy),
            color: supports_color(),
        }
    }
}
