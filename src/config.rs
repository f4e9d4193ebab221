// Runtime configuration for logdumper
// Supplies where log files live, their extension, and how writes are dispatched.

use crate::errors::{LogDumperError, LogResult};
use chrono::Utc;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "logdumper.toml";

/// Prefix for environment overrides, e.g. `LOGDUMPER_LOG_DIRECTORY`.
pub const ENV_PREFIX: &str = "LOGDUMPER_";

/// How a handle hands its records to background writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One blocking task per call; completion order is unspecified.
    #[default]
    Concurrent,
    /// One writer task per handle; lines land in call order.
    Ordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_extension")]
    pub log_extension: String,
    /// strftime pattern used for the first field of every line
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default)]
    pub dispatch: DispatchMode,
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_extension() -> String {
    ".log".to_string()
}

fn default_timestamp_format() -> String {
    "%a %b %d %H:%M:%S UTC %Y".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_directory: default_log_directory(),
            log_extension: default_log_extension(),
            timestamp_format: default_timestamp_format(),
            dispatch: DispatchMode::default(),
        }
    }
}

impl LogConfig {
    /// Defaults with the log directory replaced.
    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        LogConfig {
            log_directory: dir.into(),
            ..LogConfig::default()
        }
    }

    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatch = mode;
        self
    }

    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Reject values that would produce unparseable lines or escape the log directory.
    pub fn validate(&self) -> LogResult<()> {
        if self.log_directory.as_os_str().is_empty() {
            return Err(LogDumperError::config("log_directory cannot be empty"));
        }

        let ext = &self.log_extension;
        if !ext.is_empty() && !ext.starts_with('.') {
            return Err(LogDumperError::config(format!(
                "log_extension must start with '.': {ext:?}"
            )));
        }
        if ext.contains(['/', '\\', '\0']) {
            return Err(LogDumperError::config(format!(
                "log_extension contains a path separator: {ext:?}"
            )));
        }

        let sample = render_timestamp(&self.timestamp_format, Utc::now()).ok_or_else(|| {
            LogDumperError::config(format!(
                "invalid timestamp_format: {:?}",
                self.timestamp_format
            ))
        })?;
        if sample.contains([',', '\n', '\r']) {
            return Err(LogDumperError::config(format!(
                "timestamp_format renders a field delimiter or line break: {sample:?}"
            )));
        }

        Ok(())
    }
}

/// Render `at` with a strftime pattern, or `None` if the pattern is malformed.
pub(crate) fn render_timestamp(format: &str, at: chrono::DateTime<Utc>) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", at.format(format)).ok()?;
    Some(out)
}

/// Load configuration from defaults, a TOML file and `LOGDUMPER_*` environment variables.
///
/// When `path` is `None`, `logdumper.toml` in the working directory is used if present.
pub fn load_config(path: Option<&Path>) -> LogResult<LogConfig> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    let figment = Figment::from(Serialized::defaults(LogConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: LogConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}
