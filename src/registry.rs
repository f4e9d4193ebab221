//! Application registration
//!
//! Binds an application name to `<log_directory>/<name><log_extension>`,
//! creating the file if it does not exist yet, and hands back a [`Logger`].

use crate::config::LogConfig;
use crate::engine::Logger;
use crate::errors::{LogDumperError, LogResult};
use crate::reporter::{FailureReporter, TracingReporter};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Longest application name accepted, in bytes.
pub const MAX_APP_NAME_LEN: usize = 128;

/// The resolved binding between an application name and its log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerHandle {
    app_name: String,
    file_path: PathBuf,
}

impl LoggerHandle {
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Creates loggers for application names.
///
/// Holds the configuration, the failure reporter shared by every logger it
/// creates, and the tokio runtime their background writes run on.
#[derive(Clone)]
pub struct Registry {
    config: Arc<LogConfig>,
    reporter: Arc<dyn FailureReporter>,
    runtime: Handle,
}

impl Registry {
    /// Build a registry on the current tokio runtime.
    pub fn new(config: LogConfig) -> LogResult<Self> {
        let runtime = Handle::try_current().map_err(LogDumperError::no_runtime)?;
        Self::with_runtime(config, runtime)
    }

    /// Build a registry whose background writes run on `runtime`.
    pub fn with_runtime(config: LogConfig, runtime: Handle) -> LogResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            reporter: Arc::new(TracingReporter),
            runtime,
        })
    }

    /// Replace the failure reporter for loggers registered from now on.
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub(crate) fn reporter(&self) -> Arc<dyn FailureReporter> {
        self.reporter.clone()
    }

    /// Compute the log file path for `app_name` without touching the filesystem.
    pub fn resolve_path(&self, app_name: &str) -> LogResult<PathBuf> {
        validate_app_name(app_name)?;

        let dir = &self.config.log_directory;
        let file_name = format!("{app_name}{}", self.config.log_extension);
        let path = dir.join(file_name);

        if path.parent() != Some(dir.as_path()) {
            return Err(LogDumperError::registration(
                app_name,
                "resolved path escapes the log directory",
            ));
        }

        Ok(path)
    }

    /// Register `app_name`, creating its log file if absent.
    ///
    /// Existing content is never truncated, so re-registering after a restart
    /// keeps appending to the same file.
    pub fn register_app(&self, app_name: &str) -> LogResult<Logger> {
        let file_path = self.resolve_path(app_name)?;

        fs::create_dir_all(&self.config.log_directory).map_err(|e| {
            LogDumperError::io(
                format!("creating {}", self.config.log_directory.display()),
                e,
            )
        })?;

        match OpenOptions::new().write(true).create_new(true).open(&file_path) {
            Ok(_) => info!(app = app_name, path = %file_path.display(), "created log file"),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let meta = fs::metadata(&file_path).map_err(|e| {
                    LogDumperError::io(format!("inspecting {}", file_path.display()), e)
                })?;
                if !meta.is_file() {
                    return Err(LogDumperError::registration(
                        app_name,
                        format!("{} exists and is not a regular file", file_path.display()),
                    ));
                }
                debug!(app = app_name, path = %file_path.display(), "reusing log file");
            }
            Err(e) => {
                return Err(LogDumperError::io(
                    format!("creating {}", file_path.display()),
                    e,
                ))
            }
        }

        let handle = LoggerHandle {
            app_name: app_name.to_string(),
            file_path,
        };

        Ok(Logger::spawn(
            handle,
            self.config.timestamp_format.clone(),
            self.config.dispatch,
            self.reporter.clone(),
            &self.runtime,
        ))
    }
}

/// Reject names that are empty, too long, could leave the log directory, or
/// would break the four-field line format.
pub fn validate_app_name(name: &str) -> LogResult<()> {
    if name.trim().is_empty() {
        return Err(LogDumperError::registration(name, "name cannot be empty"));
    }

    if name.len() > MAX_APP_NAME_LEN {
        return Err(LogDumperError::registration(name, "name too long"));
    }

    if name == "." || name == ".." {
        return Err(LogDumperError::registration(name, "name refers to a directory"));
    }

    if name.contains(['/', '\\', ':', '\0']) {
        return Err(LogDumperError::registration(
            name,
            "name contains a path separator",
        ));
    }

    if name.contains([',', '\n', '\r']) {
        return Err(LogDumperError::registration(
            name,
            "name contains a field delimiter or line break",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_valid_names() {
        assert!(validate_app_name("svc1").is_ok());
        assert!(validate_app_name("payment-gateway_v2").is_ok());
        assert!(validate_app_name("app.worker").is_ok());
    }

    #[test]
    fn test_rejected_names() {
        assert!(validate_app_name("").is_err());
        assert!(validate_app_name("   ").is_err());
        assert!(validate_app_name(".").is_err());
        assert!(validate_app_name("..").is_err());
        assert!(validate_app_name("../etc/passwd").is_err());
        assert!(validate_app_name("a/b").is_err());
        assert!(validate_app_name("a\\b").is_err());
        assert!(validate_app_name("C:evil").is_err());
        assert!(validate_app_name("a,b").is_err());
        assert!(validate_app_name("line\nbreak").is_err());
        assert!(validate_app_name(&"x".repeat(MAX_APP_NAME_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn test_resolve_path() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(LogConfig::with_directory(dir.path())).unwrap();

        let path = registry.resolve_path("svc1").unwrap();
        assert_eq!(path, dir.path().join("svc1.log"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_register_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let registry = Registry::new(LogConfig::with_directory(&log_dir)).unwrap();

        let logger = registry.register_app("svc1").unwrap();
        assert_eq!(logger.handle().app_name(), "svc1");
        assert_eq!(logger.handle().file_path(), log_dir.join("svc1.log"));
        assert!(log_dir.join("svc1.log").is_file());
    }

    #[tokio::test]
    async fn test_directory_in_place_of_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("svc.log")).unwrap();
        let registry = Registry::new(LogConfig::with_directory(dir.path())).unwrap();

        let err = registry.register_app("svc").unwrap_err();
        assert!(matches!(err, LogDumperError::Registration { .. }));
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("plain-file");
        fs::write(&not_a_dir, "occupied").unwrap();
        let registry = Registry::new(LogConfig::with_directory(&not_a_dir)).unwrap();

        let err = registry.register_app("svc").unwrap_err();
        assert!(matches!(err, LogDumperError::Io { .. }));
        assert_eq!(fs::read_to_string(&not_a_dir).unwrap(), "occupied");
        assert!(!not_a_dir.join("svc.log").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_new_without_runtime_fails() {
        let dir = tempdir().unwrap();
        let err = Registry::new(LogConfig::with_directory(dir.path())).err().unwrap();
        assert!(matches!(err, LogDumperError::NoRuntime { .. }));
        assert!(err.to_string().contains("runtime"));
    }
}
