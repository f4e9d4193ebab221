//! Register-then-log facade
//!
//! [`LogDumper`] is the three-call surface client applications use:
//! register once, then `info` / `error`. [`DefaultLogDumper`] implements it on
//! top of a [`Registry`]; it is an ordinary value, so a process can hold as
//! many as it has application names.

use crate::engine::Logger;
use crate::errors::LogDumperError;
use crate::record::{LogRecord, Severity};
use crate::registry::Registry;
use crate::reporter::WriteFailure;
use tracing::warn;

pub trait LogDumper {
    /// Register the calling application. Must succeed before logging.
    fn register_app(&mut self, app_name: &str) -> bool;

    fn info(&self, message: &str);

    fn error(&self, message: &str);
}

pub struct DefaultLogDumper {
    registry: Registry,
    logger: Option<Logger>,
}

impl DefaultLogDumper {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            logger: None,
        }
    }

    /// The logger bound by the last successful registration.
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Wait for every write submitted so far.
    pub async fn flush(&self) {
        if let Some(logger) = &self.logger {
            logger.flush().await;
        }
    }

    fn now(&self) -> String {
        LogRecord::capture("", Severity::Info, "", &self.registry.config().timestamp_format)
            .timestamp
    }

    fn log(&self, severity: Severity, message: &str) {
        match &self.logger {
            Some(logger) => logger.submit(severity, message),
            None => {
                let record = LogRecord::capture(
                    "",
                    severity,
                    message,
                    &self.registry.config().timestamp_format,
                );
                self.registry.reporter().report(WriteFailure {
                    app_name: record.app_name,
                    file_path: None,
                    severity: Some(severity),
                    timestamp: record.timestamp,
                    error: LogDumperError::not_registered("log call before register_app"),
                });
            }
        }
    }
}

impl LogDumper for DefaultLogDumper {
    fn register_app(&mut self, app_name: &str) -> bool {
        match self.registry.register_app(app_name) {
            Ok(logger) => {
                self.logger = Some(logger);
                true
            }
            Err(e) => {
                // A failed registration leaves nothing to log through.
                self.logger = None;
                warn!(app = app_name, error = %e, "registration failed");
                self.registry.reporter().report(WriteFailure {
                    app_name: app_name.to_string(),
                    file_path: None,
                    severity: None,
                    timestamp: self.now(),
                    error: e,
                });
                false
            }
        }
    }

    fn info(&self, message: &str) {
        self.log(Severity::Info, message)
    }

    fn error(&self, message: &str) {
        self.log(Severity::Error, message)
    }
}
