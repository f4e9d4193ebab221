// Log records and the on-disk line format
// One record becomes one line: timestamp,app,SEVERITY,message

use chrono::{DateTime, Utc};
use std::fmt;

use crate::config::render_timestamp;

/// Field delimiter of a log line.
pub const FIELD_DELIMITER: char = ',';

/// Substitute written in place of a delimiter found inside a message.
pub const DELIMITER_PLACEHOLDER: char = '|';

/// Severity classifies a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log call, captured at the moment it was made.
///
/// Records are never persisted as structs; only [`LogRecord::to_line`] reaches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub app_name: String,
    pub severity: Severity,
    pub message: String,
}

impl LogRecord {
    /// Capture a record now, rendering the clock with `timestamp_format`.
    pub fn capture(
        app_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        timestamp_format: &str,
    ) -> Self {
        Self::at(Utc::now(), app_name, severity, message, timestamp_format)
    }

    pub fn at(
        when: DateTime<Utc>,
        app_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        timestamp_format: &str,
    ) -> Self {
        // Formats are checked when the config loads; RFC 3339 covers hand-built configs.
        let timestamp = render_timestamp(timestamp_format, when).unwrap_or_else(|| when.to_rfc3339());
        Self {
            timestamp,
            app_name: app_name.into(),
            severity,
            message: message.into(),
        }
    }

    /// Serialize into a line without its terminator.
    pub fn to_line(&self) -> String {
        format!(
            "{ts}{d}{app}{d}{sev}{d}{msg}",
            ts = self.timestamp,
            app = self.app_name,
            sev = self.severity,
            msg = escape_delimiters(&self.message),
            d = FIELD_DELIMITER,
        )
    }
}

/// Replace every field delimiter in `message` with the placeholder. Lossy.
pub fn escape_delimiters(message: &str) -> String {
    message.replace(FIELD_DELIMITER, &DELIMITER_PLACEHOLDER.to_string())
}
