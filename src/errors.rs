//! Error handling for logdumper
//!
//! Registration errors are returned to the caller. Write errors never are:
//! they travel to a [`FailureReporter`](crate::reporter::FailureReporter)
//! wrapped in a [`WriteFailure`](crate::reporter::WriteFailure).

use thiserror::Error;

/// Main error type for logdumper
#[derive(Error, Debug)]
pub enum LogDumperError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Registration rejected for {name:?}: {reason}")]
    Registration { name: String, reason: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No application registered: {message}")]
    NotRegistered { message: String },

    #[error("No tokio runtime available")]
    NoRuntime {
        #[source]
        source: tokio::runtime::TryCurrentError,
    },

    #[error("Background writer unavailable for {app}")]
    WriterClosed { app: String },
}

/// Type alias for Result with LogDumperError
pub type LogResult<T> = Result<T, LogDumperError>;

impl LogDumperError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a registration error for a rejected application name
    pub fn registration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn not_registered(message: impl Into<String>) -> Self {
        Self::NotRegistered {
            message: message.into(),
        }
    }

    /// Create an error for construction outside a tokio runtime
    pub fn no_runtime(source: tokio::runtime::TryCurrentError) -> Self {
        Self::NoRuntime { source }
    }

    pub fn writer_closed(app: impl Into<String>) -> Self {
        Self::WriterClosed { app: app.into() }
    }
}

/// Convert from std::io errors
impl From<std::io::Error> for LogDumperError {
    fn from(err: std::io::Error) -> Self {
        LogDumperError::io("io_operation", err)
    }
}

/// Convert from figment errors
impl From<figment::Error> for LogDumperError {
    fn from(err: figment::Error) -> Self {
        LogDumperError::config(err.to_string())
    }
}
