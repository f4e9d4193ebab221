//! Diagnostic side channel for failed background writes
//!
//! A failed write drops its message; the failure itself is handed to a
//! [`FailureReporter`] so the host can observe it without the log call ever
//! returning an error.

use crate::errors::LogDumperError;
use crate::record::Severity;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::error;

/// A single dropped log call or failed registration.
#[derive(Debug)]
pub struct WriteFailure {
    pub app_name: String,
    pub file_path: Option<PathBuf>,
    /// `None` when the failure came from registration rather than a log call
    pub severity: Option<Severity>,
    pub timestamp: String,
    pub error: LogDumperError,
}

/// Receives failures from background writers.
///
/// Implementations run on the background unit and must not panic.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: WriteFailure);
}

/// Default reporter: emits each failure as a `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: WriteFailure) {
        error!(
            app = %failure.app_name,
            path = ?failure.file_path,
            severity = ?failure.severity,
            timestamp = %failure.timestamp,
            error = %failure.error,
            "log write dropped"
        );
    }
}

/// Forwards failures into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: UnboundedSender<WriteFailure>,
}

impl ChannelReporter {
    pub fn new() -> (Self, UnboundedReceiver<WriteFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FailureReporter for ChannelReporter {
    fn report(&self, failure: WriteFailure) {
        if let Err(mpsc::error::SendError(lost)) = self.tx.send(failure) {
            // Receiver is gone; fall back to tracing so the failure is not silent.
            TracingReporter.report(lost);
        }
    }
}
