//! Asynchronous append engine
//!
//! `info` and `error` capture the timestamp on the caller's thread, then hand
//! the record to a background unit and return. The background unit formats
//! the line, takes the exclusive file lock, appends, flushes and unlocks.
//! Failures never reach the caller; they go to the handle's
//! [`FailureReporter`].
//!
//! Two dispatch modes exist:
//! - [`DispatchMode::Concurrent`] spawns one blocking task per call. Lines from
//!   different calls may land in any order; timestamps still record call order.
//! - [`DispatchMode::Ordered`] feeds one writer task per logger through a
//!   channel so lines land in call order.

use crate::append::append_locked;
use crate::config::DispatchMode;
use crate::errors::LogDumperError;
use crate::record::{LogRecord, Severity};
use crate::registry::LoggerHandle;
use crate::reporter::{FailureReporter, WriteFailure};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, trace, warn};

/// State shared by a logger and its background units.
struct Shared {
    handle: LoggerHandle,
    timestamp_format: String,
    reporter: Arc<dyn FailureReporter>,
    in_flight: AtomicUsize,
    idle: Notify,
}

impl Shared {
    /// Runs on the background unit: FORMATTING -> LOCK_WAIT -> WRITING -> DONE | FAILED.
    fn write(&self, record: LogRecord) {
        let line = record.to_line();
        trace!(app = %self.handle.app_name(), severity = %record.severity, "formatted");

        match append_locked(self.handle.file_path(), &line) {
            Ok(()) => trace!(app = %self.handle.app_name(), "written"),
            Err(error) => self.fail(record, error),
        }
    }

    fn fail(&self, record: LogRecord, error: LogDumperError) {
        debug!(app = %self.handle.app_name(), error = %error, "write failed");
        self.reporter.report(WriteFailure {
            app_name: record.app_name,
            file_path: Some(self.handle.file_path().to_path_buf()),
            severity: Some(record.severity),
            timestamp: record.timestamp,
            error,
        });
    }
}

/// Marks one submitted call as outstanding until dropped.
///
/// Dropping covers completion, failure, and a task the runtime discarded unrun.
struct Pending(Arc<Shared>);

impl Pending {
    fn start(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        Pending(shared.clone())
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

enum Dispatcher {
    Concurrent(Handle),
    Ordered(mpsc::UnboundedSender<(LogRecord, Pending)>),
}

/// A registered application's logger.
///
/// Cloning is cheap and clones share the same file, reporter and dispatcher.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    dispatcher: Arc<Dispatcher>,
}

impl Logger {
    pub(crate) fn spawn(
        handle: LoggerHandle,
        timestamp_format: String,
        mode: DispatchMode,
        reporter: Arc<dyn FailureReporter>,
        runtime: &Handle,
    ) -> Self {
        let shared = Arc::new(Shared {
            handle,
            timestamp_format,
            reporter,
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
        });

        let dispatcher = match mode {
            DispatchMode::Concurrent => Dispatcher::Concurrent(runtime.clone()),
            DispatchMode::Ordered => {
                let (tx, rx) = mpsc::unbounded_channel();
                runtime.spawn(ordered_writer(shared.clone(), rx));
                Dispatcher::Ordered(tx)
            }
        };

        Logger {
            shared,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn handle(&self) -> &LoggerHandle {
        &self.shared.handle
    }

    /// Log an informational message. Returns immediately.
    pub fn info(&self, message: impl Into<String>) {
        self.submit(Severity::Info, message)
    }

    /// Log an error message. Returns immediately.
    pub fn error(&self, message: impl Into<String>) {
        self.submit(Severity::Error, message)
    }

    /// Capture a record now and queue it for a background write.
    pub fn submit(&self, severity: Severity, message: impl Into<String>) {
        let record = LogRecord::capture(
            self.shared.handle.app_name(),
            severity,
            message,
            &self.shared.timestamp_format,
        );
        trace!(app = %record.app_name, timestamp = %record.timestamp, "called");

        let pending = Pending::start(&self.shared);
        match self.dispatcher.as_ref() {
            Dispatcher::Concurrent(runtime) => {
                let shared = self.shared.clone();
                runtime.spawn_blocking(move || {
                    let _pending = pending;
                    shared.write(record);
                });
            }
            Dispatcher::Ordered(tx) => {
                if let Err(mpsc::error::SendError((record, _pending))) = tx.send((record, pending)) {
                    let app = self.shared.handle.app_name().to_string();
                    self.shared.fail(record, LogDumperError::writer_closed(app));
                }
            }
        }
    }

    /// Number of submitted calls that have not reached DONE or FAILED.
    pub fn pending(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every call submitted so far has been written or reported.
    pub async fn flush(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("handle", &self.shared.handle)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Single writer for one logger in ordered mode. Ends when every clone of the logger is gone.
async fn ordered_writer(shared: Arc<Shared>, mut rx: mpsc::UnboundedReceiver<(LogRecord, Pending)>) {
    while let Some((record, pending)) = rx.recv().await {
        let writer = shared.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let _pending = pending;
            writer.write(record);
        })
        .await;

        if let Err(e) = joined {
            warn!(app = %shared.handle.app_name(), error = %e, "ordered write task aborted");
        }
    }
    debug!(app = %shared.handle.app_name(), "ordered writer stopped");
}
