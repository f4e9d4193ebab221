//! Library root for the `logdumper` crate
//!
//! Asynchronous, lock-serialized, per-application file logging.

// Core error handling
pub mod errors;

// Configuration
pub mod config;

// Records and line format
pub mod record;

// Locked file appends
pub mod append;

// Failure side channel
pub mod reporter;

// Registration and the async engine
pub mod engine;
pub mod registry;

// Register-then-log facade
pub mod dumper;

// CLI
pub mod cli;

pub use config::{load_config, DispatchMode, LogConfig};
pub use dumper::{DefaultLogDumper, LogDumper};
pub use engine::Logger;
pub use errors::{LogDumperError, LogResult};
pub use record::{LogRecord, Severity};
pub use registry::{LoggerHandle, Registry};
pub use reporter::{ChannelReporter, FailureReporter, TracingReporter, WriteFailure};
