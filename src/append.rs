//! Locked appends to a shared log file
//!
//! Every append takes an exclusive OS-level lock on the whole file, so writers
//! in this process and in other processes never interleave bytes within a line.
//! The lock belongs to [`LockedLogFile`] and is released when it drops, on
//! success and failure alike.

use crate::errors::{LogDumperError, LogResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Terminator appended after every line.
pub const LINE_TERMINATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// An open log file holding an exclusive lock for its lifetime.
pub struct LockedLogFile {
    file: File,
    path: PathBuf,
}

impl LockedLogFile {
    /// Open an existing log file and block until the exclusive lock is granted.
    ///
    /// The file is never created here; a missing file means the handle is stale.
    pub fn acquire(path: &Path) -> LogResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| LogDumperError::io(format!("opening {}", path.display()), e))?;

        trace!(path = %path.display(), "waiting for exclusive lock");
        file.lock()
            .map_err(|e| LogDumperError::io(format!("locking {}", path.display()), e))?;
        trace!(path = %path.display(), "exclusive lock held");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Append one line plus terminator and flush it to durable storage.
    pub fn append_line(&mut self, line: &str) -> LogResult<()> {
        let mut buf = String::with_capacity(line.len() + LINE_TERMINATOR.len());
        buf.push_str(line);
        buf.push_str(LINE_TERMINATOR);

        // One write_all per line; the lock keeps it contiguous.
        self.file
            .write_all(buf.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data())
            .map_err(|e| LogDumperError::io(format!("appending to {}", self.path.display()), e))
    }
}

impl Drop for LockedLogFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            // Closing the descriptor releases the lock anyway.
            warn!(path = %self.path.display(), error = %e, "explicit unlock failed");
        }
    }
}

/// Lock `path`, append `line`, flush, unlock.
pub fn append_locked(path: &Path, line: &str) -> LogResult<()> {
    let mut locked = LockedLogFile::acquire(path)?;
    locked.append_line(line)
}
