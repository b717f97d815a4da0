//! Owned log handle
//!
//! A [`LogFile`] is the single owner of one log file within the process.
//! Appending, scanning and reading all borrow it mutably, so an
//! [`Appender`] and a [`Scanner`] for the same log can never coexist.
//! Opening the same path twice in one process is refused at runtime;
//! cross-process exclusion is opt-in through an advisory lock.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::{const_mutex, Mutex};
use tracing::{debug, warn};

use crate::config::LogConfig;
use crate::error::{LogError, Result};

use super::{Appender, RecordReader, RecoveryReport, ScanResult, Scanner};

/// Canonical paths of every log currently open in this process
static OPEN_LOGS: Mutex<Vec<PathBuf>> = const_mutex(Vec::new());

/// Keeps a path in [`OPEN_LOGS`] until dropped
#[derive(Debug)]
struct Registration {
    path: PathBuf,
}

impl Registration {
    fn acquire(path: PathBuf) -> Result<Self> {
        let mut open = OPEN_LOGS.lock();
        if open.contains(&path) {
            return Err(LogError::AlreadyOpen(path));
        }
        open.push(path.clone());
        Ok(Self { path })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        OPEN_LOGS.lock().retain(|p| p != &self.path);
    }
}

/// An open append-only log
///
/// Created on first open, never deleted. See the [module docs](self) for the
/// ownership rules.
#[derive(Debug)]
pub struct LogFile {
    /// File handle; also carries the advisory lock when one is taken
    pub(super) file: File,

    /// Physical size as last observed by this handle
    pub(super) size: u64,

    /// Set after a failed write or a torn scan; cleared by truncation
    pub(super) needs_recovery: bool,

    /// Appends since the last fsync (EveryNEntries strategy)
    pub(super) unsynced: usize,

    pub(super) config: LogConfig,

    path: PathBuf,
    _registration: Registration,
}

impl LogFile {
    /// Open or create a log file
    ///
    /// On open:
    /// 1. Create the file if missing
    /// 2. Register the canonical path (fails if already open here)
    /// 3. Take the advisory lock if configured
    /// 4. Recover a torn tail if configured
    pub fn open(path: impl AsRef<Path>, config: LogConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LogError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let canonical = path.canonicalize().map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let registration = Registration::acquire(canonical.clone())?;

        if config.advisory_lock && FileExt::try_lock_exclusive(&file).is_err() {
            return Err(LogError::Locked(canonical));
        }

        let size = file.metadata()?.len();
        debug!(path = %canonical.display(), size, "opened log");

        let mut log = Self {
            file,
            size,
            needs_recovery: false,
            unsynced: 0,
            config,
            path: canonical,
            _registration: registration,
        };

        if log.config.recover_on_open {
            log.recover()?;
        }

        Ok(log)
    }

    /// Canonical path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Physical size in bytes as last observed by this handle
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True if a failed write or torn scan must be cleaned up before appending
    pub fn needs_recovery(&self) -> bool {
        self.needs_recovery
    }

    /// Borrow the log for writing
    pub fn appender(&mut self) -> Appender<'_> {
        Appender::new(self)
    }

    /// Borrow the log for scanning and truncation
    pub fn scanner(&mut self) -> Scanner<'_> {
        Scanner::new(self)
    }

    /// Borrow the log for reading records from the start
    pub fn reader(&mut self) -> Result<RecordReader<'_>> {
        RecordReader::new(self)
    }

    /// Append one record; see [`Appender::append`]
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        self.appender().append(payload)
    }

    /// Scan without modifying; see [`Scanner::scan`]
    pub fn scan(&mut self) -> Result<ScanResult> {
        self.scanner().scan()
    }

    /// Cut the log back to a scan's logical end; see [`Scanner::truncate`]
    pub fn truncate(&mut self, scan: &ScanResult) -> Result<u64> {
        self.scanner().truncate(scan)
    }

    /// Scan, then truncate if the tail is torn; see [`Scanner::recover`]
    pub fn recover(&mut self) -> Result<RecoveryReport> {
        self.scanner().recover()
    }

    /// Force everything appended so far to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.unsynced = 0;
        Ok(())
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        if self.unsynced > 0 {
            if let Err(e) = self.file.sync_data() {
                warn!(path = %self.path.display(), error = %e, "final log sync failed");
            }
        }
        if self.config.advisory_lock {
            // Closing the descriptor releases the lock as well
            let _ = FileExt::unlock(&self.file);
        }
        debug!(path = %self.path.display(), size = self.size, "closed log");
    }
}
