//! Log Recovery
//!
//! Finds the logical end of a log after an unclean shutdown and cuts off the
//! torn tail behind it.
//!
//! ## Algorithm
//! A single forward pass from offset 0. At each frame boundary:
//! 1. Nothing left: clean end. Fewer than 4 bytes left: torn length field.
//! 2. Length of 0 or above `max_record_size`: implausible, stop here.
//! 3. `4 + length + 4` bytes not all present: partial frame, stop here.
//! 4. Stored checksum differs from the payload's: corrupt frame, stop here.
//! 5. Otherwise count the record and move past it.
//!
//! ## Limitation
//! The scan stops at the *first* bad frame and never looks for a plausible
//! frame beyond it. Damage is assumed to be a contiguous suffix of the file,
//! which is what an interrupted append produces. A bit flip in the middle of
//! the log therefore ends the logical log there, and recovery discards every
//! later record even if its bytes are intact.

use std::io::{BufReader, Read, Seek, SeekFrom};

use tracing::{debug, error, info, warn};

use crate::error::{LogError, Result};

use super::frame::{FrameCursor, Step};
use super::{LogFile, StopReason};

/// Outcome of scanning a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Number of valid records before the logical end
    pub good_record_count: u64,

    /// Offset just past the last valid frame (the logical end)
    pub last_good_offset: u64,

    /// The scan ended exactly at the physical end on a frame boundary
    pub is_clean: bool,

    /// Physical size of the log when it was scanned
    pub file_size: u64,

    /// Why the scan stopped early; `None` when clean
    pub stop_reason: Option<StopReason>,
}

impl ScanResult {
    /// Bytes past the logical end that truncation would remove
    pub fn torn_bytes(&self) -> u64 {
        self.file_size - self.last_good_offset
    }
}

/// Outcome of [`Scanner::recover`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub scan: ScanResult,

    /// Bytes cut from the end of the file (0 when the scan was clean)
    pub bytes_removed: u64,
}

impl RecoveryReport {
    /// True if the file was modified
    pub fn was_truncated(&self) -> bool {
        self.bytes_removed > 0
    }
}

/// Scan `len` bytes of `source`, starting at its beginning.
///
/// Works on anything seekable; [`Scanner::scan`] uses it on the log file.
/// I/O errors are returned as-is; torn or corrupt frames are not errors and
/// show up in the result instead.
pub fn scan_source<R: Read + Seek>(
    mut source: R,
    len: u64,
    max_record_size: u32,
) -> std::io::Result<ScanResult> {
    source.seek(SeekFrom::Start(0))?;
    let mut cursor = FrameCursor::new(BufReader::new(source), len, max_record_size);
    let mut good_record_count = 0u64;

    let stop_reason = loop {
        match cursor.step()? {
            Step::Frame(record) => {
                good_record_count += 1;
                debug!(
                    offset = record.offset,
                    length = record.payload.len(),
                    "valid record"
                );
            }
            Step::End => break None,
            Step::Stop(reason) => {
                debug!(offset = cursor.offset(), %reason, "scan stopped");
                break Some(reason);
            }
        }
    };

    Ok(ScanResult {
        good_record_count,
        last_good_offset: cursor.offset(),
        is_clean: stop_reason.is_none(),
        file_size: len,
        stop_reason,
    })
}

/// Scans and repairs a [`LogFile`]
///
/// Must only run on a quiesced log. Holding the `&mut LogFile` guarantees no
/// appender exists for it in this process.
pub struct Scanner<'a> {
    log: &'a mut LogFile,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(log: &'a mut LogFile) -> Self {
        Self { log }
    }

    /// Validate the log from the start without modifying it
    pub fn scan(&mut self) -> Result<ScanResult> {
        let file_size = self.log.file.metadata()?.len();
        let result = scan_source(
            &mut self.log.file,
            file_size,
            self.log.config.max_record_size,
        )?;

        self.log.size = file_size;
        self.log.needs_recovery = !result.is_clean;
        Ok(result)
    }

    /// Resize the log to `scan.last_good_offset` and return the bytes removed
    ///
    /// `scan` must describe the log as it is now: if the size changed since
    /// it was taken, [`LogError::StaleScan`] is returned and nothing is cut.
    ///
    /// Idempotent: a log already at (or below) that size is left alone. On
    /// failure the returned [`LogError::TruncateFailed`] still carries `scan`,
    /// and the log keeps its torn tail until a later truncation succeeds.
    pub fn truncate(&mut self, scan: &ScanResult) -> Result<u64> {
        let offset = scan.last_good_offset;
        let current = self.log.file.metadata()?.len();
        if scan.file_size != current {
            warn!(
                scanned = scan.file_size,
                current, "refusing to truncate with a stale scan"
            );
            return Err(LogError::StaleScan {
                scanned: scan.file_size,
                current,
            });
        }
        if offset >= current {
            return Ok(0);
        }

        let resized = self
            .log
            .file
            .set_len(offset)
            .and_then(|_| self.log.file.sync_all());

        if let Err(source) = resized {
            error!(offset, error = %source, "truncate failed; log still has a torn tail");
            return Err(LogError::TruncateFailed {
                offset,
                scan: scan.clone(),
                source,
            });
        }

        self.log.size = offset;
        self.log.needs_recovery = false;
        Ok(current - offset)
    }

    /// Scan, then truncate if the scan was not clean
    pub fn recover(&mut self) -> Result<RecoveryReport> {
        let scan = self.scan()?;

        if scan.is_clean {
            info!(
                records = scan.good_record_count,
                size = scan.file_size,
                "log clean, no recovery needed"
            );
            return Ok(RecoveryReport {
                scan,
                bytes_removed: 0,
            });
        }

        match scan.stop_reason {
            Some(reason) if reason.is_corruption() => warn!(
                offset = scan.last_good_offset,
                %reason,
                "corrupt record in log, discarding tail"
            ),
            Some(reason) => warn!(
                offset = scan.last_good_offset,
                %reason,
                "torn tail in log"
            ),
            None => {}
        }

        let bytes_removed = self.truncate(&scan)?;
        info!(
            records = scan.good_record_count,
            offset = scan.last_good_offset,
            bytes_removed,
            "log recovered"
        );

        Ok(RecoveryReport {
            scan,
            bytes_removed,
        })
    }
}
