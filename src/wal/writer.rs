//! Log Appender
//!
//! Handles appending records to the log file.

use std::io::{self, Seek, SeekFrom, Write};

use tracing::{debug, warn};

use crate::config::SyncStrategy;
use crate::error::{LogError, Result};

use super::{encode_frame, LogFile};

/// Appends records to a [`LogFile`]
///
/// Records land in call order, each fully written before `append` returns.
/// The file only ever grows; nothing already written is rewritten.
pub struct Appender<'a> {
    log: &'a mut LogFile,
}

impl<'a> Appender<'a> {
    pub(super) fn new(log: &'a mut LogFile) -> Self {
        Self { log }
    }

    /// Append one record and return the offset of its frame
    ///
    /// The payload must be non-empty and no larger than the configured
    /// `max_record_size`; violations are rejected before any byte is written.
    ///
    /// On a write or sync failure the last frame may be absent, partial or
    /// whole on disk. Earlier records are untouched. The log is then marked
    /// as needing recovery and further appends fail with
    /// [`LogError::NeedsRecovery`] until [`LogFile::recover`] runs.
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        if self.log.needs_recovery {
            return Err(LogError::NeedsRecovery);
        }

        let max = self.log.config.max_record_size;
        if payload.is_empty() {
            return Err(LogError::EmptyRecord);
        }
        if payload.len() > max as usize {
            return Err(LogError::RecordTooLarge {
                length: payload.len(),
                max,
            });
        }

        let frame = encode_frame(payload)?;
        let offset = self.log.size;

        match self.write_frame(&frame) {
            Ok(start) => {
                self.log.size = start + frame.len() as u64;
                debug!(offset = start, length = payload.len(), "appended record");
                Ok(start)
            }
            Err(source) => {
                self.log.needs_recovery = true;
                warn!(offset, error = %source, "append failed; log needs recovery");
                Err(LogError::Write { offset, source })
            }
        }
    }

    /// Number of appends not yet covered by an fsync
    pub fn unsynced(&self) -> usize {
        self.log.unsynced
    }

    /// One `write_all` per frame, then the durability barrier
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<u64> {
        let file = &mut self.log.file;
        let start = file.seek(SeekFrom::End(0))?;
        file.write_all(frame)?;
        file.flush()?;
        self.barrier()?;
        Ok(start)
    }

    fn barrier(&mut self) -> io::Result<()> {
        match self.log.config.sync_strategy {
            SyncStrategy::Flush => {}
            SyncStrategy::EveryWrite => self.log.file.sync_data()?,
            SyncStrategy::EveryNEntries { count } => {
                self.log.unsynced += 1;
                if self.log.unsynced >= count {
                    self.log.file.sync_data()?;
                    self.log.unsynced = 0;
                }
            }
        }
        Ok(())
    }
}
