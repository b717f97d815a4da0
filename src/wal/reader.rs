//! Log Reader
//!
//! Handles reading records back from the log file.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};

use crate::error::Result;

use super::frame::{FrameCursor, Step};
use super::{LogFile, Record, StopReason};

/// Reads valid records from the start of a [`LogFile`]
///
/// Applies the same validation as the recovery scanner and ends at the
/// logical end of the log. A torn tail is never yielded; call
/// [`stop_reason`](Self::stop_reason) after iteration to find out whether
/// one was there.
pub struct RecordReader<'a> {
    cursor: FrameCursor<BufReader<&'a mut File>>,
    stop_reason: Option<StopReason>,
}

impl<'a> RecordReader<'a> {
    pub(super) fn new(log: &'a mut LogFile) -> Result<Self> {
        let len = log.file.metadata()?.len();
        let max_record_size = log.config.max_record_size;
        log.file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            cursor: FrameCursor::new(BufReader::new(&mut log.file), len, max_record_size),
            stop_reason: None,
        })
    }

    /// Read the next record, or `None` at the logical end
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        match self.cursor.step()? {
            Step::Frame(record) => Ok(Some(record)),
            Step::End => Ok(None),
            Step::Stop(reason) => {
                self.stop_reason = Some(reason);
                Ok(None)
            }
        }
    }

    /// Offset just past the last record returned
    pub fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// Why reading ended before the physical end, if it did
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
