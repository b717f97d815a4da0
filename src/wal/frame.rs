//! Record framing
//!
//! Encodes payloads into frames and walks a byte source frame by frame,
//! validating each one. Both the recovery scanner and the record reader are
//! built on [`FrameCursor`], so they agree exactly on what a valid frame is.

use std::fmt;
use std::io::{self, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::checksum;
use crate::error::{LogError, Result};

/// Size of the big-endian length prefix
pub const LENGTH_FIELD_SIZE: u64 = 4;

/// Size of the big-endian checksum suffix
pub const CHECKSUM_FIELD_SIZE: u64 = 4;

/// Bytes a frame adds around its payload
pub const FRAME_OVERHEAD: u64 = LENGTH_FIELD_SIZE + CHECKSUM_FIELD_SIZE;

/// Default plausibility bound on payload length (32 MiB)
pub const DEFAULT_MAX_RECORD_SIZE: u32 = 32 * 1024 * 1024;

/// On-disk size of a frame carrying `payload_len` bytes
#[inline]
pub fn frame_len(payload_len: u32) -> u64 {
    FRAME_OVERHEAD + payload_len as u64
}

/// Encode `payload` as `[length][payload][checksum]`, big-endian.
///
/// Fails only if the payload does not fit the 32-bit length field; the
/// configured record bound is enforced by the appender.
pub fn encode_frame(payload: &[u8]) -> Result<Bytes> {
    let length = u32::try_from(payload.len()).map_err(|_| LogError::RecordTooLarge {
        length: payload.len(),
        max: u32::MAX,
    })?;

    let mut buf = BytesMut::with_capacity(frame_len(length) as usize);
    buf.put_u32(length);
    buf.put_slice(payload);
    buf.put_u32(checksum(payload));
    Ok(buf.freeze())
}

/// A record read back from a valid frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Offset of the frame's length field
    pub offset: u64,

    /// Payload bytes, checksum already verified
    pub payload: Bytes,
}

impl Record {
    /// Offset immediately after this record's frame
    pub fn end_offset(&self) -> u64 {
        self.offset + FRAME_OVERHEAD + self.payload.len() as u64
    }
}

/// Why a scan stopped before the physical end of the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Fewer than four bytes left; the length field itself is torn
    IncompleteLength { available: u64 },

    /// Length field is zero or above the record bound
    ImplausibleLength { length: u32 },

    /// Length is plausible but the frame runs past end of file
    IncompleteFrame { needed: u64, available: u64 },

    /// Frame is complete but the payload does not match its checksum
    ChecksumMismatch { stored: u32, computed: u32 },
}

impl StopReason {
    /// True when the tail looks damaged rather than merely cut short.
    ///
    /// Recovery treats both the same way; this only affects diagnostics.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StopReason::ImplausibleLength { .. } | StopReason::ChecksumMismatch { .. }
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::IncompleteLength { available } => {
                write!(f, "incomplete length field ({} of 4 bytes)", available)
            }
            StopReason::ImplausibleLength { length } => {
                write!(f, "implausible record length {}", length)
            }
            StopReason::IncompleteFrame { needed, available } => {
                write!(f, "partial frame ({} of {} bytes)", available, needed)
            }
            StopReason::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored, computed
            ),
        }
    }
}

/// Outcome of one [`FrameCursor::step`]
#[derive(Debug)]
pub(crate) enum Step {
    /// A valid frame
    Frame(Record),

    /// Physical end of the log, exactly on a frame boundary
    End,

    /// The frame at the cursor's offset is invalid; nothing past it is read
    Stop(StopReason),
}

#[derive(Debug, Clone, Copy)]
enum CursorState {
    Running,
    Ended,
    Stopped(StopReason),
    Failed,
}

/// Sequential frame walker over a source positioned at offset 0.
///
/// `len` is the physical size of the source. The cursor never reads past it
/// and never resynchronizes past an invalid frame: once it stops, every
/// further `step` repeats the same outcome. After an I/O error the source
/// position is unknown and every further `step` fails.
pub(crate) struct FrameCursor<R> {
    source: R,
    len: u64,
    offset: u64,
    max_record_size: u32,
    state: CursorState,
}

impl<R: Read> FrameCursor<R> {
    pub(crate) fn new(source: R, len: u64, max_record_size: u32) -> Self {
        Self {
            source,
            len,
            offset: 0,
            max_record_size,
            state: CursorState::Running,
        }
    }

    /// Offset just past the last valid frame returned so far
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn step(&mut self) -> io::Result<Step> {
        match self.state {
            CursorState::Ended => return Ok(Step::End),
            CursorState::Stopped(reason) => return Ok(Step::Stop(reason)),
            CursorState::Failed => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "frame cursor lost its position after an I/O error",
                ))
            }
            CursorState::Running => {}
        }

        let step = self.read_frame().map_err(|e| {
            self.state = CursorState::Failed;
            e
        })?;
        match &step {
            Step::Frame(record) => self.offset = record.end_offset(),
            Step::End => self.state = CursorState::Ended,
            Step::Stop(reason) => self.state = CursorState::Stopped(*reason),
        }
        Ok(step)
    }

    fn read_frame(&mut self) -> io::Result<Step> {
        let available = self.len.saturating_sub(self.offset);
        if available == 0 {
            return Ok(Step::End);
        }
        if available < LENGTH_FIELD_SIZE {
            return Ok(Step::Stop(StopReason::IncompleteLength { available }));
        }

        let mut field = [0u8; 4];
        self.source.read_exact(&mut field)?;
        let length = u32::from_be_bytes(field);
        if length == 0 || length > self.max_record_size {
            return Ok(Step::Stop(StopReason::ImplausibleLength { length }));
        }

        let needed = frame_len(length);
        if needed > available {
            return Ok(Step::Stop(StopReason::IncompleteFrame { needed, available }));
        }

        let mut payload = vec![0u8; length as usize];
        self.source.read_exact(&mut payload)?;
        self.source.read_exact(&mut field)?;

        let stored = u32::from_be_bytes(field);
        let computed = checksum(&payload);
        if stored != computed {
            return Ok(Step::Stop(StopReason::ChecksumMismatch { stored, computed }));
        }

        Ok(Step::Frame(Record {
            offset: self.offset,
            payload: Bytes::from(payload),
        }))
    }
}
