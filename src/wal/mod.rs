//! Append-only Log Module
//!
//! Durable record log with torn-tail recovery.
//!
//! ## Responsibilities
//! - Append checksummed records, one complete frame at a time
//! - Detect torn or corrupt tails after a crash
//! - Truncate the log back to its last valid record
//! - Single owner per log file
//!
//! ## File Format
//! No header, no footer, no padding: the log is just frames back to back.
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Frame 1                                 │
//! │ ┌──────────┬──────────────┬───────────┐ │
//! │ │ Len (4)  │ Payload (Len)│ CRC32 (4) │ │
//! │ └──────────┴──────────────┴───────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Frame 2                                 │
//! │ ┌──────────┬──────────────┬───────────┐ │
//! │ │ Len (4)  │ Payload (Len)│ CRC32 (4) │ │
//! │ └──────────┴──────────────┴───────────┘ │
//! ├─────────────────────────────────────────┤
//! │ (torn tail, removed by recovery)        │
//! └─────────────────────────────────────────┘
//! ```
//! Both integers are big-endian. The CRC covers the payload only.

mod frame;
mod handle;
mod writer;
mod reader;
mod recovery;

pub use frame::{
    encode_frame, frame_len, Record, StopReason, CHECKSUM_FIELD_SIZE, DEFAULT_MAX_RECORD_SIZE,
    FRAME_OVERHEAD, LENGTH_FIELD_SIZE,
};
pub use handle::LogFile;
pub use writer::Appender;
pub use reader::RecordReader;
pub use recovery::{scan_source, RecoveryReport, ScanResult, Scanner};
