//! Error types for tornlog
//!
//! Provides a unified error type for all operations. Torn tails and checksum
//! mismatches found while scanning are *not* errors; they are reported in the
//! [`ScanResult`](crate::wal::ScanResult).

use std::path::PathBuf;

use thiserror::Error;

use crate::wal::ScanResult;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Unified error type for tornlog operations
#[derive(Debug, Error)]
pub enum LogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Append Errors
    // -------------------------------------------------------------------------
    #[error("Log write failed at offset {offset}: {source}")]
    Write {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to append an empty record")]
    EmptyRecord,

    #[error("Record of {length} bytes exceeds maximum record size {max}")]
    RecordTooLarge { length: usize, max: u32 },

    #[error("Log has an unrecovered failed write; run recovery before appending")]
    NeedsRecovery,

    // -------------------------------------------------------------------------
    // Recovery Errors
    // -------------------------------------------------------------------------
    #[error("Failed to truncate log to {offset} bytes: {source}")]
    TruncateFailed {
        offset: u64,
        /// The scan that produced `offset`; still valid after the failure.
        scan: ScanResult,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan is stale: log was {scanned} bytes when scanned, now {current}")]
    StaleScan { scanned: u64, current: u64 },

    // -------------------------------------------------------------------------
    // Ownership Errors
    // -------------------------------------------------------------------------
    #[error("Log {} is already open in this process", .0.display())]
    AlreadyOpen(PathBuf),

    #[error("Log {} is locked by another process", .0.display())]
    Locked(PathBuf),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
