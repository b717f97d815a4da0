//! # tornlog
//!
//! A minimal append-only record log with:
//! - Length-prefixed, CRC-32 checksummed frames
//! - Crash recovery that removes torn or corrupt tails
//! - Single-owner log handles (one appender or scanner at a time)
//!
//! ## Architecture Overview
//!
//! ```text
//!   ┌─────────────┐
//!   │   Appender  │  append(payload)
//!   └──────┬──────┘
//!          │  [len][payload][crc]
//!          ▼
//!   ┌─────────────┐
//!   │  Log file   │  frames back to back
//!   └──────┬──────┘
//!          │  on startup / on demand
//!          ▼
//!   ┌─────────────┐         ┌─────────────┐
//!   │   Scanner   │ ──────▶ │  Truncate   │  set_len(last_good_offset)
//!   └─────────────┘         └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tornlog::{LogConfig, LogFile};
//!
//! # fn main() -> tornlog::Result<()> {
//! let mut log = LogFile::open("events.log", LogConfig::default())?;
//! log.append(b"hello")?;
//!
//! let scan = log.scan()?;
//! assert!(scan.is_clean);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod checksum;

pub mod wal;
pub mod testing;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogError, Result};
pub use config::{LogConfig, SyncStrategy};
pub use checksum::checksum;
pub use wal::{LogFile, RecoveryReport, ScanResult, StopReason};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tornlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
