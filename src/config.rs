//! Configuration for tornlog
//!
//! Centralized configuration with sensible defaults.

use crate::error::{LogError, Result};
use crate::wal::DEFAULT_MAX_RECORD_SIZE;

/// Configuration for a [`LogFile`](crate::wal::LogFile)
#[derive(Debug, Clone)]
pub struct LogConfig {
    // -------------------------------------------------------------------------
    // Framing
    // -------------------------------------------------------------------------
    /// Largest payload accepted by the appender and trusted by the scanner.
    /// Both sides use this one bound.
    pub max_record_size: u32,

    // -------------------------------------------------------------------------
    // Durability
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync after appends
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Open behaviour
    // -------------------------------------------------------------------------
    /// Scan and truncate any torn tail when the log is opened
    pub recover_on_open: bool,

    /// Take an exclusive advisory lock on the log file for the handle's lifetime
    pub advisory_lock: bool,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Flush user-space buffers only; the OS decides when data hits disk
    Flush,

    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N appends (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            sync_strategy: SyncStrategy::EveryWrite,
            recover_on_open: true,
            advisory_lock: false,
        }
    }
}

impl LogConfig {
    /// Create a new config builder
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Check the config for values the log cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.max_record_size == 0 {
            return Err(LogError::Config(
                "max_record_size must be greater than zero".to_string(),
            ));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(LogError::Config(
                "EveryNEntries sync count must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    /// Set the shared maximum record size (in bytes)
    pub fn max_record_size(mut self, size: u32) -> Self {
        self.config.max_record_size = size;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Enable or disable recovery when opening the log
    pub fn recover_on_open(mut self, enabled: bool) -> Self {
        self.config.recover_on_open = enabled;
        self
    }

    /// Enable or disable the cross-process advisory lock
    pub fn advisory_lock(mut self, enabled: bool) -> Self {
        self.config.advisory_lock = enabled;
        self
    }

    pub fn build(self) -> Result<LogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
