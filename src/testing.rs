//! Crash simulation helpers
//!
//! Damage a log file in the ways a crash or bad disk would. These open the
//! file directly and bypass [`LogFile`](crate::wal::LogFile) ownership, so
//! only use them on logs that are not open.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::info;

use crate::error::{LogError, Result};

/// Cut `bytes` from the end of the file, returning `(old_size, new_size)`.
///
/// If `bytes` is not smaller than the file, half of the file is cut instead
/// so something is always left to recover.
pub fn cut_tail(path: &Path, bytes: u64) -> Result<(u64, u64)> {
    let file = OpenOptions::new().write(true).open(path)?;
    let old_size = file.metadata()?.len();

    let cut = if bytes >= old_size { old_size / 2 } else { bytes };
    let new_size = old_size - cut;

    info!(cut, old_size, new_size, "cutting log tail");
    file.set_len(new_size)?;
    file.sync_all()?;
    Ok((old_size, new_size))
}

/// Flip bit `bit` (0 = least significant) of the byte at `offset`
pub fn flip_bit(path: &Path, offset: u64, bit: u8) -> Result<()> {
    if bit > 7 {
        return Err(LogError::Config(format!("bit index {} out of range 0..=7", bit)));
    }

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let mut byte = [0u8; 1];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut byte)?;

    byte[0] ^= 1 << bit;
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(&byte)?;
    file.sync_all()?;

    info!(offset, bit, "flipped bit");
    Ok(())
}
