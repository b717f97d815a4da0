//! Record checksums
//!
//! CRC-32/ISO-HDLC, the "IEEE" CRC used by zlib, gzip and PNG:
//!
//! | parameter      | value        |
//! |----------------|--------------|
//! | polynomial     | `0x04C11DB7` (reflected `0xEDB88320`) |
//! | initial value  | `0xFFFFFFFF` |
//! | reflect in/out | yes          |
//! | final XOR      | `0xFFFFFFFF` |
//! | check value    | `0xCBF43926` for `b"123456789"` |
//!
//! Computed with `crc32fast`, which implements exactly this table-driven
//! algorithm (with SIMD acceleration where available). This is an integrity
//! check against accidental corruption, not a MAC.

/// CRC-32 of `bytes`. Total over any input; the empty slice yields `0`.
#[inline]
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
