//! Tests for the record reader
//!
//! These tests verify:
//! - Records come back in append order with their offsets
//! - Torn tails are never yielded
//! - Reader and scanner agree on the logical end

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tornlog::wal::{frame_len, LogFile};
use tornlog::{LogConfig, StopReason};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.log");
    (temp_dir, log_path)
}

fn manual_config() -> LogConfig {
    LogConfig::builder().recover_on_open(false).build().unwrap()
}

fn append_all(path: &PathBuf, payloads: &[&[u8]]) {
    let mut log = LogFile::open(path, LogConfig::default()).unwrap();
    for p in payloads {
        log.append(p).unwrap();
    }
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_read_empty_log() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, LogConfig::default()).unwrap();

    let mut reader = log.reader().unwrap();

    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.stop_reason(), None);
    assert_eq!(reader.offset(), 0);
}

#[test]
fn test_read_records_in_order() {
    let (_temp, log_path) = setup_temp_log();
    append_all(&log_path, &[b"alpha", b"beta", b"gamma"]);

    let mut log = LogFile::open(&log_path, LogConfig::default()).unwrap();
    let records: Vec<_> = log.reader().unwrap().collect::<Result<_, _>>().unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(&records[0].payload[..], b"alpha");
    assert_eq!(&records[1].payload[..], b"beta");
    assert_eq!(&records[2].payload[..], b"gamma");

    assert_eq!(records[0].offset, 0);
    assert_eq!(records[1].offset, frame_len(5));
    assert_eq!(records[2].offset, frame_len(5) + frame_len(4));
}

#[test]
fn test_reader_stops_before_torn_tail() {
    let (_temp, log_path) = setup_temp_log();
    append_all(&log_path, &[b"kept1", b"kept2"]);

    let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(&[0, 0, 0, 20, b'x', b'y']).unwrap();
    drop(file);

    let mut log = LogFile::open(&log_path, manual_config()).unwrap();
    let mut reader = log.reader().unwrap();

    assert_eq!(&reader.next_record().unwrap().unwrap().payload[..], b"kept1");
    assert_eq!(&reader.next_record().unwrap().unwrap().payload[..], b"kept2");
    assert!(reader.next_record().unwrap().is_none());
    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(
        reader.stop_reason(),
        Some(StopReason::IncompleteFrame { needed: 28, available: 6 })
    );
    assert_eq!(reader.offset(), 2 * frame_len(5));
}

#[test]
fn test_reader_agrees_with_scanner() {
    let (_temp, log_path) = setup_temp_log();
    let payloads: Vec<Vec<u8>> = (0..25u8).map(|i| vec![i; 10 + i as usize]).collect();
    let refs: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
    append_all(&log_path, &refs);

    // Damage record 20's payload
    let mut bytes = fs::read(&log_path).unwrap();
    let offset: u64 = payloads[..20].iter().map(|p| frame_len(p.len() as u32)).sum();
    bytes[offset as usize + 6] ^= 0xFF;
    fs::write(&log_path, &bytes).unwrap();

    let mut log = LogFile::open(&log_path, manual_config()).unwrap();
    let read = {
        let mut reader = log.reader().unwrap();
        let mut count = 0u64;
        while reader.next_record().unwrap().is_some() {
            count += 1;
        }
        (count, reader.offset())
    };
    let scan = log.scan().unwrap();

    assert_eq!(read.0, scan.good_record_count);
    assert_eq!(read.1, scan.last_good_offset);
    assert_eq!(scan.good_record_count, 20);
    assert_eq!(scan.last_good_offset, offset);
}

#[test]
fn test_reader_then_append() {
    let (_temp, log_path) = setup_temp_log();
    append_all(&log_path, &[b"one"]);

    let mut log = LogFile::open(&log_path, LogConfig::default()).unwrap();
    assert_eq!(log.reader().unwrap().count(), 1);

    // Reading moved the file position; appends still go to the end
    let offset = log.append(b"two").unwrap();
    assert_eq!(offset, frame_len(3));
    assert_eq!(log.reader().unwrap().count(), 2);
}
