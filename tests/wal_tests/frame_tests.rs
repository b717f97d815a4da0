//! Tests for record framing
//!
//! These tests verify:
//! - Exact on-disk byte layout of a frame
//! - Frame size arithmetic
//! - Stop reason classification and messages

use tornlog::checksum;
use tornlog::wal::{encode_frame, frame_len, Record, StopReason, FRAME_OVERHEAD};

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_frame_layout_is_big_endian() {
    let frame = encode_frame(b"hello").unwrap();

    assert_eq!(frame.len(), 13);
    assert_eq!(&frame[0..4], &[0, 0, 0, 5]);
    assert_eq!(&frame[4..9], b"hello");
    assert_eq!(&frame[9..13], &checksum(b"hello").to_be_bytes());
}

#[test]
fn test_frame_checksum_covers_payload_only() {
    let frame = encode_frame(b"123456789").unwrap();
    assert_eq!(&frame[frame.len() - 4..], &[0xCB, 0xF4, 0x39, 0x26]);
}

#[test]
fn test_frame_length_field_multi_byte() {
    let payload = vec![7u8; 0x0102];
    let frame = encode_frame(&payload).unwrap();
    assert_eq!(&frame[0..4], &[0x00, 0x00, 0x01, 0x02]);
    assert_eq!(frame.len() as u64, frame_len(0x0102));
}

#[test]
fn test_frame_len() {
    assert_eq!(FRAME_OVERHEAD, 8);
    assert_eq!(frame_len(1), 9);
    assert_eq!(frame_len(512), 520);
}

#[test]
fn test_record_end_offset() {
    let frame = encode_frame(b"abc").unwrap();
    let record = Record {
        offset: 20,
        payload: frame.slice(4..7),
    };
    assert_eq!(record.end_offset(), 31);
}

// =============================================================================
// Stop Reason Tests
// =============================================================================

#[test]
fn test_corruption_classification() {
    assert!(StopReason::ChecksumMismatch { stored: 1, computed: 2 }.is_corruption());
    assert!(StopReason::ImplausibleLength { length: 0 }.is_corruption());
    assert!(!StopReason::IncompleteLength { available: 3 }.is_corruption());
    assert!(!StopReason::IncompleteFrame { needed: 20, available: 9 }.is_corruption());
}

#[test]
fn test_stop_reason_display() {
    let msg = StopReason::ChecksumMismatch {
        stored: 0xDEADBEEF,
        computed: 0xCAFEBABE,
    }
    .to_string();
    assert!(msg.contains("0xdeadbeef"));
    assert!(msg.contains("0xcafebabe"));

    let msg = StopReason::IncompleteFrame { needed: 520, available: 258 }.to_string();
    assert!(msg.contains("258 of 520"));
}
