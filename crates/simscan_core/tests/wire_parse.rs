mod common;

use common::{field_bytes, field_fixed32, field_fixed64, field_str, field_varint, tag};
use simscan_core::varint::{decode_varint, encode_varint};
use simscan_core::wire::{FieldMap, FieldValue};

#[test]
fn varint_round_trip() {
    for value in [
        0u64,
        1,
        127,
        128,
        300,
        16_383,
        16_384,
        u32::MAX as u64,
        u64::MAX,
    ] {
        let encoded = encode_varint(value);
        let (decoded, pos) = decode_varint(&encoded, 0);
        assert_eq!(decoded, value);
        assert_eq!(pos, encoded.len());
    }
}

#[test]
fn varint_past_end_makes_no_progress() {
    let buf = [0x01u8];
    assert_eq!(decode_varint(&buf, 5), (0, 5));
    assert_eq!(decode_varint(&[], 0), (0, 0));
}

#[test]
fn varint_endless_continuation_terminates() {
    let buf = [0xFFu8; 32];
    let (_, pos) = decode_varint(&buf, 0);
    assert!(pos <= buf.len());
}

#[test]
fn field_map_holds_every_valid_field() {
    let mut buf = Vec::new();
    buf.extend(field_varint(1, 42));
    buf.extend(field_fixed32(2, 0xDEAD_BEEF));
    buf.extend(field_fixed64(3, 0x0123_4567_89AB_CDEF));
    buf.extend(field_bytes(4, b"payload"));
    buf.extend(field_varint(5000, 7));

    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.len(), 5);
    assert_eq!(map.get_varint(1), Some(42));
    assert_eq!(map.get_fixed32(2), Some(0xDEAD_BEEF));
    assert_eq!(map.get_fixed64(3), Some(0x0123_4567_89AB_CDEF));
    assert_eq!(map.get_bytes(4), Some(b"payload".as_slice()));
    assert_eq!(map.get_varint(5000), Some(7));
}

#[test]
fn repeated_fields_keep_scan_order() {
    let mut buf = Vec::new();
    buf.extend(field_bytes(6, b"one"));
    buf.extend(field_bytes(6, b"two"));
    buf.extend(field_bytes(6, b"three"));

    let map = FieldMap::parse(&buf, 1);
    let values: Vec<&[u8]> = map.bytes_values(6).collect();
    assert_eq!(values, vec![b"one".as_slice(), b"two".as_slice(), b"three".as_slice()]);
}

#[test]
fn field_number_above_limit_is_dropped() {
    let mut buf = field_varint(5001, 9);
    buf.extend(field_varint(2, 11));

    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.get_varint(5001), None);
    // Recovery resynchronizes and still finds the following field.
    assert_eq!(map.get_varint(2), Some(11));
}

#[test]
fn truncated_length_delimited_field_is_dropped() {
    let mut buf = tag(3, 2);
    buf.extend(encode_varint(100));
    buf.extend_from_slice(b"short");

    let map = FieldMap::parse(&buf, 1);
    assert!(map.values(3).is_empty());
}

#[test]
fn zero_length_bytes_field_is_rejected() {
    let mut buf = tag(3, 2);
    buf.extend(encode_varint(0));
    buf.extend(field_varint(4, 1));

    let map = FieldMap::parse(&buf, 1);
    assert!(map.values(3).is_empty());
    assert_eq!(map.get_varint(4), Some(1));
}

#[test]
fn depth_budget_zero_yields_empty_map() {
    let buf = field_varint(1, 42);
    assert!(FieldMap::parse(&buf, 0).is_empty());
}

#[test]
fn too_short_buffer_yields_empty_map() {
    assert!(FieldMap::parse(&[], 1).is_empty());
    assert!(FieldMap::parse(&[0x08], 1).is_empty());
}

#[test]
fn unknown_wire_types_skip_one_byte() {
    // Field 1 with deprecated group wire type 3, then a valid field.
    let mut buf = vec![0x0B];
    buf.extend(field_varint(2, 5));

    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.get_varint(2), Some(5));
}

#[test]
fn get_string_rejects_binary_payloads() {
    let mut buf = field_bytes(5, &[0xFF, 0x00, 0x41]);
    buf.extend(field_str(5, "Bella"));

    let map = FieldMap::parse(&buf, 1);
    // The first value is not printable text; the accessor skips to one
    // that is.
    assert_eq!(map.get_string(5), Some("Bella".to_string()));
}

#[test]
fn get_string_rejects_control_characters() {
    let buf = field_bytes(5, b"Bel\x07la");
    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.get_string(5), None);
}

#[test]
fn get_float_reads_fixed32_bits() {
    let buf = field_fixed32(2, 1234.5f32.to_bits());
    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.get_float(2), Some(1234.5));
}

#[test]
fn random_garbage_never_panics() {
    let garbage: Vec<u8> = (0..512).map(|i| (i * 97 % 251) as u8).collect();
    let _ = FieldMap::parse(&garbage, 3);
    let all_high: Vec<u8> = vec![0xFF; 256];
    let _ = FieldMap::parse(&all_high, 3);
}

#[test]
fn typed_accessor_ignores_mismatched_wire_type() {
    let buf = field_varint(7, 4096);
    let map = FieldMap::parse(&buf, 1);
    assert_eq!(map.get_fixed64(7), None);
    assert_eq!(map.get_varint(7), Some(4096));
    assert!(matches!(map.values(7), [FieldValue::Varint(4096)]));
}
