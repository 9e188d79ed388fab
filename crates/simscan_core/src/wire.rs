//! Simplified protobuf wire-format parser.
//!
//! Save, tray and package blobs carry protobuf-shaped payloads with no
//! published schema. Rather than generated message types, a blob is parsed
//! into a loose field map and call sites pull out the handful of fields they
//! know about through typed accessors, ignoring everything else.

use std::collections::BTreeMap;

use crate::varint::decode_varint;

/// Largest field number accepted. The formats never use numbers anywhere
/// near this; a bigger value almost always means the scan has desynced into
/// garbage, so the field is dropped and the scan resumes one byte later.
const MAX_FIELD_NUMBER: u64 = 5000;

/// Largest accepted length for a length-delimited field. A corrupted length
/// must not turn into a phantom multi-gigabyte slice.
const MAX_BYTES_LEN: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(Vec<u8>),
}

/// A decoded field map: field number to the values seen for it, in scan
/// order. Unknown fields are retained like any other; corrupt ones are
/// skipped a byte at a time without aborting the rest of the blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: BTreeMap<u32, Vec<FieldValue>>,
}

impl FieldMap {
    /// Parse a blob with a remaining-depth budget. A budget of 0 (or a blob
    /// too short to hold a tag and a value) yields an empty map; callers
    /// parse nested `Bytes` values themselves with `budget - 1`, which keeps
    /// recursion bounded on adversarial input.
    pub fn parse(data: &[u8], depth_budget: u32) -> FieldMap {
        let mut map = FieldMap::default();
        if depth_budget == 0 || data.len() < 2 {
            return map;
        }

        let mut pos = 0usize;
        while pos + 1 < data.len() {
            let start = pos;
            let (tag, after_tag) = decode_varint(data, pos);
            if tag == 0 || after_tag == start {
                pos = start + 1;
                continue;
            }

            let field_number = tag >> 3;
            if field_number == 0 || field_number > MAX_FIELD_NUMBER {
                pos = start + 1;
                continue;
            }
            let field = field_number as u32;
            pos = after_tag;

            match tag & 0x7 {
                0 => {
                    let (value, after_value) = decode_varint(data, pos);
                    if after_value == pos {
                        pos = start + 1;
                        continue;
                    }
                    map.push(field, FieldValue::Varint(value));
                    pos = after_value;
                }
                1 => {
                    if pos + 8 > data.len() {
                        pos = start + 1;
                        continue;
                    }
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&data[pos..pos + 8]);
                    map.push(field, FieldValue::Fixed64(u64::from_le_bytes(raw)));
                    pos += 8;
                }
                2 => {
                    let (len, after_len) = decode_varint(data, pos);
                    let end = after_len.saturating_add(len as usize);
                    if after_len == pos || len == 0 || len >= MAX_BYTES_LEN || end > data.len() {
                        pos = start + 1;
                        continue;
                    }
                    map.push(field, FieldValue::Bytes(data[after_len..end].to_vec()));
                    pos = end;
                }
                5 => {
                    if pos + 4 > data.len() {
                        pos = start + 1;
                        continue;
                    }
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(&data[pos..pos + 4]);
                    map.push(field, FieldValue::Fixed32(u32::from_le_bytes(raw)));
                    pos += 4;
                }
                // Deprecated group wire types and anything else: one junk byte.
                _ => {
                    pos = start + 1;
                }
            }
        }

        map
    }

    fn push(&mut self, field: u32, value: FieldValue) {
        self.fields.entry(field).or_default().push(value);
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn values(&self, field: u32) -> &[FieldValue] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[FieldValue])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// First varint value for the field, if any.
    pub fn get_varint(&self, field: u32) -> Option<u64> {
        self.values(field).iter().find_map(|v| match v {
            FieldValue::Varint(n) => Some(*n),
            _ => None,
        })
    }

    pub fn get_fixed32(&self, field: u32) -> Option<u32> {
        self.values(field).iter().find_map(|v| match v {
            FieldValue::Fixed32(n) => Some(*n),
            _ => None,
        })
    }

    pub fn get_fixed64(&self, field: u32) -> Option<u64> {
        self.values(field).iter().find_map(|v| match v {
            FieldValue::Fixed64(n) => Some(*n),
            _ => None,
        })
    }

    /// First fixed32 value reinterpreted as an IEEE-754 float. Statistic
    /// values (skill XP, commodities, mood) are stored as raw float bits.
    pub fn get_float(&self, field: u32) -> Option<f32> {
        self.get_fixed32(field).map(f32::from_bits)
    }

    /// First length-delimited value for the field, if any.
    pub fn get_bytes(&self, field: u32) -> Option<&[u8]> {
        self.bytes_values(field).next()
    }

    /// All length-delimited values for the field, in scan order.
    pub fn bytes_values(&self, field: u32) -> impl Iterator<Item = &[u8]> {
        self.values(field).iter().filter_map(|v| match v {
            FieldValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        })
    }

    /// First length-delimited value that is valid, fully printable UTF-8.
    /// Record shapes reuse field numbers between text and packed binary
    /// fields; the printability check keeps binary payloads from being
    /// surfaced as names.
    pub fn get_string(&self, field: u32) -> Option<String> {
        self.bytes_values(field).find_map(|bytes| {
            let text = std::str::from_utf8(bytes).ok()?;
            if text.chars().all(|c| !c.is_control()) {
                Some(text.to_string())
            } else {
                None
            }
        })
    }
}
