//! Shared fixture builders: synthetic wire-format buffers, RefPack streams
//! and DBPF archives small enough to reason about byte by byte.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use simscan_core::varint::encode_varint;

pub fn tag(field: u32, wire: u8) -> Vec<u8> {
    encode_varint((u64::from(field) << 3) | u64::from(wire))
}

pub fn field_varint(field: u32, value: u64) -> Vec<u8> {
    let mut out = tag(field, 0);
    out.extend(encode_varint(value));
    out
}

pub fn field_fixed32(field: u32, value: u32) -> Vec<u8> {
    let mut out = tag(field, 5);
    out.extend_from_slice(&value.to_le_bytes());
    out
}

pub fn field_float(field: u32, value: f32) -> Vec<u8> {
    field_fixed32(field, value.to_bits())
}

pub fn field_fixed64(field: u32, value: u64) -> Vec<u8> {
    let mut out = tag(field, 1);
    out.extend_from_slice(&value.to_le_bytes());
    out
}

pub fn field_bytes(field: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = tag(field, 2);
    out.extend(encode_varint(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

pub fn field_str(field: u32, text: &str) -> Vec<u8> {
    field_bytes(field, text.as_bytes())
}

/// Literal-only RefPack stream: 3-byte size header, literal opcodes in
/// 4-byte multiples, and a stopcode carrying the remainder.
pub fn refpack_compress(payload: &[u8]) -> Vec<u8> {
    let n = payload.len();
    let mut out = vec![0x10, 0xFB];
    out.push(((n >> 16) & 0xFF) as u8);
    out.push(((n >> 8) & 0xFF) as u8);
    out.push((n & 0xFF) as u8);

    let mut pos = 0;
    while n - pos >= 4 {
        let chunk = ((n - pos) / 4 * 4).min(112);
        out.push(0xE0 | ((chunk - 4) >> 2) as u8);
        out.extend_from_slice(&payload[pos..pos + chunk]);
        pos += chunk;
    }
    let tail = n - pos;
    out.push(0xFC | tail as u8);
    out.extend_from_slice(&payload[pos..]);
    out
}

pub struct FixtureEntry {
    pub resource_type: u32,
    pub group: u32,
    pub instance: u64,
    pub data: Vec<u8>,
    pub compressed: bool,
    pub mem_size: u32,
}

impl FixtureEntry {
    pub fn plain(resource_type: u32, instance: u64, data: Vec<u8>) -> Self {
        let mem_size = data.len() as u32;
        Self {
            resource_type,
            group: 0,
            instance,
            data,
            compressed: false,
            mem_size,
        }
    }

    pub fn compressed(resource_type: u32, instance: u64, data: Vec<u8>, mem_size: u32) -> Self {
        Self {
            resource_type,
            group: 0,
            instance,
            data,
            compressed: true,
            mem_size,
        }
    }
}

/// Assemble a minimal DBPF archive: 96-byte header, entry data, then an
/// index table with no constant fields (flags word 0).
pub fn build_dbpf(entries: &[FixtureEntry]) -> Vec<u8> {
    let mut out = vec![0u8; 96];
    out[0..4].copy_from_slice(b"DBPF");

    let mut offsets = Vec::with_capacity(entries.len());
    for entry in entries {
        offsets.push(out.len() as u32);
        out.extend_from_slice(&entry.data);
    }

    let index_offset = out.len() as u64;
    out.extend_from_slice(&0u32.to_le_bytes());
    for (entry, &offset) in entries.iter().zip(&offsets) {
        out.extend_from_slice(&entry.resource_type.to_le_bytes());
        out.extend_from_slice(&entry.group.to_le_bytes());
        out.extend_from_slice(&((entry.instance >> 32) as u32).to_le_bytes());
        out.extend_from_slice(&(entry.instance as u32).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        let mut size = entry.data.len() as u32;
        if entry.compressed {
            size |= 0x8000_0000;
        }
        out.extend_from_slice(&size.to_le_bytes());
        if entry.compressed {
            // Compression type and committed flag, skipped by the reader.
            out.extend_from_slice(&0x0001_5A42u32.to_le_bytes());
        }
        out.extend_from_slice(&entry.mem_size.to_le_bytes());
    }

    out[36..40].copy_from_slice(&(entries.len() as u32).to_le_bytes());
    out[64..72].copy_from_slice(&index_offset.to_le_bytes());
    out
}

pub fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "simscan_test_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}
