//! DBPF package archive index reader.
//!
//! DBPF ("Database Packed File") is the container used for packages, saves
//! and tray resources: a fixed 96-byte header, resource data, and an index
//! table whose per-entry width varies with a leading constant-field bitmask.
//! Saves use the v2 layout with a 64-bit index offset.
//!
//! Both operations degrade to empty results on malformed input. A package
//! that is not a DBPF archive, or whose index is truncated, yields whatever
//! entries could be read; it never aborts a larger scan.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;
use serde::{Deserialize, Serialize};

use crate::reader::LittleEndianReader;
use crate::refpack;

pub const HEADER_LEN: u64 = 96;
const MAGIC: &[u8] = b"DBPF";
const INDEX_COUNT_OFFSET: u64 = 36;
const INDEX_OFFSET_OFFSET: u64 = 64;

/// Generous upper bound on one index entry: seven 4-byte fields plus the
/// extra compression word. Reading `count * 40` bytes in one call covers any
/// mix of constant and per-entry fields.
const INDEX_ENTRY_MAX_LEN: usize = 40;

const FIELD_COUNT: usize = 7;
const FIELD_FILE_SIZE: usize = 5;
const COMPRESSED_BIT: u32 = 0x8000_0000;

/// Marker byte opening a zlib stream; some packages deflate entries instead
/// of RefPack-compressing them (compression type 0x5A42).
const ZLIB_MAGIC: u8 = 0x78;

/// One resource in a package index. `instance` is the concatenation of the
/// high and low 32-bit halves stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub resource_type: u32,
    pub group: u32,
    pub instance: u64,
    pub offset: u64,
    pub size: u32,
    pub compressed: bool,
    pub mem_size: u32,
}

/// Read the index table of a package. Returns an empty list for anything
/// that is not a readable DBPF archive.
pub fn read_entries(path: &Path) -> Vec<ArchiveEntry> {
    read_entries_inner(path).unwrap_or_default()
}

fn read_entries_inner(path: &Path) -> io::Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let mut r = LittleEndianReader::new(BufReader::new(file));

    if r.len()? < HEADER_LEN {
        return Ok(Vec::new());
    }
    if r.read_bytes(4)? != MAGIC {
        return Ok(Vec::new());
    }

    r.seek_to(INDEX_COUNT_OFFSET)?;
    let index_count = r.read_u32()? as usize;
    r.seek_to(INDEX_OFFSET_OFFSET)?;
    let index_offset = r.read_u64()?;

    r.seek_to(index_offset)?;
    let table = r.read_bytes_up_to(index_count.saturating_mul(INDEX_ENTRY_MAX_LEN))?;

    Ok(parse_index(&table, index_count))
}

fn parse_index(table: &[u8], index_count: usize) -> Vec<ArchiveEntry> {
    let mut cur = 0usize;
    let Some(index_flags) = read_u32_at(table, &mut cur) else {
        return Vec::new();
    };

    // Bits 0..6 mark fields that are constant across all entries; each
    // constant's single shared value follows the flags word in bit order.
    let mut constant = [0u32; FIELD_COUNT];
    let mut is_constant = [false; FIELD_COUNT];
    for bit in 0..FIELD_COUNT {
        if index_flags & (1 << bit) != 0 {
            let Some(value) = read_u32_at(table, &mut cur) else {
                return Vec::new();
            };
            constant[bit] = value;
            is_constant[bit] = true;
        }
    }

    let mut entries = Vec::with_capacity(index_count.min(4096));
    'entries: for _ in 0..index_count {
        let mut fields = [0u32; FIELD_COUNT];
        for (i, slot) in fields.iter_mut().enumerate() {
            if is_constant[i] {
                *slot = constant[i];
            } else {
                let Some(value) = read_u32_at(table, &mut cur) else {
                    // Truncated index: keep what was read so far.
                    break 'entries;
                };
                *slot = value;
            }

            // Compressed entries carry one extra word (compression type and
            // committed flag) straight after the size field.
            if i == FIELD_FILE_SIZE && *slot & COMPRESSED_BIT != 0 {
                if cur + 4 > table.len() {
                    break 'entries;
                }
                cur += 4;
            }
        }

        entries.push(ArchiveEntry {
            resource_type: fields[0],
            group: fields[1],
            instance: (u64::from(fields[2]) << 32) | u64::from(fields[3]),
            offset: u64::from(fields[4]),
            size: fields[5] & !COMPRESSED_BIT,
            compressed: fields[5] & COMPRESSED_BIT != 0,
            mem_size: fields[6],
        });
    }

    entries
}

fn read_u32_at(buf: &[u8], cur: &mut usize) -> Option<u32> {
    let end = cur.checked_add(4)?;
    if end > buf.len() {
        return None;
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[*cur..end]);
    *cur = end;
    Some(u32::from_le_bytes(raw))
}

/// Read one entry's bytes, decompressing when the payload is actually a
/// RefPack or zlib stream. Any I/O problem yields an empty buffer.
pub fn read_entry_data(path: &Path, entry: &ArchiveEntry) -> Vec<u8> {
    read_entry_data_inner(path, entry).unwrap_or_default()
}

fn read_entry_data_inner(path: &Path, entry: &ArchiveEntry) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut r = LittleEndianReader::new(BufReader::new(file));
    r.seek_to(entry.offset)?;
    let raw = r.read_bytes_up_to(entry.size as usize)?;
    if raw.len() < entry.size as usize {
        return Ok(Vec::new());
    }

    if !entry.compressed {
        return Ok(raw);
    }

    if raw.len() > 5 && raw[1] == refpack::MAGIC {
        return Ok(refpack::decompress(&raw));
    }

    if raw.first() == Some(&ZLIB_MAGIC) {
        let mut inflated = Vec::with_capacity((entry.mem_size as usize).min(1 << 24));
        if ZlibDecoder::new(raw.as_slice())
            .read_to_end(&mut inflated)
            .is_ok()
        {
            return Ok(inflated);
        }
    }

    Ok(raw)
}
