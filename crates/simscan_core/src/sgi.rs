//! SGI portrait decoder.
//!
//! Tray portraits are JPEGs wrapped in a 24-byte header and XOR-obfuscated
//! with a fixed repeating 8-byte key. Decoding strips the header and undoes
//! the XOR; the same transform re-encodes, since XOR is its own inverse.

use std::fs;
use std::path::Path;

pub const XOR_KEY: [u8; 8] = [0x41, 0x25, 0xE6, 0xCD, 0x47, 0xBA, 0xB2, 0x1A];

const HEADER_LEN: usize = 24;
const MIN_FILE_LEN: usize = 32;

/// Read and decode a portrait file. `None` for unreadable or too-short
/// files; a portrait smaller than the header plus one key block cannot hold
/// an image.
pub fn decrypt(path: &Path) -> Option<Vec<u8>> {
    let bytes = fs::read(path).ok()?;
    decode(&bytes)
}

/// Decode an in-memory portrait. Byte `i` of the payload is XORed with byte
/// `i % 8` of the key; whole 8-byte blocks go through one u64 XOR with a
/// byte-by-byte tail for the remainder.
pub fn decode(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.len() < MIN_FILE_LEN {
        return None;
    }

    let payload = &bytes[HEADER_LEN..];
    let key = u64::from_le_bytes(XOR_KEY);
    let mut out = Vec::with_capacity(payload.len());

    let mut blocks = payload.chunks_exact(8);
    for block in &mut blocks {
        let mut word = [0u8; 8];
        word.copy_from_slice(block);
        out.extend_from_slice(&(u64::from_le_bytes(word) ^ key).to_le_bytes());
    }
    for (i, byte) in blocks.remainder().iter().enumerate() {
        out.push(byte ^ XOR_KEY[i]);
    }

    Some(out)
}
