//! QFS/RefPack decompressor.
//!
//! RefPack is the LZ77-family scheme used for compressed DBPF entries. A
//! block starts with a flags byte, the 0xFB magic, and a big-endian declared
//! uncompressed size (4 bytes when flag 0x80 is set, 3 otherwise), followed
//! by a stream of 1-4 byte opcodes that mix literal runs with
//! backreferences into the output produced so far.

/// Second byte of every compressed block.
pub const MAGIC: u8 = 0xFB;

const LONG_SIZE_FLAG: u8 = 0x80;

/// Decompress a RefPack block.
///
/// Input shorter than 6 bytes or without the magic is returned unchanged;
/// the caller has already decided the entry is uncompressed and this is the
/// final safety net. A truncated or corrupt opcode stream ends the loop
/// early and yields however much output was produced, never a panic. The
/// declared size is a hard cap on the output: no opcode may grow the buffer
/// past it regardless of what the stream claims.
pub fn decompress(data: &[u8]) -> Vec<u8> {
    if data.len() < 6 || data[1] != MAGIC {
        return data.to_vec();
    }

    let flags = data[0];
    let (declared, mut pos) = if flags & LONG_SIZE_FLAG != 0 {
        (
            u32::from_be_bytes([data[2], data[3], data[4], data[5]]) as usize,
            6,
        )
    } else {
        (
            ((data[2] as usize) << 16) | ((data[3] as usize) << 8) | data[4] as usize,
            5,
        )
    };

    let mut out: Vec<u8> = Vec::with_capacity(declared.min(1 << 24));

    while pos < data.len() && out.len() < declared {
        let b0 = data[pos];
        let remaining = data.len() - pos;

        let (num_plain, num_copy, offset, op_len, stop) = match b0 {
            0x00..=0x7F => {
                if remaining < 2 {
                    break;
                }
                let b1 = data[pos + 1] as usize;
                let b0 = b0 as usize;
                (
                    b0 & 0x03,
                    ((b0 & 0x1C) >> 2) + 3,
                    ((b0 & 0x60) << 3) + b1 + 1,
                    2,
                    false,
                )
            }
            0x80..=0xBF => {
                if remaining < 3 {
                    break;
                }
                let b1 = data[pos + 1] as usize;
                let b2 = data[pos + 2] as usize;
                let b0 = b0 as usize;
                (
                    (b1 & 0xC0) >> 6,
                    (b0 & 0x3F) + 4,
                    ((b1 & 0x3F) << 8) + b2 + 1,
                    3,
                    false,
                )
            }
            0xC0..=0xDF => {
                if remaining < 4 {
                    break;
                }
                let b1 = data[pos + 1] as usize;
                let b2 = data[pos + 2] as usize;
                let b3 = data[pos + 3] as usize;
                let b0 = b0 as usize;
                (
                    b0 & 0x03,
                    ((b0 & 0x0C) << 6) + b3 + 5,
                    ((b0 & 0x10) << 12) + (b1 << 8) + b2 + 1,
                    4,
                    false,
                )
            }
            0xE0..=0xFB => ((((b0 as usize) & 0x1F) << 2) + 4, 0, 0, 1, false),
            // Stopcode: up to 3 trailing literals, then the stream is done.
            0xFC..=0xFF => ((b0 as usize) & 0x03, 0, 0, 1, true),
        };
        pos += op_len;

        if num_plain > 0 {
            let n = num_plain
                .min(data.len() - pos)
                .min(declared - out.len());
            out.extend_from_slice(&data[pos..pos + n]);
            pos += n;
            if n < num_plain {
                break;
            }
        }

        if num_copy > 0 {
            if offset == 0 || offset > out.len() {
                break;
            }
            let n = num_copy.min(declared - out.len());
            let src = out.len() - offset;
            if offset >= n {
                out.extend_from_within(src..src + n);
            } else {
                // Overlapping backreference: each byte may depend on one this
                // same opcode just wrote, so copy strictly forward.
                for i in 0..n {
                    let byte = out[src + i];
                    out.push(byte);
                }
            }
            if n < num_copy {
                break;
            }
        }

        if stop {
            break;
        }
    }

    out
}
