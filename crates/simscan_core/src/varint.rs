//! Base-128 varint codec used by the simplified protobuf wire format.

/// Decode a varint starting at `pos`. Returns the value and the position of
/// the first byte after it.
///
/// If `pos` is already past the end of the buffer the result is `(0, pos)`
/// with no progress made; callers must check for the non-advancing case.
/// Accumulation stops unconditionally once the shift would pass 63 bits, so a
/// run of continuation bytes cannot loop forever or overflow the shift.
pub fn decode_varint(buf: &[u8], mut pos: usize) -> (u64, usize) {
    let mut value = 0u64;
    let mut shift = 0u32;

    while pos < buf.len() {
        let byte = buf[pos];
        pos += 1;
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 63 {
            break;
        }
    }

    (value, pos)
}

/// Encode a value as a varint. The counterpart of [`decode_varint`]; used by
/// the synthetic-fixture builders and round-trip tests.
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
