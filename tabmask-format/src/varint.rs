//! Variable-length integer encoding (ULEB128 / ZigZag)

use crate::error::{FormatError, Result};
use smallvec::SmallVec;

/// Encode a u64 as ULEB128
pub fn encode_uleb128(val: u64) -> SmallVec<[u8; 10]> {
    let mut result = SmallVec::new();
    let mut x = val;

    while x >= 0x80 {
        result.push((x & 0x7F) as u8 | 0x80);
        x >>= 7;
    }
    result.push((x & 0x7F) as u8);

    result
}

/// Append the ULEB128 encoding of `val` to `out`
pub fn write_uleb128(out: &mut Vec<u8>, val: u64) {
    out.extend_from_slice(&encode_uleb128(val));
}

/// Decode ULEB128 from bytes, returning the value and the bytes consumed
pub fn decode_uleb128(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= 10 {
            return Err(FormatError::LimitExceeded("ULEB128 too long".to_string()));
        }

        let chunk = (byte & 0x7F) as u64;
        if shift == 63 && chunk > 1 {
            return Err(FormatError::LimitExceeded(
                "ULEB128 overflows u64".to_string(),
            ));
        }
        result |= chunk << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, i + 1));
        }

        shift += 7;
    }

    Err(FormatError::UnexpectedEof)
}

/// Decode a ULEB128 at `*pos` and advance the cursor past it
pub fn read_uleb128(bytes: &[u8], pos: &mut usize) -> Result<u64> {
    let rest = bytes.get(*pos..).ok_or(FormatError::UnexpectedEof)?;
    let (value, consumed) = decode_uleb128(rest)?;
    *pos += consumed;
    Ok(value)
}

/// Decode a ULEB128 length or count that must fit in `usize`
pub fn read_uleb128_usize(bytes: &[u8], pos: &mut usize, what: &str) -> Result<usize> {
    let value = read_uleb128(bytes, pos)?;
    usize::try_from(value)
        .map_err(|_| FormatError::LimitExceeded(format!("{} exceeds supported size", what)))
}

/// ZigZag encode a signed integer
pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// ZigZag decode to signed integer
pub fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}
