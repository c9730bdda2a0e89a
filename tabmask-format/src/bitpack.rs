//! Bit packing for presence bitmaps, type tags, and boolean substreams

use crate::error::{FormatError, Result};
use crate::types::TypeTag;
use bitvec::prelude::*;

/// Presence bitmap: one bit per row, set when the row holds a non-null value
#[derive(Debug, Clone)]
pub struct PresenceBitmap {
    bits: BitVec<u8, Lsb0>,
}

impl PresenceBitmap {
    /// Create an all-absent bitmap for `row_count` rows
    pub fn new(row_count: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, row_count),
        }
    }

    /// Build a bitmap from per-row flags
    pub fn from_bools(flags: &[bool]) -> Self {
        Self {
            bits: flags.iter().copied().collect(),
        }
    }

    /// Mark a row present or absent. Out-of-range rows are ignored.
    pub fn set_present(&mut self, row: usize, present: bool) {
        if row < self.bits.len() {
            self.bits.set(row, present);
        }
    }

    /// Check whether a row is present
    pub fn is_present(&self, row: usize) -> bool {
        self.bits.get(row).map(|b| *b).unwrap_or(false)
    }

    /// Number of present rows
    pub fn count_present(&self) -> usize {
        self.bits.count_ones()
    }

    /// Number of rows covered
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the bitmap covers zero rows
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Packed byte length for `row_count` rows
    pub fn byte_len(row_count: usize) -> usize {
        (row_count + 7) >> 3
    }

    /// Convert to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.as_raw_slice().to_vec()
    }

    /// Create from bytes, keeping the first `row_count` bits
    pub fn from_bytes(bytes: &[u8], row_count: usize) -> Self {
        let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
        bits.truncate(row_count);
        Self { bits }
    }
}

/// 3-bit type tag packer
#[derive(Debug, Clone, Default)]
pub struct TagPacker {
    bits: BitVec<u8, Lsb0>,
}

impl TagPacker {
    /// Create a new tag packer
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one tag
    pub fn push(&mut self, tag: TypeTag) {
        let raw = tag as u8;
        self.bits.extend_from_bitslice(&raw.view_bits::<Lsb0>()[..3]);
    }

    /// Packed byte length for `count` tags
    pub fn byte_len(count: usize) -> usize {
        ((3 * count) + 7) >> 3
    }

    /// Finish packing and return bytes
    pub fn finish(self) -> Vec<u8> {
        self.bits.into_vec()
    }
}

/// 3-bit type tag unpacker
#[derive(Debug, Clone)]
pub struct TagUnpacker {
    bits: BitVec<u8, Lsb0>,
    pos: usize,
}

impl TagUnpacker {
    /// Create an unpacker yielding `count` tags from `bytes`
    pub fn new(bytes: &[u8], count: usize) -> Self {
        let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
        bits.truncate(count * 3);
        Self { bits, pos: 0 }
    }

    /// Unpack every tag, rejecting reserved codes
    pub fn collect_tags(self) -> Result<Vec<TypeTag>> {
        self.map(TypeTag::from_u8).collect()
    }
}

impl Iterator for TagUnpacker {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos + 3 > self.bits.len() {
            return None;
        }

        let tag = self.bits[self.pos..self.pos + 3].load::<u8>();
        self.pos += 3;
        Some(tag)
    }
}

/// Pack booleans LSB-first
pub fn pack_bools(values: &[bool]) -> Vec<u8> {
    let bits: BitVec<u8, Lsb0> = values.iter().copied().collect();
    bits.into_vec()
}

/// Unpack `count` booleans, failing if `bytes` is too short
pub fn unpack_bools(bytes: &[u8], count: usize) -> Result<Vec<bool>> {
    if bytes.len() < (count + 7) >> 3 {
        return Err(FormatError::UnexpectedEof);
    }
    let bits = BitVec::<u8, Lsb0>::from_slice(bytes);
    Ok(bits.iter().take(count).map(|bit| *bit).collect())
}
