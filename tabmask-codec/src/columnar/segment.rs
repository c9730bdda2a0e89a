//! Column segment encoding

use crate::table::Cell;
use tabmask_format::bitpack::{pack_bools, PresenceBitmap, TagPacker};
use tabmask_format::varint::{write_uleb128, zigzag_encode};
use tabmask_format::{Compression, FormatError, Result, TypeTag};

/// Encoded column: presence bitmap, tag stream, then typed substreams
#[derive(Debug, Clone)]
pub struct ColumnSegment {
    /// Uncompressed payload bytes
    pub uncompressed_payload: Vec<u8>,
    /// Presence bitmap size in bytes
    pub presence_bytes: usize,
    /// Tag stream size in bytes
    pub tag_bytes: usize,
    /// Number of non-null cells
    pub value_count_present: usize,
}

impl ColumnSegment {
    /// Encode one column's cells
    pub fn build(cells: &[Cell]) -> Self {
        let mut presence = PresenceBitmap::new(cells.len());
        let mut tags = TagPacker::new();
        let mut bools = Vec::new();
        let mut ints = Vec::new();
        let mut uints = Vec::new();
        let mut floats = Vec::new();
        let mut strings = Vec::new();
        let mut present = 0usize;

        for (row, cell) in cells.iter().enumerate() {
            let tag = match cell {
                Cell::Null => continue,
                Cell::Bool(b) => {
                    bools.push(*b);
                    TypeTag::Bool
                }
                Cell::Int(i) => {
                    write_uleb128(&mut ints, zigzag_encode(*i));
                    TypeTag::Int
                }
                Cell::UInt(u) => {
                    write_uleb128(&mut uints, *u);
                    TypeTag::UInt
                }
                Cell::Float(f) => {
                    floats.extend_from_slice(&f.to_bits().to_le_bytes());
                    TypeTag::Float
                }
                Cell::Text(s) => {
                    write_uleb128(&mut strings, s.len() as u64);
                    strings.extend_from_slice(s.as_bytes());
                    TypeTag::String
                }
            };
            presence.set_present(row, true);
            tags.push(tag);
            present += 1;
        }

        let presence_bytes = presence.to_bytes();
        let tag_bytes = tags.finish();
        let bool_bytes = pack_bools(&bools);

        let mut payload = Vec::with_capacity(
            presence_bytes.len()
                + tag_bytes.len()
                + bool_bytes.len()
                + ints.len()
                + uints.len()
                + floats.len()
                + strings.len(),
        );
        payload.extend_from_slice(&presence_bytes);
        payload.extend_from_slice(&tag_bytes);
        payload.extend_from_slice(&bool_bytes);
        payload.extend_from_slice(&ints);
        payload.extend_from_slice(&uints);
        payload.extend_from_slice(&floats);
        payload.extend_from_slice(&strings);

        Self {
            uncompressed_payload: payload,
            presence_bytes: presence_bytes.len(),
            tag_bytes: tag_bytes.len(),
            value_count_present: present,
        }
    }

    /// Compress the payload with the given codec
    pub fn compress(&self, compression: Compression) -> Result<Vec<u8>> {
        match compression {
            Compression::None => Ok(self.uncompressed_payload.clone()),
            Compression::Zstd(level) => {
                zstd::encode_all(self.uncompressed_payload.as_slice(), level as i32)
                    .map_err(|e| FormatError::Compression(format!("zstd compression failed: {}", e)))
            }
        }
    }
}
