//! File header structures

use crate::constants::{FILE_MAGIC, FLAG_KNOWN_MASK, FLAG_ORIGIN_HINT_MASK, FLAG_ORIGIN_HINT_SHIFT};
use crate::error::{FormatError, Result};
use crate::limits::Limits;
use crate::varint::{read_uleb128_usize, write_uleb128};

/// Hint recording which representation a container was converted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginHint {
    /// Written natively or origin not recorded.
    Unknown = 0,
    /// Converted from delimited text.
    Text = 1,
    /// Converted from a JSON record list.
    RecordList = 2,
}

impl OriginHint {
    /// Decode the origin hint from the provided flags.
    pub fn from_flags(flags: u32) -> Result<Self> {
        match (flags & FLAG_ORIGIN_HINT_MASK) >> FLAG_ORIGIN_HINT_SHIFT {
            0 => Ok(OriginHint::Unknown),
            1 => Ok(OriginHint::Text),
            2 => Ok(OriginHint::RecordList),
            _ => Err(FormatError::UnsupportedFeature(
                "reserved origin hint".to_string(),
            )),
        }
    }

    /// Encode the origin hint into the provided flags.
    pub fn apply_to_flags(self, flags: u32) -> u32 {
        (flags & !FLAG_ORIGIN_HINT_MASK) | ((self as u32) << FLAG_ORIGIN_HINT_SHIFT)
    }
}

/// File header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// File flags
    pub flags: u32,
    /// Compressor used for every column segment
    pub default_compressor: u8,
    /// Compression level used for every column segment
    pub default_compression_level: u8,
    /// Rows in the table
    pub row_count: usize,
    /// Columns in the table
    pub column_count: usize,
    /// Opaque user metadata
    pub user_metadata: Vec<u8>,
}

impl FileHeader {
    /// Encode header to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(16 + self.user_metadata.len());

        result.extend_from_slice(&FILE_MAGIC);
        result.extend_from_slice(&self.flags.to_le_bytes());
        result.push(self.default_compressor);
        result.push(self.default_compression_level);
        write_uleb128(&mut result, self.row_count as u64);
        write_uleb128(&mut result, self.column_count as u64);
        write_uleb128(&mut result, self.user_metadata.len() as u64);
        result.extend_from_slice(&self.user_metadata);

        result
    }

    /// Decode header from bytes, returning it with the number of bytes consumed
    pub fn decode(bytes: &[u8], limits: &Limits) -> Result<(Self, usize)> {
        if bytes.len() < FILE_MAGIC.len() {
            return Err(FormatError::UnexpectedEof);
        }

        let magic = &bytes[..4];
        if magic[..3] != FILE_MAGIC[..3] {
            return Err(FormatError::InvalidMagic);
        }
        if magic[3] != FILE_MAGIC[3] {
            return Err(FormatError::UnsupportedVersion(magic[3]));
        }
        let mut pos = 4;

        // flags + compressor + level
        if bytes.len() < pos + 4 + 1 + 1 {
            return Err(FormatError::UnexpectedEof);
        }

        let flags =
            u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
        pos += 4;
        if flags & !FLAG_KNOWN_MASK != 0 {
            return Err(FormatError::UnsupportedFeature(format!(
                "unknown header flags {:#x}",
                flags & !FLAG_KNOWN_MASK
            )));
        }
        OriginHint::from_flags(flags)?;

        let default_compressor = bytes[pos];
        let default_compression_level = bytes[pos + 1];
        pos += 2;

        let row_count = read_uleb128_usize(bytes, &mut pos, "row_count")?;
        Limits::check("Row count", row_count, limits.max_rows)?;

        let column_count = read_uleb128_usize(bytes, &mut pos, "column_count")?;
        Limits::check("Column count", column_count, limits.max_columns)?;

        let metadata_len = read_uleb128_usize(bytes, &mut pos, "metadata_len")?;
        Limits::check("Metadata length", metadata_len, limits.max_metadata_len)?;
        let metadata_end = pos
            .checked_add(metadata_len)
            .ok_or_else(|| FormatError::CorruptHeader("metadata length overflow".to_string()))?;
        if metadata_end > bytes.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let user_metadata = bytes[pos..metadata_end].to_vec();
        pos = metadata_end;

        Ok((
            Self {
                flags,
                default_compressor,
                default_compression_level,
                row_count,
                column_count,
                user_metadata,
            },
            pos,
        ))
    }

    /// Return the origin hint stored in the flags.
    pub fn origin_hint(&self) -> Result<OriginHint> {
        OriginHint::from_flags(self.flags)
    }

    /// Update the origin hint in the flags.
    pub fn set_origin_hint(&mut self, hint: OriginHint) {
        self.flags = hint.apply_to_flags(self.flags);
    }
}
