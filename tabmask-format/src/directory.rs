//! Column directory: one entry per column describing its segment

use crate::constants::DIRECTORY_MAGIC;
use crate::error::{FormatError, Result};
use crate::limits::Limits;
use crate::types::TypeTag;
use crate::varint::{read_uleb128_usize, write_uleb128};
use std::collections::HashSet;

/// Column directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDirectory {
    /// Entries in column order
    pub entries: Vec<ColumnDirectoryEntry>,
}

/// Column directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDirectoryEntry {
    /// Column name
    pub column_name: String,
    /// Declared column type, `None` when cells mix types
    pub declared_type: Option<TypeTag>,
    /// Compressor id for this segment
    pub compressor: u8,
    /// Compression level for this segment
    pub compression_level: u8,
    /// Presence bitmap size in bytes
    pub presence_bytes: usize,
    /// Type tag stream size in bytes
    pub tag_bytes: usize,
    /// Number of non-null values
    pub value_count_present: usize,
    /// Uncompressed segment length
    pub segment_uncompressed_len: usize,
    /// Compressed segment length
    pub segment_compressed_len: usize,
    /// Segment offset from the start of the segment area
    pub segment_offset: usize,
}

impl ColumnDirectory {
    /// Encode the directory to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();

        for entry in &self.entries {
            write_uleb128(&mut body, entry.column_name.len() as u64);
            body.extend_from_slice(entry.column_name.as_bytes());
            body.push(TypeTag::declared_to_u8(entry.declared_type));
            body.push(entry.compressor);
            body.push(entry.compression_level);
            write_uleb128(&mut body, entry.presence_bytes as u64);
            write_uleb128(&mut body, entry.tag_bytes as u64);
            write_uleb128(&mut body, entry.value_count_present as u64);
            write_uleb128(&mut body, entry.segment_uncompressed_len as u64);
            write_uleb128(&mut body, entry.segment_compressed_len as u64);
            write_uleb128(&mut body, entry.segment_offset as u64);
        }

        let mut result = Vec::with_capacity(4 + 10 + body.len());
        result.extend_from_slice(&DIRECTORY_MAGIC.to_le_bytes());
        write_uleb128(&mut result, body.len() as u64);
        result.extend_from_slice(&body);
        result
    }

    /// Decode `column_count` entries for a table of `row_count` rows
    pub fn decode(
        bytes: &[u8],
        column_count: usize,
        row_count: usize,
        limits: &Limits,
    ) -> Result<(Self, usize)> {
        if bytes.len() < 4 {
            return Err(FormatError::UnexpectedEof);
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != DIRECTORY_MAGIC {
            return Err(FormatError::CorruptDirectory("bad directory magic".to_string()));
        }
        let mut pos = 4;

        let body_len = read_uleb128_usize(bytes, &mut pos, "directory length")?;
        let body_end = pos
            .checked_add(body_len)
            .ok_or_else(|| FormatError::CorruptDirectory("length overflow".to_string()))?;
        if body_end > bytes.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let body = &bytes[..body_end];

        let expected_presence = (row_count + 7) >> 3;
        let mut seen = HashSet::with_capacity(column_count);
        let mut entries = Vec::with_capacity(column_count);

        for _ in 0..column_count {
            if pos >= body_end {
                return Err(FormatError::UnexpectedEof);
            }

            let name_len = read_uleb128_usize(body, &mut pos, "column name length")?;
            Limits::check(
                "Column name length",
                name_len,
                limits.max_string_len_per_value,
            )?;
            if pos + name_len + 3 > body_end {
                return Err(FormatError::UnexpectedEof);
            }
            let column_name = std::str::from_utf8(&body[pos..pos + name_len])
                .map_err(|_| FormatError::CorruptDirectory("column name is not UTF-8".to_string()))?
                .to_string();
            pos += name_len;

            if !seen.insert(column_name.clone()) {
                return Err(FormatError::CorruptDirectory(format!(
                    "duplicate column '{}'",
                    column_name
                )));
            }

            let declared_type = TypeTag::declared_from_u8(body[pos])?;
            let compressor = body[pos + 1];
            let compression_level = body[pos + 2];
            pos += 3;

            let presence_bytes = read_uleb128_usize(body, &mut pos, "presence_bytes")?;
            if presence_bytes != expected_presence {
                return Err(FormatError::CorruptDirectory(format!(
                    "column '{}' presence bitmap is {} bytes, expected {}",
                    column_name, presence_bytes, expected_presence
                )));
            }

            let tag_bytes = read_uleb128_usize(body, &mut pos, "tag_bytes")?;
            let value_count_present = read_uleb128_usize(body, &mut pos, "value_count_present")?;
            if value_count_present > row_count {
                return Err(FormatError::CorruptDirectory(format!(
                    "column '{}' has {} values for {} rows",
                    column_name, value_count_present, row_count
                )));
            }
            if tag_bytes != ((3 * value_count_present) + 7) >> 3 {
                return Err(FormatError::CorruptDirectory(format!(
                    "column '{}' tag stream length mismatch",
                    column_name
                )));
            }

            let segment_uncompressed_len =
                read_uleb128_usize(body, &mut pos, "segment_uncompressed_len")?;
            Limits::check(
                "Segment uncompressed length",
                segment_uncompressed_len,
                limits.max_segment_uncompressed_len,
            )?;
            let segment_compressed_len =
                read_uleb128_usize(body, &mut pos, "segment_compressed_len")?;
            let segment_offset = read_uleb128_usize(body, &mut pos, "segment_offset")?;

            entries.push(ColumnDirectoryEntry {
                column_name,
                declared_type,
                compressor,
                compression_level,
                presence_bytes,
                tag_bytes,
                value_count_present,
                segment_uncompressed_len,
                segment_compressed_len,
                segment_offset,
            });
        }

        if pos != body_end {
            return Err(FormatError::CorruptDirectory(
                "trailing bytes after last entry".to_string(),
            ));
        }

        Ok((Self { entries }, pos))
    }

    /// Total length of the segment area described by this directory
    pub fn segment_area_len(&self) -> Result<usize> {
        let mut expected_offset = 0usize;
        for entry in &self.entries {
            if entry.segment_offset != expected_offset {
                return Err(FormatError::CorruptDirectory(format!(
                    "column '{}' segment offset {} is not contiguous (expected {})",
                    entry.column_name, entry.segment_offset, expected_offset
                )));
            }
            expected_offset = expected_offset
                .checked_add(entry.segment_compressed_len)
                .ok_or_else(|| FormatError::CorruptDirectory("segment overflow".to_string()))?;
        }
        Ok(expected_offset)
    }
}
