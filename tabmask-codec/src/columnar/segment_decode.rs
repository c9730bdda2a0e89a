//! Column segment decoder

use crate::table::Cell;
use tabmask_format::bitpack::{unpack_bools, PresenceBitmap, TagUnpacker};
use tabmask_format::constants::{COMPRESSOR_NONE, COMPRESSOR_ZSTD};
use tabmask_format::varint::{read_uleb128, read_uleb128_usize, zigzag_decode};
use tabmask_format::{ColumnDirectoryEntry, FormatError, Limits, Result, TypeTag};

/// Decodes a single column segment back into cells
pub struct ColumnSegmentDecoder<'a> {
    entry: &'a ColumnDirectoryEntry,
    row_count: usize,
    limits: &'a Limits,
}

impl<'a> ColumnSegmentDecoder<'a> {
    /// Create a decoder for the segment described by `entry`
    pub fn new(entry: &'a ColumnDirectoryEntry, row_count: usize, limits: &'a Limits) -> Self {
        Self {
            entry,
            row_count,
            limits,
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> FormatError {
        FormatError::CorruptSegment {
            column: self.entry.column_name.clone(),
            reason: reason.into(),
        }
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let expected = self.entry.segment_uncompressed_len;
        Limits::check(
            "Segment uncompressed length",
            expected,
            self.limits.max_segment_uncompressed_len,
        )?;

        let decompressed = match self.entry.compressor {
            COMPRESSOR_NONE => compressed.to_vec(),
            // Capacity caps the output, so a lying header cannot balloon memory.
            COMPRESSOR_ZSTD => zstd::bulk::decompress(compressed, expected).map_err(|e| {
                FormatError::Compression(format!(
                    "zstd decompression of column '{}' failed: {}",
                    self.entry.column_name, e
                ))
            })?,
            other => return Err(FormatError::UnsupportedCompressor(other)),
        };

        if decompressed.len() != expected {
            return Err(self.corrupt(format!(
                "decompressed to {} bytes, directory says {}",
                decompressed.len(),
                expected
            )));
        }
        Ok(decompressed)
    }

    /// Decode the compressed segment into exactly `row_count` cells
    pub fn decode(&self, compressed: &[u8]) -> Result<Vec<Cell>> {
        let bytes = self.decompress(compressed)?;
        let entry = self.entry;
        let mut cursor = 0;

        let presence_end = cursor + entry.presence_bytes;
        if presence_end > bytes.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let presence = PresenceBitmap::from_bytes(&bytes[cursor..presence_end], self.row_count);
        cursor = presence_end;

        if presence.count_present() != entry.value_count_present {
            return Err(self.corrupt(format!(
                "presence bitmap marks {} values, directory says {}",
                presence.count_present(),
                entry.value_count_present
            )));
        }

        let tag_end = cursor + entry.tag_bytes;
        if tag_end > bytes.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let tags = TagUnpacker::new(&bytes[cursor..tag_end], entry.value_count_present)
            .collect_tags()?;
        cursor = tag_end;
        if tags.len() != entry.value_count_present {
            return Err(self.corrupt("tag stream shorter than value count"));
        }

        if let Some(declared) = entry.declared_type {
            if declared != TypeTag::Null && tags.iter().any(|t| *t != declared && *t != TypeTag::Null) {
                return Err(self.corrupt(format!(
                    "cell tags disagree with declared type {:?}",
                    declared
                )));
            }
        }

        let count = |wanted: TypeTag| tags.iter().filter(|t| **t == wanted).count();

        let bool_count = count(TypeTag::Bool);
        let bool_bytes = (bool_count + 7) >> 3;
        let bools = unpack_bools(bytes.get(cursor..).unwrap_or(&[]), bool_count)?;
        cursor += bool_bytes;

        let int_count = count(TypeTag::Int);
        let mut ints = Vec::with_capacity(int_count);
        for _ in 0..int_count {
            ints.push(zigzag_decode(read_uleb128(&bytes, &mut cursor)?));
        }

        let uint_count = count(TypeTag::UInt);
        let mut uints = Vec::with_capacity(uint_count);
        for _ in 0..uint_count {
            let value = read_uleb128(&bytes, &mut cursor)?;
            if i64::try_from(value).is_ok() {
                return Err(self.corrupt(format!("uint {} fits the int substream", value)));
            }
            uints.push(value);
        }

        let float_count = count(TypeTag::Float);
        let mut floats = Vec::with_capacity(float_count);
        for _ in 0..float_count {
            let end = cursor + 8;
            let raw = bytes.get(cursor..end).ok_or(FormatError::UnexpectedEof)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            floats.push(f64::from_bits(u64::from_le_bytes(buf)));
            cursor = end;
        }

        let string_count = count(TypeTag::String);
        let mut strings = Vec::with_capacity(string_count);
        for _ in 0..string_count {
            let len = read_uleb128_usize(&bytes, &mut cursor, "string length")?;
            Limits::check("String length", len, self.limits.max_string_len_per_value)?;
            let end = cursor.checked_add(len).ok_or(FormatError::UnexpectedEof)?;
            let raw = bytes.get(cursor..end).ok_or(FormatError::UnexpectedEof)?;
            let value = std::str::from_utf8(raw)
                .map_err(|_| self.corrupt("string is not UTF-8"))?
                .to_string();
            strings.push(value);
            cursor = end;
        }

        if cursor != bytes.len() {
            return Err(self.corrupt(format!(
                "{} trailing bytes after substreams",
                bytes.len() - cursor
            )));
        }

        // Reassemble cells in row order
        let mut bools = bools.into_iter();
        let mut ints = ints.into_iter();
        let mut uints = uints.into_iter();
        let mut floats = floats.into_iter();
        let mut strings = strings.into_iter();
        let mut tags = tags.into_iter();

        let mut cells = Vec::with_capacity(self.row_count);
        for row in 0..self.row_count {
            if !presence.is_present(row) {
                cells.push(Cell::Null);
                continue;
            }
            let tag = tags.next().ok_or_else(|| self.corrupt("ran out of tags"))?;
            let cell = match tag {
                TypeTag::Null => Some(Cell::Null),
                TypeTag::Bool => bools.next().map(Cell::Bool),
                TypeTag::Int => ints.next().map(Cell::Int),
                TypeTag::UInt => uints.next().map(Cell::UInt),
                TypeTag::Float => floats.next().map(Cell::Float),
                TypeTag::String => strings.next().map(Cell::Text),
            };
            cells.push(cell.ok_or_else(|| self.corrupt(format!("{:?} substream exhausted", tag)))?);
        }

        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::segment::ColumnSegment;
    use tabmask_format::Compression;

    fn entry_for(segment: &ColumnSegment, compressed: &[u8], compression: Compression) -> ColumnDirectoryEntry {
        ColumnDirectoryEntry {
            column_name: "col".to_string(),
            declared_type: None,
            compressor: compression.compressor_id(),
            compression_level: compression.level(),
            presence_bytes: segment.presence_bytes,
            tag_bytes: segment.tag_bytes,
            value_count_present: segment.value_count_present,
            segment_uncompressed_len: segment.uncompressed_payload.len(),
            segment_compressed_len: compressed.len(),
            segment_offset: 0,
        }
    }

    fn sample_cells() -> Vec<Cell> {
        vec![
            Cell::Int(-42),
            Cell::Null,
            Cell::Text("j.smith@email.com".into()),
            Cell::Bool(false),
            Cell::Float(2.5),
            Cell::Int(i64::MAX),
            Cell::UInt(u64::MAX),
            Cell::Text(String::new()),
        ]
    }

    #[test]
    fn test_decode_mixed_column() {
        let cells = sample_cells();
        for compression in [Compression::None, Compression::Zstd(3)] {
            let segment = ColumnSegment::build(&cells);
            let compressed = segment.compress(compression).unwrap();
            let entry = entry_for(&segment, &compressed, compression);
            let limits = Limits::default();

            let decoded = ColumnSegmentDecoder::new(&entry, cells.len(), &limits)
                .decode(&compressed)
                .unwrap();
            assert_eq!(decoded, cells);
        }
    }

    #[test]
    fn test_truncated_segment_fails() {
        let cells = sample_cells();
        let segment = ColumnSegment::build(&cells);
        let compressed = segment.compress(Compression::None).unwrap();
        let mut entry = entry_for(&segment, &compressed, Compression::None);
        let truncated = &compressed[..compressed.len() - 3];
        entry.segment_uncompressed_len = truncated.len();
        let limits = Limits::default();

        assert!(ColumnSegmentDecoder::new(&entry, cells.len(), &limits)
            .decode(truncated)
            .is_err());
    }

    #[test]
    fn test_declared_type_mismatch_fails() {
        let cells = vec![Cell::Int(1), Cell::Text("x".into())];
        let segment = ColumnSegment::build(&cells);
        let compressed = segment.compress(Compression::None).unwrap();
        let mut entry = entry_for(&segment, &compressed, Compression::None);
        entry.declared_type = Some(TypeTag::Int);
        let limits = Limits::default();

        match ColumnSegmentDecoder::new(&entry, cells.len(), &limits).decode(&compressed) {
            Err(FormatError::CorruptSegment { column, reason }) => {
                assert_eq!(column, "col");
                assert!(reason.contains("declared type"));
            }
            other => panic!("expected CorruptSegment, got {other:?}"),
        }
    }

    #[test]
    fn test_small_uint_rejected() {
        let cells = vec![Cell::UInt(5)];
        let segment = ColumnSegment::build(&cells);
        let compressed = segment.compress(Compression::None).unwrap();
        let entry = entry_for(&segment, &compressed, Compression::None);
        let limits = Limits::default();

        assert!(matches!(
            ColumnSegmentDecoder::new(&entry, 1, &limits).decode(&compressed),
            Err(FormatError::CorruptSegment { .. })
        ));
    }

    #[test]
    fn test_string_limit_enforced() {
        let cells = vec![Cell::Text("a long value".into())];
        let segment = ColumnSegment::build(&cells);
        let compressed = segment.compress(Compression::None).unwrap();
        let entry = entry_for(&segment, &compressed, Compression::None);
        let limits = Limits {
            max_string_len_per_value: 4,
            ..Limits::default()
        };

        assert!(matches!(
            ColumnSegmentDecoder::new(&entry, 1, &limits).decode(&compressed),
            Err(FormatError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_unknown_compressor() {
        let segment = ColumnSegment::build(&[Cell::Int(1)]);
        let compressed = segment.compress(Compression::None).unwrap();
        let mut entry = entry_for(&segment, &compressed, Compression::None);
        entry.compressor = 9;
        let limits = Limits::default();

        assert!(matches!(
            ColumnSegmentDecoder::new(&entry, 1, &limits).decode(&compressed),
            Err(FormatError::UnsupportedCompressor(9))
        ));
    }
}
