//! Self-describing columnar container
//!
//! Layout: header, column directory, one segment per column, then a
//! CRC32C over directory and segments.

mod segment;
mod segment_decode;

pub use segment::ColumnSegment;
pub use segment_decode::ColumnSegmentDecoder;

use crate::codec::{Decoded, Layout, PayloadCodec};
use crate::error::{RedactError, Result};
use crate::kind::{Payload, PayloadKind};
use crate::table::{CellType, Column, TabularModel};
use bytes::Bytes;
use tabmask_format::checksum::{compute_crc32c, verify_crc32c};
use tabmask_format::constants::TRAILER_LEN;
use tabmask_format::{
    ColumnDirectory, ColumnDirectoryEntry, Compression, FileHeader, FormatError, Limits,
    OriginHint, TypeTag,
};
use tracing::trace;

/// Options for reading and writing columnar containers
#[derive(Debug, Clone, Default)]
pub struct ColumnarOptions {
    /// Compression for freshly written containers
    pub compression: Compression,
    /// Decoder resource limits
    pub limits: Limits,
}

/// Codec for the columnar container
#[derive(Debug, Clone, Default)]
pub struct ColumnarCodec {
    opts: ColumnarOptions,
}

/// Header and directory of a container, without segment contents
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Decoded file header
    pub header: FileHeader,
    /// Per-column directory
    pub directory: ColumnDirectory,
    /// Total container size in bytes
    pub total_len: usize,
}

impl ColumnarCodec {
    /// Create a codec with the given options
    pub fn new(opts: ColumnarOptions) -> Self {
        Self { opts }
    }

    /// Options in effect
    pub fn options(&self) -> &ColumnarOptions {
        &self.opts
    }

    /// Read header and directory, verifying framing and checksum
    pub fn inspect(&self, data: &[u8]) -> std::result::Result<ContainerInfo, FormatError> {
        let (info, _) = self.split(data)?;
        Ok(info)
    }

    fn split<'a>(
        &self,
        data: &'a [u8],
    ) -> std::result::Result<(ContainerInfo, &'a [u8]), FormatError> {
        let limits = &self.opts.limits;
        let (header, header_len) = FileHeader::decode(data, limits)?;

        let rest = &data[header_len..];
        let (directory, directory_len) =
            ColumnDirectory::decode(rest, header.column_count, header.row_count, limits)?;

        let segment_area = directory.segment_area_len()?;
        let expected = directory_len
            .checked_add(segment_area)
            .and_then(|len| len.checked_add(TRAILER_LEN))
            .ok_or_else(|| FormatError::CorruptDirectory("segment overflow".to_string()))?;
        if rest.len() < expected {
            return Err(FormatError::UnexpectedEof);
        }
        if rest.len() > expected {
            return Err(FormatError::CorruptDirectory(format!(
                "{} bytes after checksum trailer",
                rest.len() - expected
            )));
        }

        let covered = &rest[..directory_len + segment_area];
        let trailer = &rest[directory_len + segment_area..];
        let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        verify_crc32c(covered, stored)?;

        let segments = &rest[directory_len..directory_len + segment_area];
        Ok((
            ContainerInfo {
                header,
                directory,
                total_len: data.len(),
            },
            segments,
        ))
    }

    fn decode_container(
        &self,
        data: &[u8],
    ) -> std::result::Result<(FileHeader, TabularModel), FormatError> {
        let (info, segments) = self.split(data)?;
        let ContainerInfo {
            header, directory, ..
        } = info;
        let row_count = header.row_count;

        let mut columns = Vec::with_capacity(directory.entries.len());
        for entry in &directory.entries {
            let start = entry.segment_offset;
            let end = start + entry.segment_compressed_len;
            let cells = ColumnSegmentDecoder::new(entry, row_count, &self.opts.limits)
                .decode(&segments[start..end])?;
            trace!(
                column = %entry.column_name,
                compressed = entry.segment_compressed_len,
                uncompressed = entry.segment_uncompressed_len,
                "decoded segment"
            );
            columns.push(Column::with_declared(
                entry.column_name.clone(),
                entry.declared_type.map(cell_type_of),
                cells,
            ));
        }

        let model = TabularModel::new(columns, row_count)
            .map_err(|e| FormatError::CorruptDirectory(e.to_string()))?;
        Ok((header, model))
    }

    /// Serialize a model into a complete container
    pub fn encode_container(
        &self,
        model: &TabularModel,
        compression: Compression,
        origin: OriginHint,
        metadata: &[u8],
    ) -> std::result::Result<Vec<u8>, FormatError> {
        let limits = &self.opts.limits;
        Limits::check("Row count", model.row_count(), limits.max_rows)?;
        Limits::check("Column count", model.column_count(), limits.max_columns)?;
        Limits::check("Metadata length", metadata.len(), limits.max_metadata_len)?;

        let mut header = FileHeader {
            flags: 0,
            default_compressor: compression.compressor_id(),
            default_compression_level: compression.level(),
            row_count: model.row_count(),
            column_count: model.column_count(),
            user_metadata: metadata.to_vec(),
        };
        header.set_origin_hint(origin);

        let mut entries = Vec::with_capacity(model.column_count());
        let mut segments = Vec::new();
        for column in model.columns() {
            let segment = ColumnSegment::build(column.cells());
            Limits::check(
                "Segment uncompressed length",
                segment.uncompressed_payload.len(),
                limits.max_segment_uncompressed_len,
            )?;
            let compressed = segment.compress(compression)?;

            entries.push(ColumnDirectoryEntry {
                column_name: column.name().to_string(),
                declared_type: column.declared_type().map(type_tag_of),
                compressor: compression.compressor_id(),
                compression_level: compression.level(),
                presence_bytes: segment.presence_bytes,
                tag_bytes: segment.tag_bytes,
                value_count_present: segment.value_count_present,
                segment_uncompressed_len: segment.uncompressed_payload.len(),
                segment_compressed_len: compressed.len(),
                segment_offset: segments.len(),
            });
            segments.extend_from_slice(&compressed);
        }

        let directory = ColumnDirectory { entries }.encode();
        let mut out = header.encode();
        let covered_start = out.len();
        out.extend_from_slice(&directory);
        out.extend_from_slice(&segments);
        let crc = compute_crc32c(&out[covered_start..]);
        out.extend_from_slice(&crc.to_le_bytes());
        Ok(out)
    }
}

impl PayloadCodec for ColumnarCodec {
    fn kind(&self) -> PayloadKind {
        PayloadKind::ColumnarBinary
    }

    fn decode(&self, payload: &Payload) -> Result<Decoded> {
        let Payload::ColumnarBinary { data } = payload else {
            return Err(RedactError::internal(format!(
                "columnar codec handed a {} payload",
                payload.kind()
            )));
        };
        if data.is_empty() {
            return Err(RedactError::malformed(
                PayloadKind::ColumnarBinary,
                "zero-length container",
            ));
        }

        let (header, model) = self.decode_container(data)?;
        let compression =
            Compression::from_parts(header.default_compressor, header.default_compression_level)?;
        let origin = header.origin_hint()?;

        Ok(Decoded {
            model,
            layout: Layout::ColumnarBinary {
                compression,
                origin,
                metadata: header.user_metadata,
            },
        })
    }

    fn encode(&self, model: &TabularModel, layout: &Layout) -> Result<Bytes> {
        let Layout::ColumnarBinary {
            compression,
            origin,
            metadata,
        } = layout
        else {
            return Err(RedactError::internal(
                "columnar codec handed a non-columnar layout",
            ));
        };

        self.encode_container(model, *compression, *origin, metadata)
            .map(Bytes::from)
            .map_err(RedactError::internal)
    }
}

fn type_tag_of(ty: CellType) -> TypeTag {
    match ty {
        CellType::Null => TypeTag::Null,
        CellType::Bool => TypeTag::Bool,
        CellType::Int => TypeTag::Int,
        CellType::UInt => TypeTag::UInt,
        CellType::Float => TypeTag::Float,
        CellType::Text => TypeTag::String,
    }
}

fn cell_type_of(tag: TypeTag) -> CellType {
    match tag {
        TypeTag::Null => CellType::Null,
        TypeTag::Bool => CellType::Bool,
        TypeTag::Int => CellType::Int,
        TypeTag::UInt => CellType::UInt,
        TypeTag::Float => CellType::Float,
        TypeTag::String => CellType::Text,
    }
}
