//! Payload kinds and the tagged raw payload

use crate::error::RedactError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default delimiter for text payloads
pub const DEFAULT_DELIMITER: u8 = b',';

/// Wire representation of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// Delimited text with a header line
    Text,
    /// JSON records, as an array or one object per line
    RecordList,
    /// The self-describing columnar binary container
    ColumnarBinary,
}

impl PayloadKind {
    /// All supported kinds
    pub const ALL: [PayloadKind; 3] = [
        PayloadKind::Text,
        PayloadKind::RecordList,
        PayloadKind::ColumnarBinary,
    ];

    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::RecordList => "record-list",
            PayloadKind::ColumnarBinary => "columnar-binary",
        }
    }

    /// Kind implied by a file extension (without the dot), case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(PayloadKind::Text),
            "json" => Some(PayloadKind::RecordList),
            "pqt" | "parquet" => Some(PayloadKind::ColumnarBinary),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadKind {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "csv" => Ok(PayloadKind::Text),
            "record-list" | "records" | "json" => Ok(PayloadKind::RecordList),
            "columnar-binary" | "columnar" | "pqt" | "parquet" => Ok(PayloadKind::ColumnarBinary),
            _ => Err(RedactError::UnsupportedKind(s.to_string())),
        }
    }
}

/// Raw payload tagged with its declared kind.
///
/// The bytes are shared and never written through; re-encoding always
/// produces a fresh buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Delimited text
    Text {
        /// Raw text bytes
        data: Bytes,
        /// Single-byte field delimiter
        delimiter: u8,
    },
    /// JSON record list
    RecordList {
        /// Raw JSON bytes
        data: Bytes,
    },
    /// Columnar binary container
    ColumnarBinary {
        /// Raw container bytes
        data: Bytes,
    },
}

impl Payload {
    /// Comma-delimited text payload
    pub fn text(data: impl Into<Bytes>) -> Self {
        Self::text_with_delimiter(data, DEFAULT_DELIMITER)
    }

    /// Text payload with a custom delimiter
    pub fn text_with_delimiter(data: impl Into<Bytes>, delimiter: u8) -> Self {
        Payload::Text {
            data: data.into(),
            delimiter,
        }
    }

    /// JSON record list payload
    pub fn record_list(data: impl Into<Bytes>) -> Self {
        Payload::RecordList { data: data.into() }
    }

    /// Columnar binary payload
    pub fn columnar(data: impl Into<Bytes>) -> Self {
        Payload::ColumnarBinary { data: data.into() }
    }

    /// Build a payload of `kind`; `delimiter` only applies to text
    pub fn from_kind(kind: PayloadKind, data: impl Into<Bytes>, delimiter: u8) -> Self {
        match kind {
            PayloadKind::Text => Self::text_with_delimiter(data, delimiter),
            PayloadKind::RecordList => Self::record_list(data),
            PayloadKind::ColumnarBinary => Self::columnar(data),
        }
    }

    /// Declared kind
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text { .. } => PayloadKind::Text,
            Payload::RecordList { .. } => PayloadKind::RecordList,
            Payload::ColumnarBinary { .. } => PayloadKind::ColumnarBinary,
        }
    }

    /// Raw bytes
    pub fn data(&self) -> &Bytes {
        match self {
            Payload::Text { data, .. }
            | Payload::RecordList { data }
            | Payload::ColumnarBinary { data } => data,
        }
    }

    /// Length of the raw bytes
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the raw bytes are zero-length
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}
