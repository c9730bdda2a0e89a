//! tabmask Format - Core primitives for the columnar binary container
//!
//! This crate provides the byte-level building blocks of the container used
//! for `ColumnarBinary` payloads, with no I/O dependencies:
//!
//! - Magic numbers and constants
//! - Variable-length integer encoding (ULEB128/ZigZag)
//! - Bit packing for presence bitmaps, type tags, and booleans
//! - CRC32C checksums
//! - File header and column directory structures
//! - Security limits
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bitpack;
pub mod checksum;
pub mod constants;
pub mod directory;
pub mod error;
pub mod header;
pub mod limits;
pub mod types;
pub mod varint;

// Re-export commonly used types
pub use directory::{ColumnDirectory, ColumnDirectoryEntry};
pub use error::{FormatError, Result};
pub use header::{FileHeader, OriginHint};
pub use limits::Limits;
pub use types::TypeTag;

/// Segment compression options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Zstandard compression with specified level (1-22)
    Zstd(u8),
}

impl Compression {
    /// Get the compressor ID for this codec
    pub fn compressor_id(&self) -> u8 {
        match self {
            Compression::None => constants::COMPRESSOR_NONE,
            Compression::Zstd(_) => constants::COMPRESSOR_ZSTD,
        }
    }

    /// Get the compression level for this codec
    pub fn level(&self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Zstd(level) => *level,
        }
    }

    /// Rebuild from the ids stored in a header or directory entry
    pub fn from_parts(compressor: u8, level: u8) -> Result<Self> {
        match compressor {
            constants::COMPRESSOR_NONE => Ok(Compression::None),
            constants::COMPRESSOR_ZSTD => Ok(Compression::Zstd(level)),
            other => Err(FormatError::UnsupportedCompressor(other)),
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zstd(3)
    }
}
