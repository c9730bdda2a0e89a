//! Error types for the columnar container format

use thiserror::Error;

/// Container-level error types
#[derive(Debug, Error)]
pub enum FormatError {
    /// Input does not start with the expected container magic bytes.
    #[error("Invalid magic bytes")]
    InvalidMagic,
    /// Container version is not supported by this decoder.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u8),
    /// File header contents are inconsistent or corrupt.
    #[error("Corrupt header: {0}")]
    CorruptHeader(String),
    /// Column directory is corrupt or disagrees with the header.
    #[error("Corrupt column directory: {0}")]
    CorruptDirectory(String),
    /// A column segment fails validation.
    #[error("Corrupt segment for column '{column}': {reason}")]
    CorruptSegment {
        /// Column whose segment failed to decode.
        column: String,
        /// What was wrong with it.
        reason: String,
    },
    /// CRC32C verification failed for the directory and segments.
    #[error("Checksum mismatch (expected {expected:#010x}, computed {actual:#010x})")]
    ChecksumMismatch {
        /// Checksum stored in the trailer.
        expected: u32,
        /// Checksum computed over the received bytes.
        actual: u32,
    },
    /// Encountered unexpected end of input.
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// Underlying compression codec reported an error.
    #[error("Compression error: {0}")]
    Compression(String),
    /// A configured security limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// Encountered a feature that the implementation does not support.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    /// Encountered an unknown compressor id.
    #[error("Unsupported compressor: {0}")]
    UnsupportedCompressor(u8),
    /// Internal invariant was violated while encoding.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FormatError>;
