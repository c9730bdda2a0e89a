//! Constants and magic numbers for the columnar container

/// File magic bytes: "TBC" + version 0x01
pub const FILE_MAGIC: [u8; 4] = [0x54, 0x42, 0x43, 0x01]; // "TBC\x01"

/// Column directory magic: "DIR1"
pub const DIRECTORY_MAGIC: u32 = 0x3152_4944; // "DIR1"

/// Compressor ID for uncompressed segments.
pub const COMPRESSOR_NONE: u8 = 0;
/// Compressor ID for Zstandard segments.
pub const COMPRESSOR_ZSTD: u8 = 1;

/// Bit offset for the origin hint stored in the header flags.
pub const FLAG_ORIGIN_HINT_SHIFT: u32 = 0;
/// Mask covering the two bits reserved for the origin hint.
pub const FLAG_ORIGIN_HINT_MASK: u32 = 0b11 << FLAG_ORIGIN_HINT_SHIFT;
/// Every flag bit this version understands. Others must be zero.
pub const FLAG_KNOWN_MASK: u32 = FLAG_ORIGIN_HINT_MASK;

/// Type tag representing a `null` value.
pub const TAG_NULL: u8 = 0;
/// Type tag representing a boolean value.
pub const TAG_BOOL: u8 = 1;
/// Type tag representing a signed 64-bit integer.
pub const TAG_INT: u8 = 2;
/// Type tag representing an IEEE-754 double.
pub const TAG_FLOAT: u8 = 3;
/// Type tag representing a UTF-8 string.
pub const TAG_STRING: u8 = 4;
/// Type tag representing an unsigned integer above `i64::MAX`.
pub const TAG_UINT: u8 = 5;

/// Declared column type byte for columns whose cells mix types.
pub const DECLARED_MIXED: u8 = 0xFF;

/// Size of the CRC32C trailer in bytes.
pub const TRAILER_LEN: usize = 4;
