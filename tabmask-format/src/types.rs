//! Type tag enumeration

use crate::constants::{
    DECLARED_MIXED, TAG_BOOL, TAG_FLOAT, TAG_INT, TAG_NULL, TAG_STRING, TAG_UINT,
};
use crate::error::{FormatError, Result};

/// Type tag codes (3-bit on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Present but null
    Null = TAG_NULL,
    /// Boolean value
    Bool = TAG_BOOL,
    /// Signed integer value
    Int = TAG_INT,
    /// Floating point value
    Float = TAG_FLOAT,
    /// String value
    String = TAG_STRING,
    /// Unsigned integer too large for `Int`
    UInt = TAG_UINT,
}

impl TypeTag {
    /// Convert from the packed 3-bit value
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            TAG_NULL => Ok(TypeTag::Null),
            TAG_BOOL => Ok(TypeTag::Bool),
            TAG_INT => Ok(TypeTag::Int),
            TAG_FLOAT => Ok(TypeTag::Float),
            TAG_STRING => Ok(TypeTag::String),
            TAG_UINT => Ok(TypeTag::UInt),
            6..=7 => Err(FormatError::UnsupportedFeature(format!(
                "Reserved type tag {}",
                val
            ))),
            _ => Err(FormatError::UnsupportedFeature(format!(
                "Unknown type tag: {}",
                val
            ))),
        }
    }

    /// Encode a column's declared type, `None` meaning mixed
    pub fn declared_to_u8(declared: Option<TypeTag>) -> u8 {
        declared.map(|tag| tag as u8).unwrap_or(DECLARED_MIXED)
    }

    /// Decode a column's declared type byte
    pub fn declared_from_u8(val: u8) -> Result<Option<TypeTag>> {
        if val == DECLARED_MIXED {
            Ok(None)
        } else {
            TypeTag::from_u8(val).map(Some)
        }
    }
}
