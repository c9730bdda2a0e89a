//! tabmask codecs - tabular model and payload codecs
//!
//! Every payload kind decodes into one [`TabularModel`] and encodes back
//! from it:
//!
//! - [`TextCodec`] for delimited text with a header line
//! - [`RecordListCodec`] for JSON arrays of objects and NDJSON
//! - [`ColumnarCodec`] for the self-describing columnar container
//!
//! [`CodecSet`] dispatches on [`PayloadKind`] and remembers enough of the
//! source [`Layout`] to write the same shape back out.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod columnar;
pub mod error;
pub mod kind;
pub mod records;
pub mod table;
pub mod text;

pub use tabmask_format::{Compression, FormatError, Limits, OriginHint};

pub use codec::{read, write, CodecSet, Decoded, Layout, PayloadCodec};
pub use columnar::{ColumnarCodec, ColumnarOptions, ContainerInfo};
pub use error::{RedactError, Result};
pub use kind::{Payload, PayloadKind, DEFAULT_DELIMITER};
pub use records::{RecordContainer, RecordListCodec};
pub use table::{Cell, CellType, Column, TableError, TabularModel, MASK};
pub use text::TextCodec;
