//! tabmask I/O - redaction engine and its collaborators
//!
//! - [`Redactor`] masks columns of any payload kind and re-encodes it
//! - [`extract`] turns a locator into a kind-tagged [`Payload`]
//! - [`OutputSink`] writes the result out
//! - [`RedactionRequest`] runs the whole pipeline from a JSON document

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod extract;
pub mod request;
pub mod sink;

pub use tabmask_codec::{
    CodecSet, ColumnarOptions, Compression, Limits, Payload, PayloadKind, RedactError, Result,
    MASK,
};

pub use engine::{
    mask_model, redact, FieldMask, Finding, MissingFieldPolicy, RedactOptions, RedactionResult,
    RedactionSummary, Redactor,
};
pub use extract::{extract, ExtractError, LocalStore, Locator, ObjectStore};
pub use request::{RedactionRequest, RequestError};
pub use sink::OutputSink;
