//! Error taxonomy shared by the reader and the redaction engine

use crate::kind::PayloadKind;
use crate::table::TableError;
use tabmask_format::FormatError;
use thiserror::Error;

/// Fatal failures of a read or redaction call
#[derive(Debug, Error)]
pub enum RedactError {
    /// The raw payload has zero length.
    #[error("{0} payload is blank")]
    EmptyInput(PayloadKind),
    /// The payload parsed but holds no data rows.
    #[error("{0} payload has no content")]
    NoContent(PayloadKind),
    /// The declared delimiter never occurs in a text payload.
    #[error("delimiter {delimiter:?} not found in text payload")]
    Delimiter {
        /// Delimiter the caller declared.
        delimiter: char,
    },
    /// The payload kind is unknown or has no codec registered.
    #[error("unsupported payload kind: {0}")]
    UnsupportedKind(String),
    /// A requested field is absent and the caller asked for strict handling.
    #[error("pii field \"{0}\" not found in file")]
    FieldNotFound(String),
    /// The payload does not parse as its declared kind.
    #[error("malformed {kind} payload: {reason}")]
    MalformedInput {
        /// Kind the payload was declared as.
        kind: PayloadKind,
        /// Parser diagnostic.
        reason: String,
    },
    /// An invariant broke while masking or re-encoding.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RedactError {
    /// Build a `MalformedInput` from any displayable parser failure
    pub fn malformed(kind: PayloadKind, reason: impl std::fmt::Display) -> Self {
        RedactError::MalformedInput {
            kind,
            reason: reason.to_string(),
        }
    }

    /// Build an `Internal` from any displayable failure
    pub fn internal(reason: impl std::fmt::Display) -> Self {
        RedactError::Internal(reason.to_string())
    }

    /// Stable name of the error class, used as a structured log field
    pub fn kind_label(&self) -> &'static str {
        match self {
            RedactError::EmptyInput(_) => "EmptyInputError",
            RedactError::NoContent(_) => "NoContentError",
            RedactError::Delimiter { .. } => "DelimiterError",
            RedactError::UnsupportedKind(_) => "UnsupportedKindError",
            RedactError::FieldNotFound(_) => "FieldNotFoundError",
            RedactError::MalformedInput { .. } => "MalformedInputError",
            RedactError::Internal(_) => "InternalError",
        }
    }

    /// Whether this error aborts a call under every policy.
    ///
    /// `FieldNotFound` is only raised when the caller opted into strict
    /// handling; by default it is reported as a finding instead.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RedactError::FieldNotFound(_))
    }
}

impl From<TableError> for RedactError {
    fn from(err: TableError) -> Self {
        RedactError::Internal(err.to_string())
    }
}

impl From<FormatError> for RedactError {
    /// Container faults on the decode path surface as malformed input.
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Internal(msg) => RedactError::Internal(msg),
            other => RedactError::malformed(PayloadKind::ColumnarBinary, other),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RedactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        assert_eq!(
            RedactError::EmptyInput(PayloadKind::Text).to_string(),
            "text payload is blank"
        );
        assert_eq!(
            RedactError::NoContent(PayloadKind::Text).to_string(),
            "text payload has no content"
        );
        assert_eq!(
            RedactError::FieldNotFound("location".into()).to_string(),
            "pii field \"location\" not found in file"
        );
    }

    #[test]
    fn test_format_errors_map_to_malformed() {
        let err: RedactError = FormatError::InvalidMagic.into();
        assert!(matches!(
            err,
            RedactError::MalformedInput {
                kind: PayloadKind::ColumnarBinary,
                ..
            }
        ));
        assert_eq!(err.kind_label(), "MalformedInputError");

        let err: RedactError = FormatError::Internal("boom".into()).into();
        assert_eq!(err.kind_label(), "InternalError");
    }
}
