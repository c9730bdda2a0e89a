//! Redaction engine
//!
//! Decodes a payload through the codec set, checks the requested fields
//! against the discovered columns, swaps every requested column for a
//! column of [`MASK`](tabmask_codec::MASK) literals and re-encodes with
//! the codec that read it.

use bytes::Bytes;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tabmask_codec::{
    CodecSet, ColumnarOptions, Column, Decoded, Payload, PayloadKind, RedactError, Result,
    TabularModel, DEFAULT_DELIMITER,
};
use tracing::{error, info};

/// How a requested field that is absent from the schema is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Record a finding and keep going
    #[default]
    Report,
    /// Abort the call with `FieldNotFound`
    Reject,
}

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct RedactOptions {
    /// Missing field handling
    pub missing_fields: MissingFieldPolicy,
    /// Columnar container options
    pub columnar: ColumnarOptions,
}

/// Set of case-sensitive column names to redact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    names: BTreeSet<String>,
}

impl FieldMask {
    /// Empty mask
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field name; duplicates collapse
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Whether `name` is requested
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names were requested
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldMask {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Non-fatal diagnostic attached to a successful call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", content = "field", rename_all = "snake_case")]
pub enum Finding {
    /// The mask was empty; output is a plain re-encode
    NoFieldsRequested,
    /// A requested field is not a column of the payload
    FieldNotFound(String),
}

impl Finding {
    /// Whether the finding is reported at error level
    pub fn is_error(&self) -> bool {
        matches!(self, Finding::FieldNotFound(_))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NoFieldsRequested => f.write_str("no pii fields requested"),
            Finding::FieldNotFound(name) => {
                write!(f, "{}", RedactError::FieldNotFound(name.clone()))
            }
        }
    }
}

/// Shape of a completed redaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionSummary {
    /// Rows in the payload
    pub rows: usize,
    /// Columns in the payload
    pub columns: usize,
    /// Names of the masked columns, in column order
    pub masked_columns: Vec<String>,
}

/// Redacted payload plus everything reported along the way
#[derive(Debug, Clone)]
pub struct RedactionResult {
    /// Freshly encoded payload of the input's kind
    pub payload: Payload,
    /// Non-fatal findings, in the order they were raised
    pub findings: Vec<Finding>,
    /// Row, column and mask counts
    pub summary: RedactionSummary,
}

impl RedactionResult {
    /// Kind of the output payload
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Output bytes
    pub fn data(&self) -> &Bytes {
        self.payload.data()
    }

    /// Fields that were requested but not found
    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().filter_map(|finding| match finding {
            Finding::FieldNotFound(name) => Some(name.as_str()),
            Finding::NoFieldsRequested => None,
        })
    }
}

/// Stateless redaction engine; safe to share across threads
pub struct Redactor {
    codecs: CodecSet,
    opts: RedactOptions,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(RedactOptions::default())
    }
}

impl Redactor {
    /// Engine with the standard codecs
    pub fn new(opts: RedactOptions) -> Self {
        Self {
            codecs: CodecSet::standard(opts.columnar.clone()),
            opts,
        }
    }

    /// Engine over a custom codec set
    pub fn with_codecs(codecs: CodecSet, opts: RedactOptions) -> Self {
        Self { codecs, opts }
    }

    /// Options in effect
    pub fn options(&self) -> &RedactOptions {
        &self.opts
    }

    /// Codecs used for decoding and re-encoding
    pub fn codecs(&self) -> &CodecSet {
        &self.codecs
    }

    /// Redact `mask` from `payload`, returning a payload of the same kind.
    ///
    /// The input bytes are only read. Fatal errors are logged before they
    /// are returned.
    pub fn redact(&self, payload: &Payload, mask: &FieldMask) -> Result<RedactionResult> {
        let result = self.redact_inner(payload, mask);
        if let Err(err) = &result {
            error!(
                kind = %payload.kind(),
                error_kind = err.kind_label(),
                "{}",
                err
            );
        }
        result
    }

    /// Redact a payload whose kind is only known as a string tag.
    ///
    /// `delimiter` is ignored for non-text kinds and defaults to a comma.
    pub fn redact_tagged(
        &self,
        raw: impl Into<Bytes>,
        kind_tag: &str,
        delimiter: Option<u8>,
        mask: &FieldMask,
    ) -> Result<RedactionResult> {
        let kind = match kind_tag.parse::<PayloadKind>() {
            Ok(kind) => kind,
            Err(err) => {
                error!(kind = kind_tag, error_kind = err.kind_label(), "{}", err);
                return Err(err);
            }
        };
        let payload = Payload::from_kind(kind, raw, delimiter.unwrap_or(DEFAULT_DELIMITER));
        self.redact(&payload, mask)
    }

    /// Redact independent payloads on the rayon pool.
    ///
    /// Results line up with `payloads` by index.
    pub fn redact_batch(
        &self,
        payloads: &[Payload],
        mask: &FieldMask,
    ) -> Vec<Result<RedactionResult>> {
        payloads
            .par_iter()
            .map(|payload| self.redact(payload, mask))
            .collect()
    }

    fn redact_inner(&self, payload: &Payload, mask: &FieldMask) -> Result<RedactionResult> {
        let mut findings = Vec::new();
        if mask.is_empty() {
            info!(kind = %payload.kind(), "no pii fields requested");
            findings.push(Finding::NoFieldsRequested);
        }

        let Decoded { model, layout } = self.codecs.read(payload)?;

        for name in mask.iter().filter(|name| !model.has_column(name)) {
            let err = RedactError::FieldNotFound(name.to_string());
            match self.opts.missing_fields {
                MissingFieldPolicy::Reject => return Err(err),
                MissingFieldPolicy::Report => {
                    error!(field = name, error_kind = err.kind_label(), "{}", err);
                    findings.push(Finding::FieldNotFound(name.to_string()));
                }
            }
        }

        let (masked, masked_columns) = mask_model(&model, mask)?;
        let payload = self
            .codecs
            .write(&masked, &layout)
            .map_err(|err| match err {
                RedactError::Internal(_) => err,
                other => RedactError::internal(other),
            })?;

        let summary = RedactionSummary {
            rows: masked.row_count(),
            columns: masked.column_count(),
            masked_columns,
        };
        info!(
            kind = %payload.kind(),
            rows = summary.rows,
            columns = summary.columns,
            masked = summary.masked_columns.len(),
            findings = findings.len(),
            "redaction complete"
        );

        Ok(RedactionResult {
            payload,
            findings,
            summary,
        })
    }
}

/// New model in the original column order with every requested column
/// replaced by mask literals declared as text.
pub fn mask_model(model: &TabularModel, mask: &FieldMask) -> Result<(TabularModel, Vec<String>)> {
    let rows = model.row_count();
    let mut masked_columns = Vec::new();
    let columns = model
        .columns()
        .iter()
        .map(|column| {
            if mask.contains(column.name()) {
                masked_columns.push(column.name().to_string());
                Column::masked(column.name(), rows)
            } else {
                column.clone()
            }
        })
        .collect();

    let masked = TabularModel::new(columns, rows)?;
    debug_assert!(masked
        .columns()
        .iter()
        .filter(|c| mask.contains(c.name()))
        .all(|c| c.cells().iter().all(|cell| cell.is_mask())));
    Ok((masked, masked_columns))
}

/// Redact with the default engine
pub fn redact(payload: &Payload, mask: &FieldMask) -> Result<RedactionResult> {
    Redactor::default().redact(payload, mask)
}
