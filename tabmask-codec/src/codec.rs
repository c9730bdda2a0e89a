//! Codec dispatch: one `PayloadCodec` per payload kind

use crate::columnar::{ColumnarCodec, ColumnarOptions};
use crate::error::{RedactError, Result};
use crate::kind::{Payload, PayloadKind, DEFAULT_DELIMITER};
use crate::records::{RecordContainer, RecordListCodec};
use crate::table::TabularModel;
use crate::text::TextCodec;
use bytes::Bytes;
use tabmask_format::{Compression, OriginHint};
use tracing::debug;

/// Encoding details recovered while decoding, needed to write the same
/// representation back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Delimited text
    Text {
        /// Field delimiter
        delimiter: u8,
    },
    /// JSON records
    RecordList {
        /// Array or one-object-per-line
        container: RecordContainer,
    },
    /// Columnar container
    ColumnarBinary {
        /// Segment compression
        compression: Compression,
        /// Origin hint carried in the header
        origin: OriginHint,
        /// Opaque header metadata
        metadata: Vec<u8>,
    },
}

impl Layout {
    /// Kind this layout writes
    pub fn kind(&self) -> PayloadKind {
        match self {
            Layout::Text { .. } => PayloadKind::Text,
            Layout::RecordList { .. } => PayloadKind::RecordList,
            Layout::ColumnarBinary { .. } => PayloadKind::ColumnarBinary,
        }
    }

    /// Fresh layout for writing `kind` when there is no source payload
    pub fn fresh(kind: PayloadKind, delimiter: u8, compression: Compression) -> Self {
        match kind {
            PayloadKind::Text => Layout::Text { delimiter },
            PayloadKind::RecordList => Layout::RecordList {
                container: RecordContainer::JsonArray,
            },
            PayloadKind::ColumnarBinary => Layout::ColumnarBinary {
                compression,
                origin: OriginHint::Unknown,
                metadata: Vec::new(),
            },
        }
    }

    /// Wrap encoded bytes as a payload of this layout's kind
    pub fn into_payload(&self, data: Bytes) -> Payload {
        match self {
            Layout::Text { delimiter } => Payload::text_with_delimiter(data, *delimiter),
            Layout::RecordList { .. } => Payload::record_list(data),
            Layout::ColumnarBinary { .. } => Payload::columnar(data),
        }
    }
}

/// Decoded model plus the layout it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The tabular model
    pub model: TabularModel,
    /// How the source was encoded
    pub layout: Layout,
}

/// Decoder/encoder for one payload kind
pub trait PayloadCodec: Send + Sync {
    /// Kind handled by this codec
    fn kind(&self) -> PayloadKind;

    /// Decode a non-empty payload of this codec's kind
    fn decode(&self, payload: &Payload) -> Result<Decoded>;

    /// Encode a model with the given layout
    fn encode(&self, model: &TabularModel, layout: &Layout) -> Result<Bytes>;
}

/// Set of codecs, at most one per kind
pub struct CodecSet {
    codecs: Vec<Box<dyn PayloadCodec>>,
}

impl Default for CodecSet {
    fn default() -> Self {
        Self::standard(ColumnarOptions::default())
    }
}

impl CodecSet {
    /// Empty set; every kind is unsupported until registered
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// All three built-in codecs
    pub fn standard(columnar: ColumnarOptions) -> Self {
        Self::empty()
            .with(TextCodec)
            .with(RecordListCodec)
            .with(ColumnarCodec::new(columnar))
    }

    /// Register a codec, replacing any codec of the same kind
    pub fn with(mut self, codec: impl PayloadCodec + 'static) -> Self {
        let kind = codec.kind();
        self.codecs.retain(|c| c.kind() != kind);
        self.codecs.push(Box::new(codec));
        self
    }

    /// Codec registered for `kind`
    pub fn codec_for(&self, kind: PayloadKind) -> Result<&dyn PayloadCodec> {
        self.codecs
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
            .ok_or_else(|| RedactError::UnsupportedKind(kind.to_string()))
    }

    /// Kinds with a registered codec
    pub fn kinds(&self) -> Vec<PayloadKind> {
        self.codecs.iter().map(|c| c.kind()).collect()
    }

    /// Decode a payload into a model.
    ///
    /// Zero-length text and record payloads fail before parsing; any
    /// payload that decodes to zero rows fails afterwards.
    pub fn read(&self, payload: &Payload) -> Result<Decoded> {
        let kind = payload.kind();
        let codec = self.codec_for(kind)?;

        if payload.is_empty() && matches!(kind, PayloadKind::Text | PayloadKind::RecordList) {
            return Err(RedactError::EmptyInput(kind));
        }

        debug!(kind = %kind, bytes = payload.len(), "decoding payload");
        let decoded = codec.decode(payload)?;
        if decoded.model.row_count() == 0 {
            return Err(RedactError::NoContent(kind));
        }
        Ok(decoded)
    }

    /// Encode a model into a new payload described by `layout`
    pub fn write(&self, model: &TabularModel, layout: &Layout) -> Result<Payload> {
        let codec = self.codec_for(layout.kind())?;
        let data = codec.encode(model, layout)?;
        Ok(layout.into_payload(data))
    }
}

/// Decode a payload with the standard codecs
pub fn read(payload: &Payload) -> Result<TabularModel> {
    CodecSet::default().read(payload).map(|decoded| decoded.model)
}

/// Encode a model as a fresh payload of `kind` with default options
pub fn write(model: &TabularModel, kind: PayloadKind) -> Result<Payload> {
    let layout = Layout::fresh(kind, DEFAULT_DELIMITER, Compression::default());
    CodecSet::default().write(model, &layout)
}
