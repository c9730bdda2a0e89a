//! JSON invocation document and the extract, redact, return pipeline

use crate::engine::{FieldMask, RedactionResult, Redactor};
use crate::extract::{extract, ExtractError, ObjectStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmask_codec::RedactError;
use thiserror::Error;

/// `{"file_to_obfuscate": "<locator>", "pii_fields": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionRequest {
    file_to_obfuscate: Value,
    #[serde(default)]
    pii_fields: Vec<String>,
}

/// Failures of a full request
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request document is not valid JSON of the expected shape
    #[error("invalid request: {0}")]
    Parse(#[from] serde_json::Error),
    /// The payload could not be located or fetched
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// Redaction failed
    #[error(transparent)]
    Redact(#[from] RedactError),
}

impl RedactionRequest {
    /// Build a request for `locator`
    pub fn new<S: Into<String>>(
        locator: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            file_to_obfuscate: Value::String(locator.into()),
            pii_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a request document
    pub fn from_json(doc: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(doc)
    }

    /// The locator, which must be a JSON string
    pub fn locator(&self) -> Result<&str, ExtractError> {
        self.file_to_obfuscate.as_str().ok_or_else(|| {
            ExtractError::InvalidLocator(format!(
                "file_to_obfuscate must be a string, got {}",
                self.file_to_obfuscate
            ))
        })
    }

    /// Requested fields as a mask
    pub fn mask(&self) -> FieldMask {
        self.pii_fields.iter().map(String::as_str).collect()
    }

    /// Extract the payload from `store` and redact it
    pub fn run(
        &self,
        store: &dyn ObjectStore,
        redactor: &Redactor,
    ) -> Result<RedactionResult, RequestError> {
        let payload = extract(self.locator()?, store)?;
        Ok(redactor.redact(&payload, &self.mask())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_document() {
        let request = RedactionRequest::from_json(
            r#"{"file_to_obfuscate": "s3://my_ingestion_bucket/new_data/file1.csv",
                "pii_fields": ["name", "email_address"]}"#,
        )
        .unwrap();
        assert_eq!(
            request.locator().unwrap(),
            "s3://my_ingestion_bucket/new_data/file1.csv"
        );
        assert_eq!(
            request.mask().iter().collect::<Vec<_>>(),
            ["email_address", "name"]
        );
        assert_eq!(
            request,
            RedactionRequest::new(
                "s3://my_ingestion_bucket/new_data/file1.csv",
                ["name", "email_address"]
            )
        );
    }

    #[test]
    fn test_non_string_locator_rejected() {
        let request =
            RedactionRequest::from_json(r#"{"file_to_obfuscate": 42, "pii_fields": []}"#).unwrap();
        assert!(matches!(
            request.locator(),
            Err(ExtractError::InvalidLocator(_))
        ));
    }

    #[test]
    fn test_missing_pii_fields_defaults_empty() {
        let request = RedactionRequest::from_json(r#"{"file_to_obfuscate": "a.csv"}"#).unwrap();
        assert!(request.mask().is_empty());
    }
}
