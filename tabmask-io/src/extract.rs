//! Locating and fetching raw payloads

use bytes::Bytes;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tabmask_codec::{Payload, PayloadKind, DEFAULT_DELIMITER};
use thiserror::Error;
use tracing::{debug, error};

/// Failures while resolving or fetching a locator
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The locator is not a usable string or path
    #[error("invalid locator: {0}")]
    InvalidLocator(String),
    /// The locator's suffix maps to no payload kind
    #[error("unsupported file extension in '{locator}'")]
    UnsupportedExtension {
        /// Offending locator
        locator: String,
    },
    /// No object exists at the locator
    #[error("object not found: {0}")]
    NotFound(String),
    /// The storage backend cannot serve this locator
    #[error("storage backend unavailable for '{locator}': {reason}")]
    BackendUnavailable {
        /// Locator that was requested
        locator: String,
        /// Backend diagnostic
        reason: String,
    },
    /// Any other read failure
    #[error("failed to read '{locator}': {source}")]
    Io {
        /// Locator that was requested
        locator: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Parsed storage locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Local path, optionally written with a `file://` prefix
    Local(PathBuf),
    /// `s3://bucket/key`
    Bucket {
        /// Bucket name
        bucket: String,
        /// Object key
        key: String,
    },
}

impl Locator {
    /// Final path component's extension, without the dot
    pub fn extension(&self) -> Option<&str> {
        match self {
            Locator::Local(path) => path.extension().and_then(|ext| ext.to_str()),
            Locator::Bucket { key, .. } => Path::new(key).extension().and_then(|ext| ext.to_str()),
        }
    }

    /// Payload kind implied by the extension
    pub fn kind(&self) -> Result<PayloadKind, ExtractError> {
        self.extension()
            .and_then(PayloadKind::from_extension)
            .ok_or_else(|| ExtractError::UnsupportedExtension {
                locator: self.to_string(),
            })
    }
}

impl FromStr for Locator {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ExtractError::InvalidLocator("empty locator".to_string()));
        }

        if let Some(rest) = s.strip_prefix("s3://") {
            return match rest.split_once('/') {
                Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                    check_relative(s, "bucket", bucket)?;
                    check_relative(s, "key", key)?;
                    Ok(Locator::Bucket {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })
                }
                _ => Err(ExtractError::InvalidLocator(format!(
                    "'{}' is not of the form s3://bucket/key",
                    s
                ))),
            };
        }

        let path = s.strip_prefix("file://").unwrap_or(s);
        if path.contains("://") {
            return Err(ExtractError::InvalidLocator(format!(
                "unsupported scheme in '{}'",
                s
            )));
        }
        if path.is_empty() {
            return Err(ExtractError::InvalidLocator("empty path".to_string()));
        }
        Ok(Locator::Local(PathBuf::from(path)))
    }
}

/// Bucket and key parts may only hold plain path segments
fn check_relative(locator: &str, what: &str, part: &str) -> Result<(), ExtractError> {
    if Path::new(part)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Ok(())
    } else {
        Err(ExtractError::InvalidLocator(format!(
            "{} '{}' in '{}' escapes the bucket root",
            what, part, locator
        )))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Local(path) => write!(f, "{}", path.display()),
            Locator::Bucket { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}

/// Source of raw object bytes
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents at `locator`
    fn fetch(&self, locator: &Locator) -> Result<Bytes, ExtractError>;
}

/// Filesystem-backed store.
///
/// Bucket locators resolve to `<root>/<bucket>/<key>` once a root is set.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    bucket_root: Option<PathBuf>,
}

impl LocalStore {
    /// Store serving local paths only
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that also maps bucket locators under `root`
    pub fn with_bucket_root(root: impl Into<PathBuf>) -> Self {
        Self {
            bucket_root: Some(root.into()),
        }
    }

    fn resolve(&self, locator: &Locator) -> Result<PathBuf, ExtractError> {
        match locator {
            Locator::Local(path) => Ok(path.clone()),
            Locator::Bucket { bucket, key } => match &self.bucket_root {
                Some(root) => {
                    let locator = locator.to_string();
                    check_relative(&locator, "bucket", bucket)?;
                    check_relative(&locator, "key", key)?;
                    Ok(root.join(bucket).join(key))
                }
                None => Err(ExtractError::BackendUnavailable {
                    locator: locator.to_string(),
                    reason: "no bucket root configured".to_string(),
                }),
            },
        }
    }
}

impl ObjectStore for LocalStore {
    fn fetch(&self, locator: &Locator) -> Result<Bytes, ExtractError> {
        let path = self.resolve(locator)?;
        match fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ExtractError::NotFound(locator.to_string()))
            }
            Err(source) => Err(ExtractError::Io {
                locator: locator.to_string(),
                source,
            }),
        }
    }
}

/// Resolve `locator`, fetch it and tag it with the kind its suffix names.
///
/// Text payloads get the default comma delimiter.
pub fn extract(locator: &str, store: &dyn ObjectStore) -> Result<Payload, ExtractError> {
    let result = locator.parse::<Locator>().and_then(|parsed| {
        let kind = parsed.kind()?;
        let data = store.fetch(&parsed)?;
        debug!(locator = %parsed, kind = %kind, bytes = data.len(), "extracted payload");
        Ok(Payload::from_kind(kind, data, DEFAULT_DELIMITER))
    });

    if let Err(err) = &result {
        error!(locator, "{}", err);
    }
    result
}
