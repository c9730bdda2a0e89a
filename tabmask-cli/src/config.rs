//! `tabmask.toml` loading

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabmask_io::{
    ColumnarOptions, Compression, LocalStore, MissingFieldPolicy, RedactOptions,
};
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tabmask.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub text: TextConfig,
    pub columnar: ColumnarConfig,
    pub redaction: RedactionConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub delimiter: char,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionName {
    None,
    Zstd,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnarConfig {
    pub compression: CompressionName,
    pub level: u8,
}

impl Default for ColumnarConfig {
    fn default() -> Self {
        Self {
            compression: CompressionName::Zstd,
            level: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RedactionConfig {
    pub missing_fields: MissingFieldPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `explicit`, else `tabmask.toml` if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.delimiter()?;
        if config.columnar.compression == CompressionName::Zstd
            && !(1..=22).contains(&config.columnar.level)
        {
            return Err(ConfigError::Invalid(format!(
                "columnar.level must be 1-22, got {}",
                config.columnar.level
            )));
        }
        Ok(config)
    }

    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        delimiter_byte(self.text.delimiter)
    }

    pub fn compression(&self) -> Compression {
        match self.columnar.compression {
            CompressionName::None => Compression::None,
            CompressionName::Zstd => Compression::Zstd(self.columnar.level),
        }
    }

    pub fn redact_options(&self) -> RedactOptions {
        RedactOptions {
            missing_fields: self.redaction.missing_fields,
            columnar: ColumnarOptions {
                compression: self.compression(),
                ..ColumnarOptions::default()
            },
        }
    }

    pub fn store(&self) -> LocalStore {
        match &self.storage.root {
            Some(root) => LocalStore::with_bucket_root(root),
            None => LocalStore::new(),
        }
    }
}

/// Delimiters are single ASCII bytes
pub fn delimiter_byte(delimiter: char) -> Result<u8, ConfigError> {
    if delimiter.is_ascii() && delimiter != '\n' && delimiter != '\r' && delimiter != '"' {
        Ok(delimiter as u8)
    } else {
        Err(ConfigError::Invalid(format!(
            "delimiter {:?} must be a single ASCII character other than a quote or newline",
            delimiter
        )))
    }
}
