//! Security limits applied while decoding containers

/// Decoder limits guarding against oversized or hostile containers
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum rows per container (default: 10,000,000)
    pub max_rows: usize,
    /// Maximum columns per container (default: 4,096)
    pub max_columns: usize,
    /// Maximum uncompressed segment length (default: 256 MiB)
    pub max_segment_uncompressed_len: usize,
    /// Maximum string length per value, column names included (default: 16 MiB)
    pub max_string_len_per_value: usize,
    /// Maximum user metadata length in the file header (default: 1 MiB)
    pub max_metadata_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rows: 10_000_000,
            max_columns: 4_096,
            max_segment_uncompressed_len: 256 * 1024 * 1024,
            max_string_len_per_value: 16 * 1024 * 1024,
            max_metadata_len: 1024 * 1024,
        }
    }
}

impl Limits {
    /// Check `value` against `limit`, naming the quantity in the error
    pub fn check(what: &str, value: usize, limit: usize) -> crate::Result<()> {
        if value > limit {
            return Err(crate::FormatError::LimitExceeded(format!(
                "{} {} exceeds limit {}",
                what, value, limit
            )));
        }
        Ok(())
    }
}
