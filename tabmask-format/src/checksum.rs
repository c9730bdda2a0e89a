//! CRC32C checksum utilities

use crate::error::{FormatError, Result};

/// Compute CRC32C over `data`
pub fn compute_crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Verify that `data` hashes to `expected`
pub fn verify_crc32c(data: &[u8], expected: u32) -> Result<()> {
    let actual = compute_crc32c(data);
    if actual == expected {
        Ok(())
    } else {
        Err(FormatError::ChecksumMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_detects_single_bit_flip() {
        let mut data = b"student_id,name".to_vec();
        let crc = compute_crc32c(&data);
        assert!(verify_crc32c(&data, crc).is_ok());

        data[0] ^= 0x01;
        match verify_crc32c(&data, crc) {
            Err(FormatError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, crc);
                assert_ne!(actual, crc);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }
}
