//! Compression boundary for containers that wrap their payload in a
//! compressed block.

use crate::error::FormatError;

/// A pluggable compression backend. Implementations must hold the contract
/// that `decompress` yields exactly `expected_size` bytes; anything else is
/// a [`FormatError::Decompress`] and the surrounding read aborts.
pub trait Compressor {
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError>;

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, FormatError>;
}

/// Checks a decompressed block against the size the container promised.
pub fn check_decompressed_size(data: &[u8], expected_size: usize) -> Result<(), FormatError> {
    if data.len() == expected_size {
        Ok(())
    } else {
        Err(FormatError::Decompress {
            expected: expected_size,
            actual: data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity backend; enough to exercise the boundary contract.
    struct Passthrough;

    impl Compressor for Passthrough {
        fn name(&self) -> &'static str {
            "passthrough"
        }

        fn compress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError> {
            Ok(data.to_vec())
        }

        fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, FormatError> {
            let out = data.to_vec();
            check_decompressed_size(&out, expected_size)?;
            Ok(out)
        }
    }

    #[test]
    fn size_mismatch_is_fatal() {
        let backend = Passthrough;
        let data = [1u8, 2, 3];
        assert!(backend.decompress(&data, 3).is_ok());
        assert!(matches!(
            backend.decompress(&data, 8),
            Err(FormatError::Decompress {
                expected: 8,
                actual: 3
            })
        ));
    }
}
