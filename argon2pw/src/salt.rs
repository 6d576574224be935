//! Secure random salt generation.

use rand::{RngCore, rngs::OsRng};

use crate::PasswordHashError;

/// Default salt length in bytes for newly generated hashes.
pub const DEFAULT_SALT_LEN: usize = 32;

/// A source of salt bytes.
///
/// Implementations must return exactly `length` bytes or an error; they must
/// never fall back to a weaker source.
pub trait SaltSource: Send + Sync {
    /// Returns `length` random bytes.
    ///
    /// ## Errors
    ///
    /// Returns `PasswordHashError::EntropyUnavailable` if no bytes can be produced.
    fn generate(&self, length: usize) -> Result<Vec<u8>, PasswordHashError>;
}

/// Salt source backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn generate(&self, length: usize) -> Result<Vec<u8>, PasswordHashError> {
        let mut salt = vec![0u8; length];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordHashError::EntropyUnavailable(e.to_string()))?;
        Ok(salt)
    }
}
