//! Error types for password hashing and verification.

use thiserror::Error;

/// Errors that can occur while hashing or verifying a password.
///
/// [`PasswordHashError::Mismatch`] is the only variant that means "wrong
/// password". Every other variant describes a problem with the inputs, the
/// stored hash, or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// A password or stored hash argument was empty.
    #[error("password and hash arguments cannot be empty")]
    EmptyInput,

    /// The operating system's secure random source could not supply a salt.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// The stored hash does not have the expected structure.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// The stored hash names an algorithm tag with no registered strategy.
    #[error("unsupported password hash algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// The candidate password does not match the stored hash.
    #[error("password did not match")]
    Mismatch,

    /// The derivation primitive rejected its inputs or parameters.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl PasswordHashError {
    /// Returns `true` when the error only means the password was wrong.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }

    /// Short, stable name of the error kind, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::EntropyUnavailable(_) => "entropy_unavailable",
            Self::MalformedHash(_) => "malformed_hash",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::Mismatch => "mismatch",
            Self::Derivation(_) => "derivation",
        }
    }
}
