//! Checking candidate passwords against stored hashes.

use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::PasswordHashError;
use crate::algorithm::AlgorithmRegistry;
use crate::codec;

/// Verifies passwords against stored hashes of any registered algorithm.
///
/// The stored hash decides everything about re-derivation: the algorithm tag
/// selects the strategy and the encoded cost parameters and salt are used
/// as-is. Current hasher defaults play no part, so hashes made under older
/// settings keep verifying.
#[derive(Debug, Clone, Default)]
pub struct PasswordVerifier {
    registry: AlgorithmRegistry,
}

impl PasswordVerifier {
    /// A verifier dispatching through `registry`.
    pub fn new(registry: AlgorithmRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Checks `candidate` against `stored`.
    ///
    /// ## Errors
    ///
    /// - `PasswordHashError::EmptyInput` if either argument is empty.
    /// - `PasswordHashError::MalformedHash` if `stored` cannot be decoded.
    /// - `PasswordHashError::UnsupportedAlgorithm` if the tag is not registered.
    /// - `PasswordHashError::Derivation` if the stored parameters are unusable.
    /// - `PasswordHashError::Mismatch` if the password is wrong.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use argon2pw::{PasswordHashError, PasswordVerifier};
    ///
    /// let stored = "argon2id$2$64$2$32$AAECAwQFBgcICQoLDA0ODw==$rHykS70ia6QivfX/gTPZmPzJXAIVRdUHYlzrUKSRplM=";
    /// let verifier = PasswordVerifier::default();
    ///
    /// assert!(verifier.verify(stored, "correct horse").is_ok());
    /// assert_eq!(
    ///     verifier.verify(stored, "battery staple"),
    ///     Err(PasswordHashError::Mismatch)
    /// );
    /// ```
    pub fn verify(&self, stored: &str, candidate: &str) -> Result<(), PasswordHashError> {
        let result = self.check(stored, candidate);
        match &result {
            Ok(()) => debug!("password verified"),
            Err(e) => debug!(reason = e.kind(), "password verification failed"),
        }
        result
    }

    /// Like [`verify`](Self::verify), but reports a wrong password as
    /// `Ok(false)`. Structural problems are still errors.
    pub fn matches(&self, stored: &str, candidate: &str) -> Result<bool, PasswordHashError> {
        match self.verify(stored, candidate) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Mismatch) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn check(&self, stored: &str, candidate: &str) -> Result<(), PasswordHashError> {
        if stored.is_empty() || candidate.is_empty() {
            return Err(PasswordHashError::EmptyInput);
        }

        let record = codec::decode(stored)?;
        let strategy = self.registry.lookup(record.algorithm_tag())?;
        let derived = strategy.derive(candidate.as_bytes(), record.salt(), &record.params())?;

        if constant_time_eq(&derived, record.derived_key()) {
            Ok(())
        } else {
            Err(PasswordHashError::Mismatch)
        }
    }
}

/// Compares two byte strings without branching on their contents.
///
/// The loop always runs over the longer input, and a length difference only
/// feeds into the accumulated result, so the running time depends on the
/// lengths alone.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut equal: Choice = a.len().ct_eq(&b.len());
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        equal &= x.ct_eq(&y);
    }
    equal.into()
}
