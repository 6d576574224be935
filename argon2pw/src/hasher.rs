//! Producing new salted hashes.

use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::algorithm::{Argon2Strategy, KeyDerivation};
use crate::codec::{self, HashRecord};
use crate::salt::{DEFAULT_SALT_LEN, OsSaltSource, SaltSource};
use crate::{HashParams, PasswordHashError};

/// Hashes passwords with one algorithm and one fixed set of cost parameters.
///
/// The parameters are resolved when the hasher is built and never re-read, so
/// a hasher's output format is fully determined by its construction.
///
/// ## Examples
///
/// ```rust
/// use argon2pw::{HashParams, PasswordHasher};
///
/// let hasher = PasswordHasher::new(HashParams::new(1, 1024, 1, 32));
/// let hash = hasher.hash("my-password").unwrap();
/// assert!(hash.starts_with("argon2id$1$1024$1$32$"));
/// ```
#[derive(Debug, Clone)]
pub struct PasswordHasher<S = OsSaltSource> {
    params: HashParams,
    salt_length: usize,
    strategy: Arc<dyn KeyDerivation>,
    salt_source: S,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashParams::default())
    }
}

impl PasswordHasher {
    /// A hasher using Argon2id, the OS random source and a 32-byte salt.
    pub fn new(params: HashParams) -> Self {
        Self {
            params,
            salt_length: DEFAULT_SALT_LEN,
            strategy: Arc::new(Argon2Strategy::argon2id()),
            salt_source: OsSaltSource,
        }
    }
}

impl<S: SaltSource> PasswordHasher<S> {
    /// Replaces the salt source.
    pub fn with_salt_source<T: SaltSource>(self, salt_source: T) -> PasswordHasher<T> {
        PasswordHasher {
            params: self.params,
            salt_length: self.salt_length,
            strategy: self.strategy,
            salt_source,
        }
    }

    /// Sets the number of random salt bytes per hash.
    pub fn with_salt_length(mut self, salt_length: usize) -> Self {
        self.salt_length = salt_length;
        self
    }

    /// Sets the algorithm new hashes are produced with.
    pub fn with_algorithm(mut self, strategy: Arc<dyn KeyDerivation>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn params(&self) -> &HashParams {
        &self.params
    }

    pub fn salt_length(&self) -> usize {
        self.salt_length
    }

    /// Tag written into every hash this hasher produces.
    pub fn algorithm_tag(&self) -> &str {
        self.strategy.tag()
    }

    /// Hashes `password` with a fresh salt.
    ///
    /// ## Errors
    ///
    /// - `PasswordHashError::EmptyInput` if `password` is empty.
    /// - `PasswordHashError::EntropyUnavailable` if no salt can be generated.
    /// - `PasswordHashError::Derivation` if the parameters are unusable.
    pub fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        if password.is_empty() {
            return Err(PasswordHashError::EmptyInput);
        }
        self.params.validate()?;

        let salt = Zeroizing::new(self.salt_source.generate(self.salt_length)?);
        let key = self
            .strategy
            .derive(password.as_bytes(), &salt, &self.params)?;

        let record = HashRecord::new(self.strategy.tag(), self.params, salt.to_vec(), key.to_vec());
        debug!(
            algorithm = record.algorithm_tag(),
            time_cost = record.time_cost(),
            memory_cost = record.memory_cost(),
            parallelism = record.parallelism(),
            "password hashed"
        );

        Ok(codec::encode(&record))
    }

    /// Returns `true` when `stored` was not produced with this hasher's
    /// algorithm and parameters, so it should be replaced after the next
    /// successful verification.
    ///
    /// ## Errors
    ///
    /// Returns `PasswordHashError::MalformedHash` if `stored` cannot be decoded.
    pub fn needs_rehash(&self, stored: &str) -> Result<bool, PasswordHashError> {
        let record = codec::decode(stored)?;
        Ok(record.algorithm_tag() != self.algorithm_tag()
            || record.params() != self.params
            || record.salt().len() != self.salt_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::LEGACY_ARGON2I_TAG;

    fn fast() -> HashParams {
        HashParams::new(1, 64, 1, 32)
    }

    #[derive(Debug)]
    struct FixedSalt(u8);

    impl SaltSource for FixedSalt {
        fn generate(&self, length: usize) -> Result<Vec<u8>, PasswordHashError> {
            Ok(vec![self.0; length])
        }
    }

    #[derive(Debug)]
    struct NoEntropy;

    impl SaltSource for NoEntropy {
        fn generate(&self, _length: usize) -> Result<Vec<u8>, PasswordHashError> {
            Err(PasswordHashError::EntropyUnavailable("device closed".into()))
        }
    }

    #[test]
    fn produces_seven_fields_with_preferred_tag() {
        let hash = PasswordHasher::new(fast()).hash("Password1").unwrap();
        let fields: Vec<&str> = hash.split('$').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "argon2id");
        assert_eq!(&fields[1..5], ["1", "64", "1", "32"]);
    }

    #[test]
    fn default_hasher_produces_111_character_hashes() {
        let hash = PasswordHasher::default().hash("gS</5Tu>3@(<FCtY").unwrap();
        assert_eq!(hash.len(), 111);
        assert!(hash.starts_with("argon2id$1$65536$4$32$"));
    }

    #[test]
    fn rejects_empty_password() {
        assert_eq!(
            PasswordHasher::new(fast()).hash(""),
            Err(PasswordHashError::EmptyInput)
        );
    }

    #[test]
    fn same_password_gets_different_salts() {
        let hasher = PasswordHasher::new(fast());
        let a = codec::decode(&hasher.hash("same-password").unwrap()).unwrap();
        let b = codec::decode(&hasher.hash("same-password").unwrap()).unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let hasher = PasswordHasher::new(fast()).with_salt_source(FixedSalt(7));
        assert_eq!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn salt_length_is_configurable() {
        let hasher = PasswordHasher::new(fast()).with_salt_length(16);
        let record = codec::decode(&hasher.hash("pw").unwrap()).unwrap();
        assert_eq!(record.salt().len(), 16);
    }

    #[test]
    fn entropy_failure_is_surfaced() {
        let hasher = PasswordHasher::new(fast()).with_salt_source(NoEntropy);
        assert!(matches!(
            hasher.hash("pw"),
            Err(PasswordHashError::EntropyUnavailable(_))
        ));
    }

    #[test]
    fn invalid_params_fail_before_derivation() {
        let hasher = PasswordHasher::new(fast().with_time_cost(0));
        assert!(matches!(
            hasher.hash("pw"),
            Err(PasswordHashError::Derivation(_))
        ));
    }

    #[test]
    fn algorithm_can_be_switched() {
        let hasher =
            PasswordHasher::new(fast()).with_algorithm(Arc::new(Argon2Strategy::legacy_argon2i()));
        let hash = hasher.hash("pw").unwrap();
        assert!(hash.starts_with("argon2$"));
        assert_eq!(hasher.algorithm_tag(), LEGACY_ARGON2I_TAG);
    }

    #[test]
    fn needs_rehash_detects_outdated_hashes() {
        let hasher = PasswordHasher::new(fast());
        let current = hasher.hash("pw").unwrap();
        assert!(!hasher.needs_rehash(&current).unwrap());

        let stronger = PasswordHasher::new(fast().with_time_cost(2));
        assert!(stronger.needs_rehash(&current).unwrap());

        let legacy = "argon2$4$32768$4$32$/WN2BY5NDzVlHYgw3pqahA==$oLGdDy23gAgbQXmphVVPG0Uax+XbfeUfH/TCpQbEHfc=";
        assert!(hasher.needs_rehash(legacy).unwrap());
        assert!(hasher.needs_rehash("badHash").is_err());
    }

    #[test]
    #[tracing_test::traced_test]
    fn logs_parameters_but_not_secrets() {
        let hasher = PasswordHasher::new(fast()).with_salt_source(FixedSalt(0));
        let hash = hasher.hash("hunter2-secret").unwrap();
        let record = codec::decode(&hash).unwrap();
        let salt_b64 = hash.split('$').nth(5).unwrap();

        assert!(logs_contain("password hashed"));
        assert!(logs_contain("memory_cost=64"));
        assert!(!logs_contain("hunter2-secret"));
        assert!(!logs_contain(salt_b64));
        assert_eq!(record.salt(), [0u8; 32]);
    }
}
