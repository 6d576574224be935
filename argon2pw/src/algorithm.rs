//! Algorithm tags and the derivation strategies behind them.
//!
//! Each encoded hash starts with a tag naming the derivation variant that
//! produced it. The [`AlgorithmRegistry`] maps tags to [`KeyDerivation`]
//! strategies, so verifying an older hash only needs its strategy to stay
//! registered.
//!
//! | Tag | Variant | Status |
//! |-----|---------|--------|
//! | `argon2id` | Argon2id v0x13 | preferred |
//! | `argon2` | Argon2i v0x13 | legacy, verify only |
//!
//! Both variants derive over the base64 text of the salt rather than the raw
//! salt bytes. Hashes already in storage were produced that way, so the
//! behavior is part of the format.

use std::fmt;
use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use crate::{HashParams, PasswordHashError};

/// Tag of the preferred variant, written into every new hash.
pub const ARGON2ID_TAG: &str = "argon2id";

/// Tag of the first-generation Argon2i variant, still accepted for verification.
pub const LEGACY_ARGON2I_TAG: &str = "argon2";

/// A key derivation strategy selected by algorithm tag.
pub trait KeyDerivation: Send + Sync + fmt::Debug {
    /// The tag this strategy is registered under.
    fn tag(&self) -> &str;

    /// Derives `params.key_length` bytes from `password` and `salt`.
    ///
    /// ## Errors
    ///
    /// Returns `PasswordHashError::Derivation` if the primitive rejects the
    /// parameters or inputs.
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &HashParams,
    ) -> Result<Zeroizing<Vec<u8>>, PasswordHashError>;
}

/// Argon2 (RustCrypto) in one of its variants, version 0x13.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Strategy {
    tag: &'static str,
    algorithm: Algorithm,
}

impl Argon2Strategy {
    /// The preferred Argon2id strategy.
    pub const fn argon2id() -> Self {
        Self {
            tag: ARGON2ID_TAG,
            algorithm: Algorithm::Argon2id,
        }
    }

    /// The legacy Argon2i strategy.
    pub const fn legacy_argon2i() -> Self {
        Self {
            tag: LEGACY_ARGON2I_TAG,
            algorithm: Algorithm::Argon2i,
        }
    }
}

impl KeyDerivation for Argon2Strategy {
    fn tag(&self) -> &str {
        self.tag
    }

    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        params: &HashParams,
    ) -> Result<Zeroizing<Vec<u8>>, PasswordHashError> {
        let key_len = params.key_length as usize;
        let argon_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(key_len),
        )
        .map_err(|e| PasswordHashError::Derivation(e.to_string()))?;

        let salt_text = Zeroizing::new(STANDARD.encode(salt));
        let mut key = Zeroizing::new(vec![0u8; key_len]);

        Argon2::new(self.algorithm, Version::V0x13, argon_params)
            .hash_password_into(password, salt_text.as_bytes(), &mut key)
            .map_err(|e| PasswordHashError::Derivation(e.to_string()))?;

        Ok(key)
    }
}

/// Maps algorithm tags to derivation strategies.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    strategies: Vec<Arc<dyn KeyDerivation>>,
}

impl Default for AlgorithmRegistry {
    /// A registry holding the preferred and every legacy strategy.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Argon2Strategy::argon2id())
            .register(Argon2Strategy::legacy_argon2i());
        registry
    }
}

impl AlgorithmRegistry {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registers a strategy under its tag, replacing any strategy already
    /// registered for that tag.
    pub fn register(&mut self, strategy: impl KeyDerivation + 'static) -> &mut Self {
        self.register_arc(Arc::new(strategy))
    }

    /// Registers an already shared strategy.
    pub fn register_arc(&mut self, strategy: Arc<dyn KeyDerivation>) -> &mut Self {
        self.strategies.retain(|s| s.tag() != strategy.tag());
        self.strategies.push(strategy);
        self
    }

    /// Looks up the strategy for `tag`.
    ///
    /// ## Errors
    ///
    /// Returns `PasswordHashError::UnsupportedAlgorithm` for an unknown tag.
    pub fn lookup(&self, tag: &str) -> Result<&Arc<dyn KeyDerivation>, PasswordHashError> {
        self.strategies
            .iter()
            .find(|s| s.tag() == tag)
            .ok_or_else(|| PasswordHashError::UnsupportedAlgorithm(tag.to_string()))
    }

    /// Returns `true` if a strategy is registered for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.lookup(tag).is_ok()
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &[u8] = b"correct horse";

    fn small_params() -> HashParams {
        HashParams::new(2, 64, 2, 32)
    }

    fn salt() -> Vec<u8> {
        (0u8..16).collect()
    }

    #[test]
    fn argon2id_matches_known_answer() {
        let key = Argon2Strategy::argon2id()
            .derive(PASSWORD, &salt(), &small_params())
            .unwrap();
        assert_eq!(
            STANDARD.encode(&*key),
            "rHykS70ia6QivfX/gTPZmPzJXAIVRdUHYlzrUKSRplM="
        );
    }

    #[test]
    fn legacy_argon2i_matches_known_answer() {
        let key = Argon2Strategy::legacy_argon2i()
            .derive(PASSWORD, &salt(), &small_params())
            .unwrap();
        assert_eq!(
            STANDARD.encode(&*key),
            "4g52nwbp/8c9jNThmvKY5vjEK8ziYOrLcZ2g/u8R0LE="
        );
    }

    #[test]
    fn output_length_follows_params() {
        let params = small_params().with_key_length(48);
        let key = Argon2Strategy::argon2id()
            .derive(PASSWORD, &salt(), &params)
            .unwrap();
        assert_eq!(key.len(), 48);
    }

    #[test]
    fn rejects_zero_parallelism() {
        let params = small_params().with_parallelism(0);
        let result = Argon2Strategy::argon2id().derive(PASSWORD, &salt(), &params);
        assert!(matches!(result, Err(PasswordHashError::Derivation(_))));
    }

    #[test]
    fn default_registry_knows_both_tags() {
        let registry = AlgorithmRegistry::default();
        assert_eq!(registry.tags().collect::<Vec<_>>(), [ARGON2ID_TAG, LEGACY_ARGON2I_TAG]);
        assert_eq!(registry.lookup("argon2id").unwrap().tag(), "argon2id");
        assert_eq!(registry.lookup("argon2").unwrap().tag(), "argon2");
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let registry = AlgorithmRegistry::default();
        let err = registry.lookup("argon2d").unwrap_err();
        assert_eq!(err, PasswordHashError::UnsupportedAlgorithm("argon2d".into()));
        assert!(!registry.contains(""));
    }

    #[test]
    fn registering_a_tag_twice_replaces_it() {
        let mut registry = AlgorithmRegistry::default();
        registry.register(Argon2Strategy::argon2id());
        assert_eq!(registry.tags().count(), 2);
    }

    #[test]
    fn empty_registry_supports_nothing() {
        let registry = AlgorithmRegistry::empty();
        assert!(!registry.contains(ARGON2ID_TAG));
    }
}
