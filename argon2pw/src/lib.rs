//! Salted Argon2 password hashes in a self-describing text format.
//!
//! A hash produced by this crate carries everything needed to verify it later:
//!
//! ```text
//! argon2id$1$65536$4$32$<salt-b64>$<key-b64>
//! ```
//!
//! The fields are the algorithm tag, time cost, memory cost (KiB),
//! parallelism, key length, salt and derived key. Verification always
//! re-derives with the parameters stored in the hash, so raising the defaults
//! or moving to a new algorithm never invalidates hashes already stored.
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`salt`] | Secure random salts |
//! | [`algorithm`] | Tag to derivation strategy registry |
//! | [`codec`] | Encoding and decoding of the text form |
//! | [`hasher`] | Producing new hashes |
//! | [`verifier`] | Constant-time verification |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use argon2pw::{compare_hash_with_password, generate_salted_hash};
//!
//! let hash = generate_salted_hash("testPassword$x1w432b7^").unwrap();
//!
//! assert!(compare_hash_with_password(&hash, "testPassword$x1w432b7^").unwrap());
//! assert!(
//!     compare_hash_with_password(&hash, "badPass")
//!         .unwrap_err()
//!         .is_mismatch()
//! );
//! ```

pub mod algorithm;
pub mod codec;
mod error;
pub mod hasher;
mod params;
pub mod salt;
pub mod verifier;

pub use algorithm::{
    ARGON2ID_TAG, AlgorithmRegistry, Argon2Strategy, KeyDerivation, LEGACY_ARGON2I_TAG,
};
pub use codec::HashRecord;
pub use error::PasswordHashError;
pub use hasher::PasswordHasher;
pub use params::{
    DEFAULT_KEY_LEN, DEFAULT_MEMORY_COST_KIB, DEFAULT_PARALLELISM, DEFAULT_TIME_COST,
    HashParams, MAX_PARALLELISM,
};
pub use salt::{OsSaltSource, SaltSource};
pub use verifier::PasswordVerifier;

/// Hashes `password` with Argon2id, a fresh 32-byte salt and the default
/// parameters.
///
/// ## Errors
///
/// - `PasswordHashError::EmptyInput` if `password` is empty.
/// - `PasswordHashError::EntropyUnavailable` if no salt can be generated.
pub fn generate_salted_hash(password: &str) -> Result<String, PasswordHashError> {
    PasswordHasher::default().hash(password)
}

/// Checks `password` against a stored `hash`.
///
/// Returns `Ok(true)` on a match. A wrong password is reported as
/// `Err(PasswordHashError::Mismatch)` so it is never confused with a hash that
/// could not be checked at all. Use [`PasswordVerifier::matches`] for a plain
/// `Ok(false)` instead.
///
/// ## Errors
///
/// See [`PasswordVerifier::verify`].
pub fn compare_hash_with_password(hash: &str, password: &str) -> Result<bool, PasswordHashError> {
    PasswordVerifier::default()
        .verify(hash, password)
        .map(|()| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_for_assorted_passwords() {
        for password in [
            "Password1",
            "gS</5Tu>3@(<FCtY",
            r#"Y&jEA)_m7q@jb@J"<sXrS]HH"zU"#,
            "パスワード🔐",
            "pass$word",
        ] {
            let hash = generate_salted_hash(password).unwrap();
            assert_eq!(compare_hash_with_password(&hash, password), Ok(true));
        }
    }

    #[test]
    fn different_password_is_a_mismatch() {
        let hash = generate_salted_hash("first-password").unwrap();
        assert_eq!(
            compare_hash_with_password(&hash, "second-password"),
            Err(PasswordHashError::Mismatch)
        );
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(generate_salted_hash(""), Err(PasswordHashError::EmptyInput));
        assert_eq!(
            compare_hash_with_password("", "pw"),
            Err(PasswordHashError::EmptyInput)
        );
        assert_eq!(
            compare_hash_with_password("argon2id$1$64$1$32$AAAA$AAAA", ""),
            Err(PasswordHashError::EmptyInput)
        );
    }

    #[test]
    fn generated_hash_has_seven_fields_and_preferred_tag() {
        let hash = generate_salted_hash("Password1").unwrap();
        let fields: Vec<&str> = hash.split('$').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], ARGON2ID_TAG);
    }

    #[test]
    fn legacy_hash_still_verifies() {
        let legacy = "argon2$4$32768$4$32$/WN2BY5NDzVlHYgw3pqahA==$oLGdDy23gAgbQXmphVVPG0Uax+XbfeUfH/TCpQbEHfc=";
        assert_eq!(
            compare_hash_with_password(legacy, r#"Y&jEA)_m7q@jb@J"<sXrS]HH"zU"#),
            Ok(true)
        );
        assert_eq!(
            compare_hash_with_password(legacy, "Password1"),
            Err(PasswordHashError::Mismatch)
        );
    }

    #[test]
    fn bad_hash_is_malformed() {
        assert!(matches!(
            compare_hash_with_password("badHash", "anything"),
            Err(PasswordHashError::MalformedHash(_))
        ));
    }

    #[test]
    fn salts_are_unique_across_many_hashes() {
        let hasher = PasswordHasher::new(HashParams::new(1, 64, 1, 32));
        let salts: std::collections::HashSet<String> = (0..32)
            .map(|_| {
                let hash = hasher.hash("same").unwrap();
                hash.split('$').nth(5).unwrap().to_string()
            })
            .collect();
        assert_eq!(salts.len(), 32);
    }
}
