//! The `$`-delimited text form of a password hash.
//!
//! Every hash is stored as exactly seven fields:
//!
//! ```text
//! <tag>$<time_cost>$<memory_cost>$<parallelism>$<key_length>$<salt-b64>$<key-b64>
//! ```
//!
//! Salt and key use standard padded base64, whose alphabet never contains the
//! delimiter. Decoding only checks structure. Whether the tag is known is up
//! to the verifier, so a corrupt hash and an unknown algorithm stay separate
//! error kinds.

use std::fmt;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{HashParams, PasswordHashError};

/// Field delimiter of the encoded form.
pub const DELIMITER: char = '$';

/// Number of fields in an encoded hash.
pub const FIELD_COUNT: usize = 7;

/// A decoded password hash.
///
/// Records are immutable: they are built once, either by the hasher or by
/// [`decode`], and only expose read accessors. Salt and key bytes are wiped
/// when the record is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HashRecord {
    algorithm_tag: String,
    time_cost: u32,
    memory_cost: u32,
    parallelism: u32,
    key_length: u32,
    salt: Vec<u8>,
    derived_key: Vec<u8>,
}

impl HashRecord {
    /// Builds a record from its parts.
    pub fn new(
        algorithm_tag: impl Into<String>,
        params: HashParams,
        salt: Vec<u8>,
        derived_key: Vec<u8>,
    ) -> Self {
        Self {
            algorithm_tag: algorithm_tag.into(),
            time_cost: params.time_cost,
            memory_cost: params.memory_cost,
            parallelism: params.parallelism,
            key_length: params.key_length,
            salt,
            derived_key,
        }
    }

    pub fn algorithm_tag(&self) -> &str {
        &self.algorithm_tag
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn memory_cost(&self) -> u32 {
        self.memory_cost
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn key_length(&self) -> u32 {
        self.key_length
    }

    /// The cost parameters this record was produced with.
    pub fn params(&self) -> HashParams {
        HashParams::new(
            self.time_cost,
            self.memory_cost,
            self.parallelism,
            self.key_length,
        )
    }

    /// Raw salt bytes.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Raw derived key bytes.
    pub fn derived_key(&self) -> &[u8] {
        &self.derived_key
    }
}

// Key material stays out of debug output.
impl fmt::Debug for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRecord")
            .field("algorithm_tag", &self.algorithm_tag)
            .field("time_cost", &self.time_cost)
            .field("memory_cost", &self.memory_cost)
            .field("parallelism", &self.parallelism)
            .field("key_length", &self.key_length)
            .field("salt_len", &self.salt.len())
            .field("derived_key_len", &self.derived_key.len())
            .finish()
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            self.algorithm_tag,
            self.time_cost,
            self.memory_cost,
            self.parallelism,
            self.key_length,
            STANDARD.encode(&self.salt),
            STANDARD.encode(&self.derived_key),
        )
    }
}

impl FromStr for HashRecord {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Encodes a record into its seven-field text form.
pub fn encode(record: &HashRecord) -> String {
    record.to_string()
}

/// Parses the seven-field text form.
///
/// ## Errors
///
/// Returns `PasswordHashError::MalformedHash` if the text does not split into
/// exactly seven fields, a numeric field is not a plain decimal `u32`, or the
/// salt or key is not valid standard base64.
///
/// ## Examples
///
/// ```rust
/// use argon2pw::codec::decode;
///
/// let record = decode("argon2$4$32768$4$32$/WN2BY5NDzVlHYgw3pqahA==$oLGdDy23gAgbQXmphVVPG0Uax+XbfeUfH/TCpQbEHfc=").unwrap();
/// assert_eq!(record.algorithm_tag(), "argon2");
/// assert_eq!(record.memory_cost(), 32768);
/// assert_eq!(record.salt().len(), 16);
/// ```
pub fn decode(text: &str) -> Result<HashRecord, PasswordHashError> {
    let fields: Vec<&str> = text.split(DELIMITER).collect();
    let &[tag, time_cost, memory_cost, parallelism, key_length, salt, key] = fields.as_slice()
    else {
        return Err(PasswordHashError::MalformedHash(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    };

    Ok(HashRecord {
        algorithm_tag: tag.to_string(),
        time_cost: parse_number("time cost", time_cost)?,
        memory_cost: parse_number("memory cost", memory_cost)?,
        parallelism: parse_number("parallelism", parallelism)?,
        key_length: parse_number("key length", key_length)?,
        salt: decode_bytes("salt", salt)?,
        derived_key: decode_bytes("key", key)?,
    })
}

fn parse_number(field: &str, value: &str) -> Result<u32, PasswordHashError> {
    // `u32::from_str` would also take a leading '+'.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PasswordHashError::MalformedHash(format!(
            "{field} is not a decimal integer"
        )));
    }
    value
        .parse()
        .map_err(|_| PasswordHashError::MalformedHash(format!("{field} is out of range")))
}

fn decode_bytes(field: &str, value: &str) -> Result<Vec<u8>, PasswordHashError> {
    STANDARD
        .decode(value)
        .map_err(|e| PasswordHashError::MalformedHash(format!("{field} is not valid base64: {e}")))
}
