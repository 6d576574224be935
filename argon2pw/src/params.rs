//! Cost parameters for the derivation primitive.

use std::num::NonZeroUsize;
use std::thread;

use crate::PasswordHashError;

/// Default number of passes over memory.
pub const DEFAULT_TIME_COST: u32 = 1;

/// Default memory cost in KiB (64 MiB).
pub const DEFAULT_MEMORY_COST_KIB: u32 = 64 * 1024;

/// Default number of lanes.
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Default derived key length in bytes.
pub const DEFAULT_KEY_LEN: u32 = 32;

/// Largest lane count written into new hashes. Older hashes stored the lane
/// count in a single byte, so new ones stay within that range.
pub const MAX_PARALLELISM: u32 = u8::MAX as u32;

/// Cost parameters carried by every encoded hash.
///
/// The values are passed to the derivation primitive unmodified. A hasher
/// holds one `HashParams` for its lifetime; a verifier always uses the
/// parameters decoded from the stored hash instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashParams {
    /// Number of passes over memory.
    pub time_cost: u32,
    /// Memory in KiB.
    pub memory_cost: u32,
    /// Number of lanes.
    pub parallelism: u32,
    /// Derived key length in bytes.
    pub key_length: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST_KIB,
            parallelism: DEFAULT_PARALLELISM,
            key_length: DEFAULT_KEY_LEN,
        }
    }
}

impl HashParams {
    /// Creates a parameter set from explicit values.
    pub const fn new(time_cost: u32, memory_cost: u32, parallelism: u32, key_length: u32) -> Self {
        Self {
            time_cost,
            memory_cost,
            parallelism,
            key_length,
        }
    }

    /// Default parameters with the lane count taken from the host's available
    /// parallelism, capped at [`MAX_PARALLELISM`].
    ///
    /// The host is queried once, here. Keep the returned value and reuse it
    /// rather than calling this per hash.
    pub fn for_host() -> Self {
        let lanes = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let parallelism = u32::try_from(lanes)
            .unwrap_or(MAX_PARALLELISM)
            .min(MAX_PARALLELISM);

        Self {
            parallelism,
            ..Self::default()
        }
    }

    /// Returns a copy with a different time cost.
    pub const fn with_time_cost(mut self, time_cost: u32) -> Self {
        self.time_cost = time_cost;
        self
    }

    /// Returns a copy with a different memory cost (KiB).
    pub const fn with_memory_cost(mut self, memory_cost: u32) -> Self {
        self.memory_cost = memory_cost;
        self
    }

    /// Returns a copy with a different lane count.
    pub const fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Returns a copy with a different key length.
    pub const fn with_key_length(mut self, key_length: u32) -> Self {
        self.key_length = key_length;
        self
    }

    /// Checks that every parameter is usable for generating a new hash.
    ///
    /// Limits specific to the primitive (minimum memory per lane, minimum
    /// key length) are enforced by the primitive itself at derivation time.
    ///
    /// ## Errors
    ///
    /// Returns `PasswordHashError::Derivation` naming the first invalid field.
    pub fn validate(&self) -> Result<(), PasswordHashError> {
        let invalid = |field: &str| -> Result<(), PasswordHashError> {
            Err(PasswordHashError::Derivation(format!(
                "{field} must be at least 1"
            )))
        };

        if self.time_cost == 0 {
            return invalid("time cost");
        }
        if self.memory_cost == 0 {
            return invalid("memory cost");
        }
        if self.parallelism == 0 {
            return invalid("parallelism");
        }
        if self.key_length == 0 {
            return invalid("key length");
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(PasswordHashError::Derivation(format!(
                "parallelism must be at most {MAX_PARALLELISM}"
            )));
        }
        Ok(())
    }
}
