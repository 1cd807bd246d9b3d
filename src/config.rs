//! MAC settings for newly written keystores.
//!
//! Defaults can be overridden with `KEYSTORE_MAC_ALGORITHM` and
//! `KEYSTORE_MAC_ITERATION_COUNT`.

use std::env;

use crate::algorithm::{DigestAlgorithm, MacAlgorithm};
use crate::crypto::SALT_LEN;
use crate::error::{MacError, Result};

pub const ENV_MAC_ALGORITHM: &str = "KEYSTORE_MAC_ALGORITHM";
pub const ENV_MAC_ITERATION_COUNT: &str = "KEYSTORE_MAC_ITERATION_COUNT";

/// Default MAC iteration count.
pub const DEFAULT_ITERATION_COUNT: u32 = 10_000;
/// Upper bound on the iteration count accepted from a keystore file.
pub const MAX_ITERATION_COUNT: u32 = 5_000_000;
/// Shortest accepted salt.
pub const MIN_SALT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacSettings {
    pub algorithm: MacAlgorithm,
    pub iterations: u32,
    pub salt_len: usize,
}

impl Default for MacSettings {
    fn default() -> Self {
        Self {
            algorithm: MacAlgorithm::Legacy(DigestAlgorithm::Sha256),
            iterations: DEFAULT_ITERATION_COUNT,
            salt_len: SALT_LEN,
        }
    }
}

impl MacSettings {
    pub fn new(algorithm: MacAlgorithm, iterations: u32, salt_len: usize) -> Result<Self> {
        let settings = Self {
            algorithm,
            iterations,
            salt_len,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(alg) = lookup(ENV_MAC_ALGORITHM).filter(|v| !v.trim().is_empty()) {
            settings.algorithm = alg.trim().parse()?;
        }
        if let Some(count) = lookup(ENV_MAC_ITERATION_COUNT).filter(|v| !v.trim().is_empty()) {
            settings.iterations = count.trim().parse().map_err(|_| {
                MacError::invalid(format!("{ENV_MAC_ITERATION_COUNT} is not a number: {count}"))
            })?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(MacError::invalid("MAC iteration count must be >= 1"));
        }
        if self.iterations > MAX_ITERATION_COUNT {
            return Err(MacError::invalid("MAC iteration count too large"));
        }
        if self.salt_len < MIN_SALT_LEN {
            return Err(MacError::invalid(format!(
                "MAC salt must be at least {MIN_SALT_LEN} bytes"
            )));
        }
        Ok(())
    }
}
