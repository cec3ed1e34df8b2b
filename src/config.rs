use serde::{Deserialize, Serialize};

use crate::primitives::{DEFAULT_PRIMALITY_ROUNDS, MIN_PRIMALITY_ROUNDS};
use crate::{Error, Result};

/// Settings for the parameter search.
///
/// `bits` is the bit length of the subgroup order `q`. The remaining fields
/// bound each phase of the search so that an infeasible request fails with
/// [`Error::ParameterGeneration`] instead of looping forever.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Bit length of the prime subgroup order `q`.
    pub bits: u64,
    /// Miller-Rabin rounds per primality test.
    pub primality_rounds: u32,
    /// Candidates tried when sampling `q`.
    pub max_prime_candidates: u64,
    /// Cofactors `k` tried when searching for a prime `p = k*q + 1`.
    pub max_cofactor_steps: u64,
    /// Random bases tried when searching for a generator.
    pub max_generator_attempts: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            bits: 128,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            max_prime_candidates: 100_000,
            max_cofactor_steps: 100_000,
            max_generator_attempts: 256,
        }
    }
}

impl GenerationConfig {
    /// Default configuration with the given subgroup order bit length.
    pub fn with_bits(bits: u64) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Checks the search bounds.
    ///
    /// The bit length itself is checked by the search, which reports an
    /// unusable value as [`Error::ParameterGeneration`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a bound is zero or the primality
    /// rounds fall below [`MIN_PRIMALITY_ROUNDS`].
    pub fn validate(&self) -> Result<()> {
        if self.primality_rounds < MIN_PRIMALITY_ROUNDS {
            return Err(Error::InvalidConfig(format!(
                "primality_rounds must be at least {MIN_PRIMALITY_ROUNDS}, got {}",
                self.primality_rounds
            )));
        }

        if self.max_prime_candidates == 0 {
            return Err(Error::InvalidConfig(
                "max_prime_candidates cannot be zero".to_string(),
            ));
        }

        if self.max_cofactor_steps == 0 {
            return Err(Error::InvalidConfig(
                "max_cofactor_steps cannot be zero".to_string(),
            ));
        }

        if self.max_generator_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_generator_attempts cannot be zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Loads configuration from `.env` file, TOML file, and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `SCHNORR_` prefix (e.g., `SCHNORR_BITS=256`)
    /// 2. TOML configuration file (if exists)
    /// 3. `.env` file (if exists)
    /// 4. Built-in defaults
    ///
    /// The TOML file path can be set via `SCHNORR_CONFIG_PATH`. If not set, it
    /// defaults to `./config/schnorr.toml`. A missing file is not an error.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// SCHNORR_BITS=256
    /// SCHNORR_PRIMALITY_ROUNDS=40
    /// SCHNORR_MAX_COFACTOR_STEPS=500000
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if a source is malformed.
    #[cfg(feature = "cli")]
    pub fn from_env() -> Result<Self> {
        use figment::Figment;
        use figment::providers::{Env, Format, Serialized, Toml};

        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("SCHNORR_CONFIG_PATH")
            .unwrap_or_else(|_| "config/schnorr.toml".to_string());

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("SCHNORR_").ignore(&["config_path"]))
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}
