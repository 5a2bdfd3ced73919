//! Binding configuration.
//!
//! The defaults reproduce the normal startup behaviour: pick the hardware
//! kernel when the CPU has CRC32C, and seed the position table from the
//! process id and the clock. Two environment variables override this:
//!
//! - `STRHASH_BACKEND` - `auto`, `portable` or `fallback`
//! - `STRHASH_SEED` - fixed `u32` seed, decimal or `0x`-prefixed hex

use std::fmt;
use std::str::FromStr;

use crate::positions;
use crate::{Error, Result};

/// Environment variable selecting the [`Backend`].
pub const BACKEND_VAR: &str = "STRHASH_BACKEND";

/// Environment variable fixing the position table [`Seed`].
pub const SEED_VAR: &str = "STRHASH_SEED";

/// Which implementation the binding should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Hardware tiered kernel if the CPU has it, otherwise the fallback.
    #[default]
    Auto,
    /// Tiered algorithm on the table-driven CRC32C.
    Portable,
    /// Sparse fallback hash, never randomized.
    Fallback,
}

impl Backend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Portable => "portable",
            Backend::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "portable" => Ok(Backend::Portable),
            "fallback" | "sparse" => Ok(Backend::Fallback),
            _ => Err(Error::InvalidConfig {
                key: BACKEND_VAR,
                value: s.to_string(),
            }),
        }
    }
}

/// Where the random position table gets its seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Seed {
    /// Process id and wall-clock seconds. Low entropy; enough to stop
    /// precomputed flooding inputs, not a determined adversary.
    #[default]
    Process,
    /// A fixed seed, for reproducible runs.
    Fixed(u32),
}

impl Seed {
    /// Produce the concrete 32-bit seed.
    pub fn resolve(self) -> u32 {
        match self {
            Seed::Process => positions::process_seed(),
            Seed::Fixed(seed) => seed,
        }
    }
}

/// Configuration for a [`Binding`](crate::Binding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub seed: Seed,
}

impl Config {
    /// Set the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a configuration from a variable lookup.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(BACKEND_VAR).filter(|v| !v.trim().is_empty()) {
            config.backend = value.parse()?;
        }
        if let Some(value) = lookup(SEED_VAR).filter(|v| !v.trim().is_empty()) {
            config.seed = Seed::Fixed(parse_seed(&value)?);
        }

        Ok(config)
    }
}

/// Parse a seed written in decimal or `0x` hex.
pub fn parse_seed(value: &str) -> Result<u32> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| Error::InvalidConfig {
        key: SEED_VAR,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend, Backend::Auto);
        assert_eq!(config.seed, Seed::Process);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::Auto);
        assert_eq!("Portable".parse::<Backend>().unwrap(), Backend::Portable);
        assert_eq!(" fallback ".parse::<Backend>().unwrap(), Backend::Fallback);
        assert_eq!("sparse".parse::<Backend>().unwrap(), Backend::Fallback);
        assert!("avx512".parse::<Backend>().is_err());
        assert_eq!(Backend::Portable.to_string(), "portable");
    }

    #[test]
    fn test_seed_parsing() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xDEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed("0Xff").unwrap(), 0xFF);
        assert!(parse_seed("4294967296").is_err());
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(vars(&[
            (BACKEND_VAR, "portable"),
            (SEED_VAR, "0x10"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Portable);
        assert_eq!(config.seed, Seed::Fixed(16));
    }

    #[test]
    fn test_empty_vars_keep_defaults() {
        let config = Config::from_vars(vars(&[(BACKEND_VAR, ""), (SEED_VAR, "  ")])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_vars() {
        let err = Config::from_vars(vars(&[(SEED_VAR, "abc")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { key: SEED_VAR, .. }));

        let err = Config::from_vars(vars(&[(BACKEND_VAR, "gpu")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { key: BACKEND_VAR, .. }));
    }

    #[test]
    fn test_fixed_seed_resolves_to_itself() {
        assert_eq!(Seed::Fixed(7).resolve(), 7);
    }
}
