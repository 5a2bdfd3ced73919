//! strhash - length-tiered CRC32C string hash for runtime string tables.
//!
//! Produces a 32-bit fingerprint for byte strings, meant as the hash key of
//! an interning string table. Short strings are hashed completely; strings
//! of 128 bytes or more are hashed by sampling a constant number of words at
//! offsets randomized once per process, which bounds the cost of hashing
//! huge strings and keeps attackers from precomputing colliding inputs.
//!
//! - [`tiered`] - the four length-specialised tiers
//! - [`positions`] - the per-process random offset table
//! - [`sparse`] - the fallback for CPUs without CRC32C
//! - [`Caps`] / [`Binding`] - one-time capability probe and kernel selection
//! - [`Config`] - backend and seed overrides (`STRHASH_BACKEND`, `STRHASH_SEED`)
//!
//! Hash values are only meaningful inside the process that computed them.
//! Never persist them or send them to another process.
//!
//! # Example
//!
//! ```
//! let a = strhash::hash(b"print");
//! assert_eq!(a, strhash::hash_str("print"));
//!
//! // Zero-length input is a precondition violation.
//! assert!(strhash::try_hash(b"").is_err());
//! ```

mod caps;
mod dispatch;
mod error;

pub mod config;
pub mod positions;
pub mod sparse;
pub mod tiered;

pub use caps::Caps;
pub use config::{Backend, Config, Seed};
pub use dispatch::{binding, hash, hash_str, try_hash, try_init, Binding, HashFn, Kernel};
pub use error::{Error, Result};
pub use positions::RandomPositions;
pub use tiered::Tier;

/// Re-export the common primitives.
pub use strhash_common as common;
