//! Error types for strhash.

use thiserror::Error;

/// Errors reported by the checked entry points.
///
/// Hashing itself cannot fail; these cover precondition checks,
/// initialization order and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Zero-length input passed to a checked hash call.
    #[error("cannot hash an empty string")]
    EmptyInput,

    /// The process-wide binding was already created.
    #[error("string hash binding is already initialized")]
    AlreadyInitialized,

    /// A hardware kernel was requested on a CPU without the instruction.
    #[error("hash kernel {kernel} is not supported on this CPU")]
    Unsupported { kernel: &'static str },

    /// Malformed configuration value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}

/// Result type for strhash operations.
pub type Result<T> = std::result::Result<T, Error>;
