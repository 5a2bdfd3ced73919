//! Common primitives for strhash.
//!
//! This crate provides the leaf building blocks used by the string hash:
//!
//! - [`crc`] - CRC32C word mixing (portable, SSE4.2, ARMv8 CRC)
//! - [`log2`] - Table-driven `floor(log2(n))`
//! - [`words`] - Little-endian word loads from byte slices

pub mod crc;
pub mod log2;
pub mod words;

pub use crc::{Crc32cWord, Portable};
pub use log2::log2_floor;
