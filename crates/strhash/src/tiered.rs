//! Length-tiered CRC32C string hash.
//!
//! | Length | Tier | Input touched |
//! |---|---|---|
//! | 1-3 | [`Tier::Tiny`] | first, middle and last byte |
//! | 4-15 | [`Tier::Short`] | head and tail word (overlapping) |
//! | 16-127 | [`Tier::Medium`] | every byte, two interleaved lanes |
//! | 128+ | [`Tier::Long`] | 16 sampled words plus both ends |
//!
//! The long tier reads a constant number of words at per-process random
//! offsets taken from [`RandomPositions`]. Everything else is a pure function
//! of the input bytes.
//!
//! All functions are generic over the CRC32C backend and marked
//! `#[inline(always)]` so the hardware kernels compile the whole tier tree
//! inside their `#[target_feature]` entry points.

use std::fmt;

use strhash_common::log2_floor;
use strhash_common::words::{last_u64, u32_at, u64_at};
use strhash_common::Crc32cWord;

use crate::positions::{RandomPositions, ORDERS};

/// Number of equal chunks a long string is split into.
const CHUNKS: usize = 16;

/// Which sub-algorithm handles a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Tier {
    Tiny,
    Short,
    Medium,
    Long,
}

impl Tier {
    /// Shortest length of the long tier.
    pub const LONG_MIN: usize = 128;

    /// Tier for a string of `len` bytes, `None` for zero.
    #[inline]
    pub const fn for_len(len: usize) -> Option<Tier> {
        match len {
            0 => None,
            1..=3 => Some(Tier::Tiny),
            4..=15 => Some(Tier::Short),
            16..=127 => Some(Tier::Medium),
            _ => Some(Tier::Long),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tier::Tiny => "tiny",
            Tier::Short => "short",
            Tier::Medium => "medium",
            Tier::Long => "long",
        }
    }

    /// Whether the tier consults the random position table.
    pub const fn is_randomized(self) -> bool {
        matches!(self, Tier::Long)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash `s` with the tier its length selects.
///
/// `s` must not be empty.
#[inline(always)]
pub fn hash<C: Crc32cWord>(crc: C, s: &[u8], positions: &RandomPositions) -> u32 {
    debug_assert!(!s.is_empty(), "string hash input must not be empty");
    let len = s.len();
    if len < Tier::LONG_MIN {
        if len >= 16 {
            return hash_medium(crc, s);
        }
        if len >= 4 {
            return hash_short(crc, s);
        }
        return hash_tiny(crc, s);
    }
    hash_long(crc, s, positions)
}

/// 1-3 bytes: pack first, middle and last byte plus the length into one word.
#[inline(always)]
pub fn hash_tiny<C: Crc32cWord>(crc: C, s: &[u8]) -> u32 {
    let len = s.len();
    let mut v = s[0] as u32;
    v = (v << 8) | s[len >> 1] as u32;
    v = (v << 8) | s[len - 1] as u32;
    v = (v << 8) | len as u32;
    crc.update_u32(0, v)
}

/// 4-15 bytes: the length, then a head word and a tail word.
///
/// The two words overlap unless the length is exactly twice the word size.
#[inline(always)]
pub fn hash_short<C: Crc32cWord>(crc: C, s: &[u8]) -> u32 {
    let len = s.len();
    let h = crc.update_u32(0, len as u32);
    if len >= 8 {
        let h = crc.update_u64(h, u64_at(s, 0));
        crc.update_u64(h, last_u64(s))
    } else {
        let h = crc.update_u32(h, u32_at(s, 0));
        crc.update_u32(h, u32_at(s, len - 4))
    }
}

/// 16-127 bytes: two accumulators over interleaved 8-byte lanes.
///
/// Each stride adds the updated CRC back into its accumulator instead of
/// replacing it. The final 16 bytes are always folded in, overlapping the
/// last stride when the length is not a multiple of 16.
///
/// # Panics
///
/// Panics if `s` is shorter than 16 bytes. [`hash`] only calls this for
/// 16..=127.
#[inline(always)]
pub fn hash_medium<C: Crc32cWord>(crc: C, s: &[u8]) -> u32 {
    let len = s.len();
    assert!(len >= 16, "medium tier needs at least 16 bytes, got {len}");
    let mut h1 = crc.update_u32(0, len as u32);
    let mut h2 = 0u32;

    let mut i = 0;
    while i < len - 16 {
        h1 = h1.wrapping_add(crc.update_u64(h1, u64_at(s, i)));
        h2 = h2.wrapping_add(crc.update_u64(h2, u64_at(s, i + 8)));
        i += 16;
    }

    h1 = crc.update_u64(h1, u64_at(s, len - 16));
    h2 = crc.update_u64(h2, last_u64(s));

    crc.update_u32(h1, h2)
}

/// 128+ bytes: sample one word per chunk at random offsets.
///
/// With `chunk = len / 16` and `pos < 2^(order+1) <= 2 * chunk`, the
/// furthest sampled word ends before `9 * chunk + 8 <= len`, so no read
/// leaves the slice.
///
/// # Panics
///
/// Panics if `s` is shorter than [`Tier::LONG_MIN`] bytes.
#[inline(always)]
pub fn hash_long<C: Crc32cWord>(crc: C, s: &[u8], positions: &RandomPositions) -> u32 {
    let len = s.len();
    assert!(len >= Tier::LONG_MIN, "long tier needs at least 128 bytes, got {len}");
    let chunk = len / CHUNKS;
    let order = log2_floor(u32::try_from(chunk).unwrap_or(u32::MAX)) as usize;
    let [pos1, pos2] = positions.get(order.min(ORDERS - 1)).map(|p| p as usize);

    let mut h1 = crc.update_u32(0, len as u32);
    let mut h2 = 0u32;

    let mut base = 0;
    for _ in 0..CHUNKS / 2 - 1 {
        h1 = crc.update_u64(h1, u64_at(s, base + pos1));
        h2 = crc.update_u64(h2, u64_at(s, base + chunk + pos2));
        base += chunk;
    }

    // Last pair: h2 reads back from the chunk end.
    h1 = crc.update_u64(h1, u64_at(s, base + pos1));
    h2 = crc.update_u64(h2, u64_at(s, base + chunk - 8 - pos2));

    // Both ends always count.
    h1 = crc.update_u64(h1, u64_at(s, 0));
    h2 = crc.update_u64(h2, last_u64(s));

    crc.update_u32(h1, h2)
}
