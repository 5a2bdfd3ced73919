//! Per-process random sampling offsets.
//!
//! Long strings are hashed by reading a fixed number of words at offsets
//! chosen once per process. Row `i` of the table holds two offsets in
//! `[0, 2^(i+1))` for chunks whose size has `floor(log2) == i`. Rows below
//! [`MIN_SAMPLED_ORDER`] stay zero, as does the last row.
//!
//! The generator only yields values up to [`RAND_MAX`]. Rows whose range
//! exceeds that are filled by multiplying a fresh draw with an offset from an
//! earlier row, so randomness carries upward without a wider generator.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strhash_common::{log2_floor, Crc32cWord, Portable};

/// Number of rows, one per power-of-two order of a `u32`.
pub const ORDERS: usize = 32;

/// Chunks smaller than `2^3` bytes are never sampled.
pub const MIN_SAMPLED_ORDER: usize = 3;

/// Largest value one generator draw produces.
pub const RAND_MAX: u32 = 0x7FFF_FFFF;

/// Two random offsets per power-of-two chunk order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RandomPositions {
    seed: u32,
    rows: [[u32; 2]; ORDERS],
}

impl RandomPositions {
    /// Build the table from `seed` with the standard generator.
    pub fn generate(seed: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        Self::generate_with(seed, &mut rng, RAND_MAX)
    }

    /// Build the table from an arbitrary generator drawing in `[0, rand_max]`.
    ///
    /// `seed` is recorded for diagnostics only.
    pub fn generate_with<R: Rng + ?Sized>(seed: u32, rng: &mut R, rand_max: u32) -> Self {
        // ceil(log2(rand_max))
        let mut rml = log2_floor(rand_max);
        if rand_max & rand_max.wrapping_sub(1) != 0 {
            rml += 1;
        }
        let rml = rml.max(0) as usize;

        let mut rows = [[0u32; 2]; ORDERS];
        let direct_end = rml.clamp(MIN_SAMPLED_ORDER, ORDERS - 1);

        for order in MIN_SAMPLED_ORDER..direct_end {
            let mask = pow2_mask(order);
            for slot in 0..2 {
                rows[order][slot] = (draw(rng, rand_max) & mask) as u32;
            }
        }

        for order in direct_end..ORDERS - 1 {
            let mask = pow2_mask(order);
            for slot in 0..2 {
                let scale = match rows[order - rml][0] {
                    0 => 1,
                    s => s as u64,
                };
                rows[order][slot] = (draw(rng, rand_max).wrapping_mul(scale) & mask) as u32;
            }
        }

        tracing::trace!(seed, rand_max, "built random position table");
        Self { seed, rows }
    }

    #[cfg(test)]
    pub(crate) fn from_rows(seed: u32, rows: [[u32; 2]; ORDERS]) -> Self {
        Self { seed, rows }
    }

    /// Seed the table was generated from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The two offsets for chunk order `order`.
    ///
    /// Not bounded by the actual chunk size, only by `2^(order+1)`.
    #[inline(always)]
    pub fn get(&self, order: usize) -> [u32; 2] {
        self.rows[order]
    }

    /// All rows.
    pub fn rows(&self) -> &[[u32; 2]; ORDERS] {
        &self.rows
    }
}

#[inline]
fn pow2_mask(order: usize) -> u64 {
    (1u64 << (order + 1)) - 1
}

#[inline]
fn draw<R: Rng + ?Sized>(rng: &mut R, rand_max: u32) -> u64 {
    rng.gen_range(0..=rand_max) as u64
}

/// Seed derived from the process id and the current time in seconds,
/// folded through CRC32C from a zero state.
pub fn process_seed() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let seed = Portable.update_u32(0, std::process::id());
    Portable.update_u32(seed, secs as u32)
}
