//! CRC32C mixing primitives.
//!
//! The string hash uses CRC32C (Castagnoli) purely as a fast integer mixer.
//! Every update here works on the *raw* CRC register: no initial or final
//! inversion, exactly what the `crc32cw`/`crc32cd` (ARMv8) and
//! `_mm_crc32_u32`/`_mm_crc32_u64` (SSE4.2) instructions compute. Words are
//! consumed least significant byte first.

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
pub use aarch64::ArmCrc;
#[cfg(target_arch = "x86_64")]
pub use x86_64::Sse42;

/// A source of raw CRC32C word updates.
///
/// Implementors are zero-sized tokens. Holding a value proves the
/// underlying instructions may be executed on this CPU.
pub trait Crc32cWord: Copy {
    /// Fold a 32-bit word into `crc`.
    fn update_u32(self, crc: u32, word: u32) -> u32;

    /// Fold a 64-bit word into `crc`.
    fn update_u64(self, crc: u32, word: u64) -> u32;
}

/// Table-driven CRC32C backed by the `crc32c` crate.
///
/// Always available. Used to seed the random position table and as the
/// reference backend for the tiered hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Portable;

impl Crc32cWord for Portable {
    #[inline]
    fn update_u32(self, crc: u32, word: u32) -> u32 {
        raw_update(crc, &word.to_le_bytes())
    }

    #[inline]
    fn update_u64(self, crc: u32, word: u64) -> u32 {
        raw_update(crc, &word.to_le_bytes())
    }
}

/// Raw register update over arbitrary bytes.
///
/// `crc32c_append` inverts on entry and exit, so undo both.
#[inline]
pub fn raw_update(crc: u32, data: &[u8]) -> u32 {
    !crc32c::crc32c_append(!crc, data)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Bit-at-a-time raw CRC32C, independent of any table or instruction.
    pub(crate) fn bitwise(mut crc: u32, data: &[u8]) -> u32 {
        for &b in data {
            crc ^= b as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0x82F6_3B78
                } else {
                    crc >> 1
                };
            }
        }
        crc
    }

    const WORDS: [u64; 6] = [
        0,
        1,
        0x6162_6364,
        0xDEAD_BEEF_CAFE_F00D,
        u64::MAX,
        0x8000_0000_0000_0001,
    ];

    #[test]
    fn test_bitwise_known_answer() {
        assert_eq!(!bitwise(!0, b"123456789"), 0xE306_9283);
    }

    #[test]
    fn test_raw_update_known_answer() {
        assert_eq!(!raw_update(!0, b"123456789"), 0xE306_9283);
    }

    #[test]
    fn test_raw_update_empty_is_identity() {
        assert_eq!(raw_update(0x1234_5678, &[]), 0x1234_5678);
    }

    #[test]
    fn test_portable_matches_bitwise() {
        for &seed in &[0u32, 1, 0xFFFF_FFFF, 0x1234_5678] {
            for &w in &WORDS {
                assert_eq!(
                    Portable.update_u64(seed, w),
                    bitwise(seed, &w.to_le_bytes())
                );
                let w32 = w as u32;
                assert_eq!(
                    Portable.update_u32(seed, w32),
                    bitwise(seed, &w32.to_le_bytes())
                );
            }
        }
    }

    #[test]
    fn test_zero_state_zero_word() {
        // The raw register is linear: zero in, zero out.
        assert_eq!(Portable.update_u32(0, 0), 0);
        assert_eq!(Portable.update_u64(0, 0), 0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse42_matches_portable() {
        let Some(hw) = Sse42::detect() else {
            return;
        };
        for &seed in &[0u32, 7, 0xFFFF_FFFF] {
            for &w in &WORDS {
                assert_eq!(hw.update_u64(seed, w), Portable.update_u64(seed, w));
                assert_eq!(
                    hw.update_u32(seed, w as u32),
                    Portable.update_u32(seed, w as u32)
                );
            }
        }
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_arm_crc_matches_portable() {
        let Some(hw) = ArmCrc::detect() else {
            return;
        };
        for &seed in &[0u32, 7, 0xFFFF_FFFF] {
            for &w in &WORDS {
                assert_eq!(hw.update_u64(seed, w), Portable.update_u64(seed, w));
                assert_eq!(
                    hw.update_u32(seed, w as u32),
                    Portable.update_u32(seed, w as u32)
                );
            }
        }
    }
}
