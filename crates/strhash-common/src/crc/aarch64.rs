//! ARMv8 CRC32 extension (`crc32cw` / `crc32cd`).

use std::arch::aarch64::{__crc32cd, __crc32cw};

use super::Crc32cWord;

/// Capability token for the ARMv8 CRC32C instructions.
///
/// On Linux the probe reads the `HWCAP_CRC32` bit of the auxiliary vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmCrc {
    _private: (),
}

impl ArmCrc {
    /// Probe the CPU. Returns a token only if the `crc` feature is present.
    #[inline]
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("crc") {
            Some(Self { _private: () })
        } else {
            None
        }
    }

    /// Create a token without probing.
    ///
    /// # Safety
    ///
    /// The CPU must support the `crc` target feature.
    #[inline(always)]
    pub const unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }
}

impl Crc32cWord for ArmCrc {
    #[inline(always)]
    fn update_u32(self, crc: u32, word: u32) -> u32 {
        // SAFETY: a token only exists once the `crc` feature is established.
        unsafe { __crc32cw(crc, word) }
    }

    #[inline(always)]
    fn update_u64(self, crc: u32, word: u64) -> u32 {
        // SAFETY: as above.
        unsafe { __crc32cd(crc, word) }
    }
}
