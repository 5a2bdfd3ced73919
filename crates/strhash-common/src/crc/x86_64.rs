//! SSE4.2 `crc32` instructions (CRC32C polynomial).

use std::arch::x86_64::{_mm_crc32_u32, _mm_crc32_u64};

use super::Crc32cWord;

/// Capability token for the SSE4.2 CRC32C instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sse42 {
    _private: (),
}

impl Sse42 {
    /// Probe the CPU. Returns a token only if SSE4.2 is present.
    #[inline]
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("sse4.2") {
            Some(Self { _private: () })
        } else {
            None
        }
    }

    /// Create a token without probing.
    ///
    /// # Safety
    ///
    /// The CPU must support SSE4.2, e.g. because the caller is itself
    /// compiled with `#[target_feature(enable = "sse4.2")]`.
    #[inline(always)]
    pub const unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }
}

impl Crc32cWord for Sse42 {
    #[inline(always)]
    fn update_u32(self, crc: u32, word: u32) -> u32 {
        // SAFETY: a token only exists once SSE4.2 support is established.
        unsafe { _mm_crc32_u32(crc, word) }
    }

    #[inline(always)]
    fn update_u64(self, crc: u32, word: u64) -> u32 {
        // SAFETY: as above. The instruction zero-extends the 32-bit state.
        unsafe { _mm_crc32_u64(crc as u64, word) as u32 }
    }
}
