//! CPU capability probe.
//!
//! On x86_64 this checks CPUID for SSE4.2; on aarch64 it checks the CRC32
//! extension (`HWCAP_CRC32` on Linux). Other targets never report a
//! hardware kernel.

#[cfg(target_arch = "aarch64")]
use strhash_common::crc::ArmCrc;
#[cfg(target_arch = "x86_64")]
use strhash_common::crc::Sse42;

use crate::Kernel;

/// Result of the one-time capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Caps {
    accelerated: Option<Kernel>,
}

impl Caps {
    /// Query the host CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        if Sse42::detect().is_some() {
            return Self {
                accelerated: Some(Kernel::Sse42),
            };
        }

        #[cfg(target_arch = "aarch64")]
        if ArmCrc::detect().is_some() {
            return Self {
                accelerated: Some(Kernel::ArmCrc),
            };
        }

        Self::none()
    }

    /// A probe result with no hardware support.
    pub const fn none() -> Self {
        Self { accelerated: None }
    }

    /// The hardware kernel this CPU can run, if any.
    pub const fn accelerated(&self) -> Option<Kernel> {
        self.accelerated
    }

    /// Whether `kernel` can run on this CPU.
    pub fn supports(&self, kernel: Kernel) -> bool {
        !kernel.is_accelerated() || self.accelerated == Some(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_kernels_always_supported() {
        for caps in [Caps::none(), Caps::detect()] {
            assert!(caps.supports(Kernel::Portable));
            assert!(caps.supports(Kernel::Fallback));
        }
    }

    #[test]
    fn test_none_rejects_hardware() {
        #[cfg(target_arch = "x86_64")]
        assert!(!Caps::none().supports(Kernel::Sse42));
        #[cfg(target_arch = "aarch64")]
        assert!(!Caps::none().supports(Kernel::ArmCrc));
        assert_eq!(Caps::none().accelerated(), None);
    }

    #[test]
    fn test_detect_is_consistent() {
        let caps = Caps::detect();
        assert_eq!(caps, Caps::detect());
        if let Some(kernel) = caps.accelerated() {
            assert!(kernel.is_accelerated());
            assert!(caps.supports(kernel));
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_detect_matches_std_probe() {
        assert_eq!(
            Caps::detect().accelerated().is_some(),
            is_x86_feature_detected!("sse4.2")
        );
    }
}
