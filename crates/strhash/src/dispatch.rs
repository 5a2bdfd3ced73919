//! Kernel selection and the process-wide binding.
//!
//! A [`Binding`] pairs one hash kernel with its random position table. The
//! process-wide binding is created once, on first use or by an explicit
//! [`try_init`], and never changes afterwards. Every hash call is then a
//! single indirect call through an immutable function pointer, so any
//! number of threads may hash concurrently without coordination.

use std::fmt;
use std::sync::OnceLock;

#[cfg(target_arch = "aarch64")]
use strhash_common::crc::ArmCrc;
#[cfg(target_arch = "x86_64")]
use strhash_common::crc::Sse42;
use strhash_common::Portable;

use crate::config::{Backend, Config};
use crate::positions::RandomPositions;
use crate::{sparse, tiered, Caps, Error, Result};

/// Signature shared by every kernel.
pub type HashFn = fn(&[u8], &RandomPositions) -> u32;

/// A concrete string hash implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kernel {
    /// Tiered hash on SSE4.2 `crc32`.
    #[cfg(target_arch = "x86_64")]
    Sse42,
    /// Tiered hash on the ARMv8 CRC32 extension.
    #[cfg(target_arch = "aarch64")]
    ArmCrc,
    /// Tiered hash on table-driven CRC32C.
    Portable,
    /// Sparse fallback hash.
    Fallback,
}

impl Kernel {
    pub const fn name(self) -> &'static str {
        match self {
            #[cfg(target_arch = "x86_64")]
            Kernel::Sse42 => "tiered/sse4.2",
            #[cfg(target_arch = "aarch64")]
            Kernel::ArmCrc => "tiered/aarch64-crc",
            Kernel::Portable => "tiered/portable",
            Kernel::Fallback => "sparse",
        }
    }

    /// Whether the kernel needs a CPU instruction.
    pub const fn is_accelerated(self) -> bool {
        !matches!(self, Kernel::Portable | Kernel::Fallback)
    }

    /// Whether long inputs are sampled at per-process offsets.
    pub const fn is_randomized(self) -> bool {
        !matches!(self, Kernel::Fallback)
    }

    fn entry(self) -> HashFn {
        match self {
            #[cfg(target_arch = "x86_64")]
            Kernel::Sse42 => hash_sse42,
            #[cfg(target_arch = "aarch64")]
            Kernel::ArmCrc => hash_arm_crc,
            Kernel::Portable => hash_portable,
            Kernel::Fallback => hash_sparse,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn hash_portable(s: &[u8], positions: &RandomPositions) -> u32 {
    tiered::hash(Portable, s, positions)
}

fn hash_sparse(s: &[u8], _positions: &RandomPositions) -> u32 {
    sparse::hash(s)
}

#[cfg(target_arch = "x86_64")]
fn hash_sse42(s: &[u8], positions: &RandomPositions) -> u32 {
    // SAFETY: only bound after `Caps` reported SSE4.2.
    unsafe { hash_sse42_kernel(s, positions) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.2")]
unsafe fn hash_sse42_kernel(s: &[u8], positions: &RandomPositions) -> u32 {
    // SAFETY: this function is compiled with SSE4.2 enabled.
    let crc = unsafe { Sse42::new_unchecked() };
    tiered::hash(crc, s, positions)
}

#[cfg(target_arch = "aarch64")]
fn hash_arm_crc(s: &[u8], positions: &RandomPositions) -> u32 {
    // SAFETY: only bound after `Caps` reported the CRC extension.
    unsafe { hash_arm_crc_kernel(s, positions) }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "crc")]
unsafe fn hash_arm_crc_kernel(s: &[u8], positions: &RandomPositions) -> u32 {
    // SAFETY: this function is compiled with the CRC extension enabled.
    let crc = unsafe { ArmCrc::new_unchecked() };
    tiered::hash(crc, s, positions)
}

/// A selected kernel together with the position table it reads.
#[derive(Clone)]
pub struct Binding {
    kernel: Kernel,
    func: HashFn,
    caps: Caps,
    positions: RandomPositions,
}

impl Binding {
    /// Probe the CPU, build the position table and select a kernel.
    ///
    /// The table is built even when the fallback is selected.
    pub fn new(config: &Config) -> Self {
        let caps = Caps::detect();
        let kernel = match config.backend {
            Backend::Auto => caps.accelerated().unwrap_or(Kernel::Fallback),
            Backend::Portable => Kernel::Portable,
            Backend::Fallback => Kernel::Fallback,
        };
        let positions = RandomPositions::generate(config.seed.resolve());

        tracing::debug!(
            kernel = %kernel,
            backend = %config.backend,
            seed = positions.seed(),
            accelerated = caps.accelerated().is_some(),
            "bound string hash kernel"
        );

        Self {
            kernel,
            func: kernel.entry(),
            caps,
            positions,
        }
    }

    /// Bind a specific kernel to an existing table.
    ///
    /// Fails if the kernel needs an instruction this CPU lacks.
    pub fn with_kernel(kernel: Kernel, positions: RandomPositions) -> Result<Self> {
        let caps = Caps::detect();
        if !caps.supports(kernel) {
            return Err(Error::Unsupported {
                kernel: kernel.name(),
            });
        }
        Ok(Self {
            kernel,
            func: kernel.entry(),
            caps,
            positions,
        })
    }

    /// Hash `s`.
    ///
    /// # Panics
    ///
    /// Panics if `s` is empty. Use [`try_hash`](Self::try_hash) for a
    /// checked call.
    #[inline]
    pub fn hash(&self, s: &[u8]) -> u32 {
        assert!(!s.is_empty(), "string hash input must not be empty");
        (self.func)(s, &self.positions)
    }

    /// Hash `s`, rejecting empty input.
    #[inline]
    pub fn try_hash(&self, s: &[u8]) -> Result<u32> {
        if s.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok((self.func)(s, &self.positions))
    }

    /// The selected kernel.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The capability probe result recorded at bind time.
    pub fn caps(&self) -> Caps {
        self.caps
    }

    /// The position table long inputs are sampled with.
    pub fn positions(&self) -> &RandomPositions {
        &self.positions
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kernel", &self.kernel)
            .field("caps", &self.caps)
            .field("seed", &self.positions.seed())
            .finish()
    }
}

static BINDING: OnceLock<Binding> = OnceLock::new();

/// The process-wide binding, created on first use.
///
/// The first call reads [`Config::from_env`]; malformed variables are
/// logged and the defaults used instead.
pub fn binding() -> &'static Binding {
    BINDING.get_or_init(|| {
        let config = Config::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring malformed strhash environment");
            Config::default()
        });
        Binding::new(&config)
    })
}

/// Create the process-wide binding from an explicit configuration.
///
/// Must run before the first hash call; afterwards the binding is fixed and
/// this returns [`Error::AlreadyInitialized`].
pub fn try_init(config: Config) -> Result<&'static Binding> {
    let mut created = false;
    let bound = BINDING.get_or_init(|| {
        created = true;
        Binding::new(&config)
    });
    if created {
        Ok(bound)
    } else {
        Err(Error::AlreadyInitialized)
    }
}

/// Hash `s` with the process-wide binding.
///
/// # Panics
///
/// Panics if `s` is empty.
#[inline]
pub fn hash(s: &[u8]) -> u32 {
    binding().hash(s)
}

/// Hash `s` with the process-wide binding, rejecting empty input.
#[inline]
pub fn try_hash(s: &[u8]) -> Result<u32> {
    binding().try_hash(s)
}

/// Hash a string's UTF-8 bytes with the process-wide binding.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Seed;

    fn fixed(backend: Backend, seed: u32) -> Binding {
        Binding::new(&Config::default().with_backend(backend).with_seed(Seed::Fixed(seed)))
    }

    #[test]
    fn test_auto_selects_hardware_or_fallback() {
        let bound = fixed(Backend::Auto, 1);
        match Caps::detect().accelerated() {
            Some(kernel) => assert_eq!(bound.kernel(), kernel),
            None => assert_eq!(bound.kernel(), Kernel::Fallback),
        }
    }

    #[test]
    fn test_forced_backends() {
        assert_eq!(fixed(Backend::Portable, 1).kernel(), Kernel::Portable);
        assert_eq!(fixed(Backend::Fallback, 1).kernel(), Kernel::Fallback);
    }

    #[test]
    fn test_table_built_for_fallback_too() {
        let bound = fixed(Backend::Fallback, 77);
        assert_eq!(bound.positions(), &RandomPositions::generate(77));
    }

    #[test]
    fn test_empty_input() {
        let bound = fixed(Backend::Portable, 1);
        assert!(matches!(bound.try_hash(b""), Err(Error::EmptyInput)));
        assert!(matches!(try_hash(b""), Err(Error::EmptyInput)));
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_empty_input_panics() {
        fixed(Backend::Fallback, 1).hash(b"");
    }

    #[test]
    fn test_hardware_matches_portable() {
        let Some(kernel) = Caps::detect().accelerated() else {
            return;
        };
        let positions = RandomPositions::generate(0xABCD);
        let hw = Binding::with_kernel(kernel, positions.clone()).unwrap();
        let sw = Binding::with_kernel(Kernel::Portable, positions).unwrap();

        let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 + 7) as u8).collect();
        for len in (1..300).chain([511, 512, 1023, 4096, 5000]) {
            assert_eq!(hw.hash(&data[..len]), sw.hash(&data[..len]), "len {len}");
        }
    }

    #[test]
    fn test_unsupported_kernel_rejected() {
        let caps = Caps::detect();
        #[cfg(target_arch = "x86_64")]
        let kernel = Kernel::Sse42;
        #[cfg(target_arch = "aarch64")]
        let kernel = Kernel::ArmCrc;
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        let kernel = Kernel::Portable;

        let result = Binding::with_kernel(kernel, RandomPositions::generate(0));
        if caps.supports(kernel) {
            assert_eq!(result.unwrap().kernel(), kernel);
        } else {
            assert!(matches!(result, Err(Error::Unsupported { .. })));
        }
    }

    #[test]
    fn test_global_binding_is_fixed() {
        let first = binding();
        assert!(std::ptr::eq(first, binding()));
        assert!(matches!(
            try_init(Config::default()),
            Err(Error::AlreadyInitialized)
        ));
        assert_eq!(hash(b"stable"), hash(b"stable"));
        assert_eq!(hash_str("stable"), hash(b"stable"));
    }

    #[test]
    fn test_kernel_names() {
        assert_eq!(Kernel::Portable.to_string(), "tiered/portable");
        assert_eq!(Kernel::Fallback.name(), "sparse");
        assert!(!Kernel::Fallback.is_randomized());
        assert!(Kernel::Portable.is_randomized());
        assert!(!Kernel::Portable.is_accelerated());
    }
}
