//! Sparse fallback hash.
//!
//! Used when the CPU has no CRC32C instruction. Reads at most four 32-bit
//! words at fixed positions (head, tail, around the middle and the first
//! quarter) and mixes them with rotate/xor/subtract rounds. Deterministic
//! across processes and never consults the random position table.

use strhash_common::words::u32_at;

/// Hash `s`. `s` must not be empty.
#[inline]
pub fn hash(s: &[u8]) -> u32 {
    debug_assert!(!s.is_empty(), "string hash input must not be empty");
    let len = s.len();
    let mut h = len as u32;

    let mut a: u32;
    let mut b: u32;
    if len >= 4 {
        a = u32_at(s, 0);
        h ^= u32_at(s, len - 4);
        b = u32_at(s, (len >> 1) - 2);
        h ^= b;
        h = h.wrapping_sub(b.rotate_left(14));
        b = b.wrapping_add(u32_at(s, (len >> 2) - 1));
    } else {
        a = s[0] as u32;
        h ^= s[len - 1] as u32;
        b = s[len >> 1] as u32;
        h ^= b;
        h = h.wrapping_sub(b.rotate_left(14));
    }

    a ^= h;
    a = a.wrapping_sub(h.rotate_left(11));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(25));
    h ^= b;
    h = h.wrapping_sub(b.rotate_left(16));
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let inputs: [&[u8]; 6] = [b"a", b"ab", b"abc", b"abcd", b"hello world", &[7u8; 300]];
        for s in inputs {
            assert_eq!(hash(s), hash(s));
        }
    }

    #[test]
    fn test_distinguishes_short_inputs() {
        assert_ne!(hash(b"a"), hash(b"b"));
        assert_ne!(hash(b"ab"), hash(b"ac"));
        assert_ne!(hash(b"abc"), hash(b"abd"));
        assert_ne!(hash(b"abcd"), hash(b"abce"));
        assert_ne!(hash(b"abcd"), hash(b"bbcd"));
    }

    #[test]
    fn test_fixed_pattern_collides_on_length_xor_last_byte() {
        // Both read a = 'a', b = 'b'; the seed is len ^ last: 2 ^ 'b' == 3 ^ 'c'.
        assert_eq!(hash(b"ab"), hash(b"abc"));
    }

    #[test]
    fn test_reads_fixed_windows_only() {
        // len 64 reads [0,4), [60,64), [30,34) and [15,19).
        let base = vec![0x33u8; 64];

        let mut outside = base.clone();
        outside[20] = 0x44;
        outside[45] = 0x55;
        assert_eq!(hash(&base), hash(&outside));

        let mut inside = base.clone();
        inside[31] = 0x44;
        assert_ne!(hash(&base), hash(&inside));
    }

    #[test]
    fn test_all_small_lengths_in_bounds() {
        let data: Vec<u8> = (0..=255).collect();
        for len in 1..data.len() {
            hash(&data[..len]);
        }
    }
}
