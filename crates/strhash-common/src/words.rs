//! Little-endian word loads.
//!
//! Offsets are bounds-checked by slicing. Callers in the hash tiers only
//! ask for ranges that lie inside the input.

use byteorder::{ByteOrder, LittleEndian};

/// Load the 32-bit little-endian word starting at `offset`.
#[inline(always)]
pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&bytes[offset..offset + 4])
}

/// Load the 64-bit little-endian word starting at `offset`.
#[inline(always)]
pub fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    LittleEndian::read_u64(&bytes[offset..offset + 8])
}

/// Load the last 8 bytes as a little-endian word.
#[inline(always)]
pub fn last_u64(bytes: &[u8]) -> u64 {
    u64_at(bytes, bytes.len() - 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_at() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        assert_eq!(u32_at(&data, 0), 0x0403_0201);
        assert_eq!(u32_at(&data, 1), 0x0504_0302);
    }

    #[test]
    fn test_u64_at() {
        let data: Vec<u8> = (1..=9).collect();
        assert_eq!(u64_at(&data, 0), 0x0807_0605_0403_0201);
        assert_eq!(u64_at(&data, 1), 0x0908_0706_0504_0302);
        assert_eq!(last_u64(&data), u64_at(&data, 1));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        u64_at(&[0u8; 8], 1);
    }
}
