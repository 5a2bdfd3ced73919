//! Table-driven `floor(log2(n))`.
//!
//! Values up to 127 come straight from [`LOG2_TABLE`]. Larger inputs are
//! shifted right by 8, 16 or 24 bits until they fit the table, and the shift
//! is added back. Anything whose top byte exceeds 127 has bit 31 set.

/// `floor(log2(n))` for `n` in `0..128`, with `log2(0) = -1`.
pub static LOG2_TABLE: [i8; 128] = build_table();

const fn build_table() -> [i8; 128] {
    let mut table = [0i8; 128];
    table[0] = -1;
    let mut n = 1;
    while n < 128 {
        table[n] = (usize::BITS - 1 - n.leading_zeros()) as i8;
        n += 1;
    }
    table
}

/// Return `floor(log2(n))`, or `-1` for zero.
#[inline]
pub fn log2_floor(n: u32) -> i32 {
    if n <= 127 {
        return LOG2_TABLE[n as usize] as i32;
    }
    if (n >> 8) <= 127 {
        return LOG2_TABLE[(n >> 8) as usize] as i32 + 8;
    }
    if (n >> 16) <= 127 {
        return LOG2_TABLE[(n >> 16) as usize] as i32 + 16;
    }
    if (n >> 24) <= 127 {
        return LOG2_TABLE[(n >> 24) as usize] as i32 + 24;
    }
    31
}
