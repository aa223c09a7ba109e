//! Small-index lookup table, `F(0)..=F(93)` (§4.11, C11).
//!
//! `F(93)` is the largest Fibonacci number that fits in a `u64`;
//! `F(94)` overflows it. The table is built once, iteratively, rather
//! than typed in as 94 literal constants.

use std::sync::OnceLock;

pub const MAX_SMALL_INDEX: u64 = 93;

static TABLE: OnceLock<[u64; 94]> = OnceLock::new();

fn table() -> &'static [u64; 94] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; 94];
        t[1] = 1;
        for i in 2..94 {
            t[i] = t[i - 1] + t[i - 2];
        }
        t
    })
}

/// `F(n)` for `n <= 93`, or `None` if `n` is out of the table's range.
pub fn get(n: u64) -> Option<u64> {
    if n <= MAX_SMALL_INDEX {
        Some(table()[n as usize])
    } else {
        None
    }
}
