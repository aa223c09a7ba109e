//! Process-wide pre-warming of the pooled allocator (§4.2.3).

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::pool;

static WARMED_UP_TO: AtomicU64 = AtomicU64::new(0);

/// log2(phi), the growth rate of F(n)'s bit length.
const LOG2_PHI: f64 = 0.694_241_913_630_617_8;

/// Estimates the word length of F(n) without computing it.
fn estimated_words_for(n: u64) -> usize {
    let bits = (n as f64 * LOG2_PHI).ceil() as u64 + 1;
    ((bits / 64) + 1) as usize
}

/// Pre-fills the size classes needed for `F(max_n)` with a handful of
/// buffers each, so the first real call doesn't pay for cold pools.
/// Idempotent: calling with a smaller or equal `max_n` than a previous
/// call is a no-op.
pub fn ensure_warmed(max_n: u64) {
    let already = WARMED_UP_TO.load(AtomicOrdering::Acquire);
    if max_n <= already {
        return;
    }
    let words = estimated_words_for(max_n);
    let count = if max_n > 10_000_000 {
        2
    } else if max_n > 100_000 {
        4
    } else {
        6
    };
    pool::global().prewarm(words, count);
    tracing::debug!(max_n, words, count, "pool pre-warmed");
    WARMED_UP_TO.store(max_n, AtomicOrdering::Release);
}
