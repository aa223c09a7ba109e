//! # fibrust-core
//!
//! An arbitrary-precision Fibonacci engine built from the ground up:
//! its own big-integer primitive, a Schönhage–Strassen multiplier over
//! a Fermat-ring NTT, an adaptive schoolbook/Karatsuba/FFT multiplier,
//! and two independent O(log n) drivers (fast doubling and matrix
//! exponentiation) that are cross-checked to agree bit-for-bit.
//!
//! ```
//! use fibrust_core::{calculate, Algorithm, CancellationToken, NoopReporter, Thresholds};
//!
//! let mut reporter = NoopReporter;
//! let f100 = calculate(
//!     100,
//!     Algorithm::FastDoubling,
//!     Thresholds::default(),
//!     &CancellationToken::new(),
//!     &mut reporter,
//! )
//! .unwrap();
//! assert_eq!(f100.bit_length(), 69);
//! ```

mod alloc;
mod bigint;
mod config;
mod driver;
mod error;
mod fermat;
mod fft;
mod lookup;
mod multiply;
mod progress;
mod threshold;
mod wordvec;

pub use alloc::ensure_warmed;
pub use bigint::BigUint;
pub use config::{Algorithm, Thresholds};
pub use error::{FibError, FibResult};
pub use fft::{TransformCacheConfig, TransformCacheStats};
pub use progress::{CancellationToken, NoopReporter, ProgressReporter};
pub use threshold::ThresholdManager;

use std::sync::OnceLock;

use fft::TransformCache;

static GLOBAL_CACHE: OnceLock<TransformCache> = OnceLock::new();

fn global_cache() -> &'static TransformCache {
    GLOBAL_CACHE.get_or_init(|| TransformCache::new(TransformCacheConfig::default()))
}

/// Replaces the process-wide transform cache's configuration (§4.6).
pub fn configure_fft_cache(config: TransformCacheConfig) {
    global_cache().reconfigure(config);
}

/// Drops every entry from the process-wide transform cache.
pub fn clear_fft_cache() {
    global_cache().clear();
}

/// Hit/miss/eviction counters for the process-wide transform cache.
pub fn fft_cache_stats() -> TransformCacheStats {
    global_cache().stats()
}

/// Builds a standalone [`ThresholdManager`] (C12). Dynamic threshold
/// tuning is an optional capability: `calculate` itself always uses
/// the `Thresholds` it is given, so a caller that wants adaptive
/// behavior records timings into a manager of its own and feeds
/// `current_fft_bits()`/`current_parallel_bits()` back into the next
/// call's `Thresholds`.
pub fn new_threshold_manager(initial: &Thresholds) -> ThresholdManager {
    ThresholdManager::new(initial)
}

/// Computes `F(n)` (§6).
///
/// `n` up to 93 is served directly from the small-index table (C11)
/// regardless of `algorithm`. Beyond that, `algorithm` selects the
/// driver: [`Algorithm::FastDoubling`] and [`Algorithm::MatrixExp`] are
/// independent O(log n) implementations that must agree bit-for-bit;
/// [`Algorithm::FftAlways`] runs the fast-doubling driver with its
/// multiplier forced to the FFT tier regardless of operand size, which
/// exists for testing the FFT engine against small, easily-checked
/// inputs.
///
/// `reporter` receives cumulative fractional progress after every
/// driver iteration. `cancel` is checked once per iteration; a
/// cancelled token surfaces as [`FibError::Cancelled`]. Internal pool
/// exhaustion never reaches the caller (§7) — the pool always falls
/// back to a direct heap allocation.
pub fn calculate(
    n: u64,
    algorithm: Algorithm,
    thresholds: Thresholds,
    cancel: &CancellationToken,
    reporter: &mut dyn ProgressReporter,
) -> FibResult<BigUint> {
    let thresholds = thresholds.normalize();
    // `thresholds.fft_cache` governs the process-wide cache for this
    // call too, not just the standalone `configure_fft_cache` path —
    // every caller shares one cache, so the most recent `calculate()`
    // call's configuration wins until the next one changes it.
    let cache = global_cache();
    cache.reconfigure(thresholds.fft_cache);
    let cache = Some(cache);
    match algorithm {
        Algorithm::FastDoubling => driver::fast_doubling::calculate(n, &thresholds, cache, cancel, reporter),
        Algorithm::MatrixExp => driver::matrix::calculate(n, &thresholds, cache, cancel, reporter),
        Algorithm::FftAlways => {
            let forced = Thresholds {
                fft_bits: 0,
                karatsuba_bits: 0,
                ..thresholds
            };
            driver::fast_doubling::calculate(n, &forced, cache, cancel, reporter)
        }
    }
}
