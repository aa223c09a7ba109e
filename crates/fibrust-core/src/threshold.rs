//! Dynamic threshold manager (§4.12, C12, optional).
//!
//! Tracks a running average throughput (bits per microsecond) for each
//! multiplication tier near its crossover point and nudges the
//! crossover bit length when one tier is consistently outperforming
//! its neighbor by more than the hysteresis band — without oscillating
//! on every single sample.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::Mutex;

use crate::config::Thresholds;

/// Crossover moves by at most this fraction per adjustment, and only
/// once the observed gap exceeds it — a simple hysteresis band.
const HYSTERESIS: f64 = 0.15;

const MIN_FFT_BITS: u64 = 100_000;
const MIN_PARALLEL_BITS: u64 = 1_024;

#[derive(Clone, Copy, Debug)]
struct Sample {
    bits: u64,
    nanos: u64,
}

struct TierStats {
    samples: Mutex<Vec<Sample>>,
}

impl TierStats {
    fn new() -> Self {
        TierStats {
            samples: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, bits: u64, nanos: u64) {
        let mut s = self.samples.lock();
        s.push(Sample { bits, nanos });
        if s.len() > 32 {
            s.remove(0);
        }
    }

    /// Mean throughput in bits per nanosecond, or `None` with no data.
    fn mean_throughput(&self) -> Option<f64> {
        let s = self.samples.lock();
        if s.is_empty() {
            return None;
        }
        let total: f64 = s.iter().map(|sample| sample.bits as f64 / sample.nanos.max(1) as f64).sum();
        Some(total / s.len() as f64)
    }
}

/// Timing records for the tiers adjacent to the Karatsuba/FFT and
/// parallel/sequential crossovers, plus the currently effective
/// thresholds.
pub struct ThresholdManager {
    karatsuba: TierStats,
    fft: TierStats,
    sequential: TierStats,
    parallel: TierStats,
    fft_bits: AtomicU64,
    parallel_bits: AtomicU64,
}

impl ThresholdManager {
    pub fn new(initial: &Thresholds) -> Self {
        ThresholdManager {
            karatsuba: TierStats::new(),
            fft: TierStats::new(),
            sequential: TierStats::new(),
            parallel: TierStats::new(),
            fft_bits: AtomicU64::new(initial.fft_bits),
            parallel_bits: AtomicU64::new(initial.parallel_bits),
        }
    }

    pub fn record_karatsuba(&self, bits: u64, nanos: u64) {
        self.karatsuba.record(bits, nanos);
    }

    pub fn record_fft(&self, bits: u64, nanos: u64) {
        self.fft.record(bits, nanos);
    }

    pub fn record_sequential(&self, bits: u64, nanos: u64) {
        self.sequential.record(bits, nanos);
    }

    pub fn record_parallel(&self, bits: u64, nanos: u64) {
        self.parallel.record(bits, nanos);
    }

    pub fn current_fft_bits(&self) -> u64 {
        self.fft_bits.load(AtomicOrdering::Acquire)
    }

    pub fn current_parallel_bits(&self) -> u64 {
        self.parallel_bits.load(AtomicOrdering::Acquire)
    }

    /// Re-evaluates both crossovers against their accumulated samples,
    /// nudging whichever one has drifted past the hysteresis band.
    pub fn adjust(&self) {
        if let (Some(k), Some(f)) = (self.karatsuba.mean_throughput(), self.fft.mean_throughput()) {
            let current = self.fft_bits.load(AtomicOrdering::Acquire);
            let adjusted = nudge(current, k, f, MIN_FFT_BITS);
            if adjusted != current {
                self.fft_bits.store(adjusted, AtomicOrdering::Release);
                tracing::debug!(from = current, to = adjusted, "fft threshold adjusted");
            }
        }
        if let (Some(s), Some(p)) = (self.sequential.mean_throughput(), self.parallel.mean_throughput()) {
            let current = self.parallel_bits.load(AtomicOrdering::Acquire);
            let adjusted = nudge(current, p, s, MIN_PARALLEL_BITS);
            if adjusted != current {
                self.parallel_bits.store(adjusted, AtomicOrdering::Release);
                tracing::debug!(from = current, to = adjusted, "parallel threshold adjusted");
            }
        }
    }
}

/// If the tier that currently sits *above* the crossover (`above`) is
/// outperforming the tier below it (`below`) by more than
/// [`HYSTERESIS`], lower the crossover by that fraction (it should have
/// kicked in sooner); if `below` is the one winning by that much,
/// raise it. Otherwise leave it alone.
fn nudge(current: u64, below: f64, above: f64, floor: u64) -> u64 {
    if below <= 0.0 || above <= 0.0 {
        return current;
    }
    let ratio = above / below;
    if ratio > 1.0 + HYSTERESIS {
        (current as f64 * (1.0 - HYSTERESIS)).round().max(floor as f64) as u64
    } else if below / above > 1.0 + HYSTERESIS {
        (current as f64 * (1.0 + HYSTERESIS)).round().max(floor as f64) as u64
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_leaves_thresholds_untouched() {
        let t = Thresholds::default();
        let mgr = ThresholdManager::new(&t);
        mgr.adjust();
        assert_eq!(mgr.current_fft_bits(), t.fft_bits);
    }

    #[test]
    fn lopsided_throughput_lowers_the_crossover() {
        let t = Thresholds::default();
        let mgr = ThresholdManager::new(&t);
        for _ in 0..8 {
            mgr.record_karatsuba(100_000, 10_000);
            mgr.record_fft(100_000, 1_000); // FFT ten times faster here
        }
        mgr.adjust();
        assert!(mgr.current_fft_bits() < t.fft_bits);
    }

    #[test]
    fn balanced_throughput_does_not_move_the_crossover() {
        let t = Thresholds::default();
        let mgr = ThresholdManager::new(&t);
        for _ in 0..8 {
            mgr.record_karatsuba(100_000, 1_000);
            mgr.record_fft(100_000, 1_000);
        }
        mgr.adjust();
        assert_eq!(mgr.current_fft_bits(), t.fft_bits);
    }
}
