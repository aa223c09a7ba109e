//! Cooperative cancellation and progress reporting (§4.10, C10).
//!
//! Cancellation is checked only at loop-iteration boundaries inside the
//! drivers (§5: "never inside a single arithmetic primitive"), so a
//! cancelled calculation still finishes whatever multiply or transform
//! is already in flight before it unwinds.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::error::{FibError, FibResult};

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }

    /// Returns [`FibError::Cancelled`] if cancellation has been
    /// requested. Drivers call this once per loop iteration.
    pub fn check(&self) -> FibResult<()> {
        if self.is_cancelled() {
            Err(FibError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Receives fractional progress in `[0.0, 1.0]`. A plain closure works
/// via the blanket impl below; [`NoopReporter`] is the default.
pub trait ProgressReporter {
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressReporter for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

#[derive(Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&mut self, _fraction: f64) {}
}

/// Per-step progress weights shared by the fast-doubling (C8) and
/// matrix-exponentiation (C9) drivers, so cancelling either at the same
/// wall-clock moment reports roughly the same fraction complete.
///
/// Both drivers make exactly `bit_length(n)` iterations and
/// (approximately) double the magnitude of their working values every
/// iteration, so the cost of iteration `i` scales like `4^i` (squaring
/// a value of twice the bit length costs about four times as much).
/// Weights are normalized to sum to 1.0; a driver reports cumulative
/// weight consumed so far after each iteration.
pub struct StepWeights;

impl StepWeights {
    pub fn for_bit_length(steps: u32) -> Vec<f64> {
        if steps == 0 {
            return Vec::new();
        }
        let mut raw: Vec<f64> = (0..steps).map(|i| 4f64.powi(i as i32)).collect();
        let sum: f64 = raw.iter().sum();
        for w in raw.iter_mut() {
            *w /= sum;
        }
        raw
    }
}
