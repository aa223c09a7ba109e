//! Tunable thresholds governing algorithm and backend selection (§6).

use crate::fft::TransformCacheConfig;

/// Which driver computes `F(n)` (§4.8/§4.9). `FftAlways` forces the FFT
/// tier of the adaptive multiplier even for operands that would
/// otherwise route through Karatsuba or schoolbook — used by the
/// cross-driver tests to force both drivers through their most
/// expensive multiplication path even on small inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    FastDoubling,
    MatrixExp,
    FftAlways,
}

/// Bit-length crossover points and cache configuration (§6). All
/// `_bits` fields compare against the larger of the two operands'
/// [`crate::bigint::BigUint::bit_length`].
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    /// Minimum operand bit length before a driver parallelizes its own
    /// recursion at all (§5).
    pub parallel_bits: u64,
    /// Minimum combined operand bit length before the adaptive
    /// multiplier (C6) routes to the FFT engine (C5).
    pub fft_bits: u64,
    /// Minimum operand bit length before the adaptive multiplier
    /// routes to Karatsuba instead of schoolbook.
    pub karatsuba_bits: u64,
    /// Minimum operand bit length before the matrix driver's (C9)
    /// accumulate-multiply step switches from a classic schoolbook 2x2
    /// product to the 7-multiplication Strassen–Winograd fold.
    pub strassen_bits: u64,
    pub fft_cache: TransformCacheConfig,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            parallel_bits: 4_096,
            fft_bits: 500_000,
            karatsuba_bits: 2_000,
            strassen_bits: 256,
            fft_cache: TransformCacheConfig::default(),
        }
    }
}

impl Thresholds {
    /// Clamps each threshold to a sane floor and enforces
    /// `karatsuba_bits <= fft_bits` (an inverted ladder would mean the
    /// FFT tier is never reached). Called once by
    /// [`crate::calculate`] before a driver sees the thresholds.
    pub fn normalize(mut self) -> Self {
        self.parallel_bits = self.parallel_bits.max(256);
        self.karatsuba_bits = self.karatsuba_bits.max(64);
        self.strassen_bits = self.strassen_bits.max(64);
        if self.fft_bits < self.karatsuba_bits {
            self.fft_bits = self.karatsuba_bits;
        }
        self.fft_cache.max_entries = self.fft_cache.max_entries.max(1);
        self
    }
}
