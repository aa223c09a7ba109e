//! Adaptive multiplier (§4.6, C6): routes to schoolbook, Karatsuba, or
//! the FFT engine by operand bit length.

use crate::bigint::BigUint;
use crate::config::Thresholds;
use crate::error::FibResult;
use crate::fft::{self, TransformCache};

const MAX_PARALLEL_KARATSUBA_DEPTH: u32 = 3;
const PARALLEL_KARATSUBA_LEAF_BITS: u64 = 8192;

pub fn multiply(
    x: &BigUint,
    y: &BigUint,
    thresholds: &Thresholds,
    cache: Option<&TransformCache>,
) -> FibResult<BigUint> {
    let bits = x.bit_length().max(y.bit_length());
    if bits >= thresholds.fft_bits {
        fft::fft_mul(x, y, cache)
    } else if bits >= thresholds.karatsuba_bits {
        Ok(karatsuba(x, y, thresholds, cache, 0))
    } else {
        Ok(x.mul_schoolbook(y))
    }
}

pub fn square(x: &BigUint, thresholds: &Thresholds, cache: Option<&TransformCache>) -> FibResult<BigUint> {
    let bits = x.bit_length();
    if bits >= thresholds.fft_bits {
        fft::fft_square(x, cache)
    } else if bits >= thresholds.karatsuba_bits {
        Ok(karatsuba_square(x, thresholds, cache, 0))
    } else {
        Ok(x.mul_schoolbook(x))
    }
}

/// Recursive Karatsuba split. Falls back to schoolbook below the
/// configured threshold; recurses into the two same-half products in
/// parallel when both halves are still large enough and the recursion
/// has not gone past its depth cap (mirrors the FFT engine's own
/// parallel-recursion cap in spirit, §4.4/§5).
fn karatsuba(x: &BigUint, y: &BigUint, thresholds: &Thresholds, cache: Option<&TransformCache>, depth: u32) -> BigUint {
    let bits = x.bit_length().max(y.bit_length());
    if bits < thresholds.karatsuba_bits {
        return x.mul_schoolbook(y);
    }

    let half_words = ((x.words().len().max(y.words().len())) + 1) / 2;
    let (x1, x0) = split(x, half_words);
    let (y1, y0) = split(y, half_words);

    let eligible = bits >= PARALLEL_KARATSUBA_LEAF_BITS && depth < MAX_PARALLEL_KARATSUBA_DEPTH;

    let (z2, z0) = if eligible {
        rayon::join(
            || karatsuba(&x1, &y1, thresholds, cache, depth + 1),
            || karatsuba(&x0, &y0, thresholds, cache, depth + 1),
        )
    } else {
        (
            karatsuba(&x1, &y1, thresholds, cache, depth + 1),
            karatsuba(&x0, &y0, thresholds, cache, depth + 1),
        )
    };

    let x_sum = x1.add(&x0);
    let y_sum = y1.add(&y0);
    let mid_full = karatsuba(&x_sum, &y_sum, thresholds, cache, depth + 1);
    // z1 = mid_full - z2 - z0 (all non-negative by construction).
    let z1 = mid_full.sub(&z2).sub(&z0);

    let shift_bits = (half_words as u64) * 64;
    let mut result = z2.shl(2 * shift_bits);
    result = result.add(&z1.shl(shift_bits));
    result.add(&z0)
}

/// Recursive Karatsuba squaring. Reuses the cross term instead of three
/// full recursive multiplies: `low² `, `high²`, and a single `low*high`
/// product doubled by a one-bit shift, instead of computing
/// `(high+low)²` and subtracting back out (the generic Karatsuba
/// identity `karatsuba(x, x, ...)` would take). Two recursive squarings
/// plus one recursive multiply, against three recursive multiplies for
/// the generic path.
fn karatsuba_square(x: &BigUint, thresholds: &Thresholds, cache: Option<&TransformCache>, depth: u32) -> BigUint {
    let bits = x.bit_length();
    if bits < thresholds.karatsuba_bits {
        return x.mul_schoolbook(x);
    }

    let half_words = (x.words().len() + 1) / 2;
    let (x1, x0) = split(x, half_words);

    let eligible = bits >= PARALLEL_KARATSUBA_LEAF_BITS && depth < MAX_PARALLEL_KARATSUBA_DEPTH;

    let (z2, z0) = if eligible {
        rayon::join(
            || karatsuba_square(&x1, thresholds, cache, depth + 1),
            || karatsuba_square(&x0, thresholds, cache, depth + 1),
        )
    } else {
        (
            karatsuba_square(&x1, thresholds, cache, depth + 1),
            karatsuba_square(&x0, thresholds, cache, depth + 1),
        )
    };

    let cross = karatsuba(&x1, &x0, thresholds, cache, depth + 1);
    let z1 = cross.shl(1);

    let shift_bits = (half_words as u64) * 64;
    let mut result = z2.shl(2 * shift_bits);
    result = result.add(&z1.shl(shift_bits));
    result.add(&z0)
}

fn split(v: &BigUint, half_words: usize) -> (BigUint, BigUint) {
    let words = v.words();
    if words.len() <= half_words {
        return (BigUint::zero(), BigUint::from_words_trimmed(words.to_vec()));
    }
    let low = BigUint::from_words_trimmed(words[..half_words].to_vec());
    let high = BigUint::from_words_trimmed(words[half_words..].to_vec());
    (high, low)
}
