//! Cross-driver and cross-algorithm consistency checks.
//!
//! Fast Doubling and Matrix Exponentiation are independent derivations of
//! the same recurrence; they must agree everywhere, including across the
//! Karatsuba/FFT crossovers in the adaptive multiplier.

use fibrust_core::{calculate, Algorithm, CancellationToken, NoopReporter, Thresholds};

fn fib(n: u64, algorithm: Algorithm) -> fibrust_core::BigUint {
    calculate(n, algorithm, Thresholds::default(), &CancellationToken::new(), &mut NoopReporter).unwrap()
}

#[test]
fn agree_across_small_indices() {
    for n in 0u64..200 {
        let fd = fib(n, Algorithm::FastDoubling);
        let mx = fib(n, Algorithm::MatrixExp);
        assert_eq!(fd, mx, "mismatch at n={n}");
    }
}

#[test]
fn agree_around_lookup_table_boundary() {
    // F(93) is the largest index with a u64 small-value result; F(94)
    // is the first index that must go through the general drivers.
    for n in [92u64, 93, 94, 95] {
        let fd = fib(n, Algorithm::FastDoubling);
        let mx = fib(n, Algorithm::MatrixExp);
        assert_eq!(fd, mx, "mismatch at n={n}");
    }
}

#[test]
fn agree_around_karatsuba_crossover() {
    // Default karatsuba_bits = 2_000; F(n) crosses that around n ~ 2_900
    // (bit length grows at log2(phi) per index, ~0.694 bits/index).
    for n in [2_800u64, 2_900, 3_000, 4_000] {
        let fd = fib(n, Algorithm::FastDoubling);
        let mx = fib(n, Algorithm::MatrixExp);
        assert_eq!(fd, mx, "mismatch at n={n}");
    }
}

#[test]
fn agree_with_fft_always() {
    // Algorithm::FftAlways forces the FFT multiplier at every step of the
    // fast-doubling driver, regardless of threshold; it must still match
    // the adaptive default on the same inputs.
    for n in [100u64, 1_000, 10_000] {
        let adaptive = fib(n, Algorithm::FastDoubling);
        let forced = fib(n, Algorithm::FftAlways);
        assert_eq!(adaptive, forced, "mismatch at n={n}");
    }
}

#[test]
fn custom_thresholds_do_not_change_the_result() {
    let n = 5_000u64;
    let baseline = fib(n, Algorithm::FastDoubling);

    let mut aggressive = Thresholds::default();
    aggressive.karatsuba_bits = 64;
    aggressive.fft_bits = 1_024;
    aggressive.parallel_bits = 64;
    let aggressive = aggressive.normalize();

    let result = calculate(
        n,
        Algorithm::FastDoubling,
        aggressive,
        &CancellationToken::new(),
        &mut NoopReporter,
    )
    .unwrap();

    assert_eq!(result, baseline);
}
