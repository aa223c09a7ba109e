//! Property-based tests for the Fibonacci engine (§8).
//!
//! Exercises the mathematical invariants of the sequence against the
//! public `calculate` entry point, across both drivers.

use fibrust_core::{calculate, Algorithm, CancellationToken, NoopReporter, Thresholds};
use proptest::prelude::*;

fn fib(n: u64, algorithm: Algorithm) -> fibrust_core::BigUint {
    calculate(n, algorithm, Thresholds::default(), &CancellationToken::new(), &mut NoopReporter).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn recurrence_relation_fast_doubling(n in 0u64..10_000) {
        let f_n = fib(n, Algorithm::FastDoubling);
        let f_n1 = fib(n + 1, Algorithm::FastDoubling);
        let f_n2 = fib(n + 2, Algorithm::FastDoubling);

        prop_assert_eq!(&f_n + &f_n1, f_n2, "F({}) + F({}) should equal F({})", n, n + 1, n + 2);
    }

    #[test]
    fn recurrence_relation_matrix_exp(n in 0u64..2_000) {
        let f_n = fib(n, Algorithm::MatrixExp);
        let f_n1 = fib(n + 1, Algorithm::MatrixExp);
        let f_n2 = fib(n + 2, Algorithm::MatrixExp);

        prop_assert_eq!(&f_n + &f_n1, f_n2);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn drivers_agree(n in 0u64..50_000) {
        let fd = fib(n, Algorithm::FastDoubling);
        let mx = fib(n, Algorithm::MatrixExp);

        prop_assert_eq!(&fd, &mx, "Fast Doubling and Matrix Exponentiation differ at n={}", n);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn monotonic_increasing(n in 1u64..10_000) {
        let f_n = fib(n, Algorithm::FastDoubling);
        let f_n1 = fib(n + 1, Algorithm::FastDoubling);

        prop_assert!(f_n1 > f_n, "F({}) should be greater than F({})", n + 1, n);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// `F(2n) = F(n)·(2·F(n+1) − F(n))`, `F(2n+1) = F(n)² + F(n+1)²`.
    #[test]
    fn doubling_identity(n in 0u64..5_000) {
        let f_n = fib(n, Algorithm::FastDoubling);
        let f_n1 = fib(n + 1, Algorithm::FastDoubling);
        let f_2n = fib(2 * n, Algorithm::FastDoubling);
        let f_2n1 = fib(2 * n + 1, Algorithm::FastDoubling);

        let two_f_n1 = &f_n1 + &f_n1;
        let factor = &two_f_n1 - &f_n;
        prop_assert_eq!(f_n.mul_schoolbook(&factor), f_2n, "F(2n) doubling identity failed at n={}", n);

        let sum_of_squares = f_n.mul_schoolbook(&f_n).add(&f_n1.mul_schoolbook(&f_n1));
        prop_assert_eq!(sum_of_squares, f_2n1, "F(2n+1) doubling identity failed at n={}", n);
    }

    /// `F(n-1)·F(n+1) − F(n)² = (-1)^n`.
    #[test]
    fn cassini_identity(n in 1u64..5_000) {
        let f_nm1 = fib(n - 1, Algorithm::FastDoubling);
        let f_n = fib(n, Algorithm::FastDoubling);
        let f_n1 = fib(n + 1, Algorithm::FastDoubling);

        let product = f_nm1.mul_schoolbook(&f_n1);
        let square = f_n.mul_schoolbook(&f_n);

        if n % 2 == 0 {
            prop_assert_eq!(product.sub(&square), fibrust_core::BigUint::one(), "Cassini's identity failed at n={}", n);
        } else {
            prop_assert_eq!(square.sub(&product), fibrust_core::BigUint::one(), "Cassini's identity failed at n={}", n);
        }
    }

    /// `|F(m)·F(n+1) − F(m+1)·F(n)| = F(n−m)` for `m <= n`.
    #[test]
    fn docagne_identity(a in 0u64..3_000, b in 0u64..3_000) {
        let m = a.min(b);
        let n = a.max(b);

        let f_m = fib(m, Algorithm::FastDoubling);
        let f_m1 = fib(m + 1, Algorithm::FastDoubling);
        let f_n = fib(n, Algorithm::FastDoubling);
        let f_n1 = fib(n + 1, Algorithm::FastDoubling);
        let f_diff = fib(n - m, Algorithm::FastDoubling);

        let lhs1 = f_m.mul_schoolbook(&f_n1);
        let lhs2 = f_m1.mul_schoolbook(&f_n);
        let abs_diff = if lhs1 >= lhs2 { lhs1.sub(&lhs2) } else { lhs2.sub(&lhs1) };

        prop_assert_eq!(abs_diff, f_diff, "D'Ocagne's identity failed at m={}, n={}", m, n);
    }
}

#[test]
fn base_cases() {
    assert_eq!(fib(0, Algorithm::FastDoubling), fibrust_core::BigUint::from_u64(0));
    assert_eq!(fib(1, Algorithm::FastDoubling), fibrust_core::BigUint::from_u64(1));
    assert_eq!(fib(2, Algorithm::FastDoubling), fibrust_core::BigUint::from_u64(1));
}

#[test]
fn large_index_consistency() {
    let n = 60_000;
    let fd = fib(n, Algorithm::FastDoubling);
    let mx = fib(n, Algorithm::MatrixExp);
    assert_eq!(fd, mx, "drivers differ at n={n}");
}
