//! Fast Doubling driver (§4.8, C8).
//!
//! Walks the bits of `n` from the most significant down, maintaining
//! the pair `(F(k), F(k+1))` and doubling `k` each step via
//! `F(2k) = F(k)*(2*F(k+1) - F(k))`, `F(2k+1) = F(k)^2 + F(k+1)^2`. Six
//! live values per iteration: the doubled predecessor, its difference
//! against `F(k)`, the two candidate outputs, and the two squares that
//! feed `F(2k+1)`.

use crate::bigint::BigUint;
use crate::config::Thresholds;
use crate::error::FibResult;
use crate::fft::TransformCache;
use crate::lookup;
use crate::multiply;
use crate::progress::{CancellationToken, ProgressReporter, StepWeights};

pub fn calculate(
    n: u64,
    thresholds: &Thresholds,
    cache: Option<&TransformCache>,
    cancel: &CancellationToken,
    reporter: &mut dyn ProgressReporter,
) -> FibResult<BigUint> {
    if let Some(small) = lookup::get(n) {
        reporter.report(1.0);
        return Ok(BigUint::from_u64(small));
    }

    let bits = 64 - n.leading_zeros();
    let weights = StepWeights::for_bit_length(bits);

    let mut a = BigUint::zero(); // F(k)
    let mut b = BigUint::one(); // F(k+1)
    let mut progress = 0.0f64;

    for i in 0..bits {
        cancel.check()?;
        let bit = (n >> (bits - 1 - i)) & 1 == 1;

        let two_b = b.shl(1);
        let two_b_minus_a = two_b.sub(&a);
        let f2k = multiply::multiply(&a, &two_b_minus_a, thresholds, cache)?;
        let a_sq = multiply::square(&a, thresholds, cache)?;
        let b_sq = multiply::square(&b, thresholds, cache)?;
        let f2k1 = a_sq.add(&b_sq);

        if bit {
            let next_b = f2k.add(&f2k1);
            a = f2k1;
            b = next_b;
        } else {
            a = f2k;
            b = f2k1;
        }

        progress += weights[i as usize];
        reporter.report(progress.min(1.0));
    }

    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopReporter;

    fn run(n: u64) -> BigUint {
        calculate(
            n,
            &Thresholds::default(),
            None,
            &CancellationToken::new(),
            &mut NoopReporter,
        )
        .unwrap()
    }

    #[test]
    fn matches_table_for_small_n() {
        for n in 0..94 {
            assert_eq!(run(n), BigUint::from_u64(lookup::get(n).unwrap()));
        }
    }

    #[test]
    fn f_100_matches_known_value() {
        assert_eq!(run(100), BigUint::from_decimal_str("354224848179261915075"));
    }

    #[test]
    fn f_1000_matches_known_value() {
        let expected = BigUint::from_decimal_str(
            "43466557686937456435688527675040625802564660517371780402481729089536\
555417949051890403879840079255169295922593080322634775209689623239873322471161642996440906\
533187938298969649928516003704476137795166849228875",
        );
        assert_eq!(run(1000), expected);
    }

    #[test]
    fn cancellation_is_observed() {
        let token = CancellationToken::new();
        token.cancel();
        let result = calculate(
            1_000_000,
            &Thresholds::default(),
            None,
            &token,
            &mut NoopReporter,
        );
        assert!(result.is_err());
    }

    #[test]
    fn progress_reaches_one() {
        let mut last = 0.0;
        let mut reporter = |f: f64| last = f;
        calculate(5000, &Thresholds::default(), None, &CancellationToken::new(), &mut reporter).unwrap();
        assert!((last - 1.0).abs() < 1e-9);
    }
}
