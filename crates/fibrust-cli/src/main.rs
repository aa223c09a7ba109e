//! Thin command-line demo for `fibrust-core`.
//!
//! Parses a single index (or a `--algorithm` choice), calls
//! [`fibrust_core::calculate`], and prints the result. Decimal
//! formatting lives here, not in the core: the core has no division
//! (§1 non-goal), so converting the resulting word vector to base-10
//! digits is the CLI's own job.

use std::time::Instant;

use clap::{Parser, ValueEnum};
use fibrust_core::{calculate, CancellationToken};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    FastDoubling,
    MatrixExp,
    FftAlways,
}

impl From<AlgorithmArg> for fibrust_core::Algorithm {
    fn from(a: AlgorithmArg) -> Self {
        match a {
            AlgorithmArg::FastDoubling => fibrust_core::Algorithm::FastDoubling,
            AlgorithmArg::MatrixExp => fibrust_core::Algorithm::MatrixExp,
            AlgorithmArg::FftAlways => fibrust_core::Algorithm::FftAlways,
        }
    }
}

#[derive(Parser)]
#[command(name = "fibrust", version, about = "Computes F(n) with fibrust-core")]
struct Cli {
    /// Index of the Fibonacci number to compute.
    n: u64,

    /// Driver to use.
    #[arg(short, long, value_enum, default_value_t = AlgorithmArg::FastDoubling)]
    algorithm: AlgorithmArg,

    /// Print only the digit count, not the full decimal value.
    #[arg(short, long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fibrust_core::ensure_warmed(cli.n);

    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/dim}] {percent:>3}%")
            .unwrap()
            .progress_chars("##-"),
    );
    let pb_for_reporter = pb.clone();
    let mut reporter = move |fraction: f64| {
        pb_for_reporter.set_position((fraction * 1000.0) as u64);
    };

    let start = Instant::now();
    let result = calculate(
        cli.n,
        cli.algorithm.into(),
        fibrust_core::Thresholds::default(),
        &CancellationToken::new(),
        &mut reporter,
    )?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    let bits = result.bit_length();
    println!("F({}) computed in {:?} ({} bits)", cli.n, elapsed, bits);
    if cli.summary {
        let digits = decimal_digit_count(result.words());
        println!("~{} decimal digits", digits);
    } else {
        println!("{}", to_decimal_string(result.words()));
    }

    Ok(())
}

/// Converts a little-endian word vector to a decimal string by
/// repeated division by `10^18`.
fn to_decimal_string(words: &[u64]) -> String {
    if words.iter().all(|&w| w == 0) {
        return "0".to_string();
    }
    const CHUNK: u128 = 1_000_000_000_000_000_000;
    let mut work = words.to_vec();
    let mut chunks: Vec<u64> = Vec::new();

    loop {
        let mut remainder: u128 = 0;
        let mut any_nonzero = false;
        for w in work.iter_mut().rev() {
            let cur = (remainder << 64) | (*w as u128);
            let q = cur / CHUNK;
            let r = cur % CHUNK;
            *w = q as u64;
            remainder = r;
            if q != 0 {
                any_nonzero = true;
            }
        }
        chunks.push(remainder as u64);
        if !any_nonzero {
            break;
        }
    }

    let mut s = chunks.pop().unwrap().to_string();
    while let Some(c) = chunks.pop() {
        s.push_str(&format!("{c:018}"));
    }
    s
}

/// Cheap upper-bound digit estimate (`bit_length * log10(2)`) used for
/// `--summary`, which skips the full conversion above.
fn decimal_digit_count(words: &[u64]) -> u64 {
    let highest = words.iter().rposition(|&w| w != 0);
    match highest {
        None => 1,
        Some(idx) => {
            let bit_len = (idx as u64) * 64 + (64 - words[idx].leading_zeros() as u64);
            ((bit_len as f64) * std::f64::consts::LOG10_2).ceil() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_conversion_crosses_a_word_boundary() {
        // words = [2^64 - (10^18 - 1), 1] represents 2^64 + (10^18 - 1)
        //        = 19446744073709551615, which needs two base-1e18 chunks.
        let low: u64 = 999_999_999_999_999_999;
        let words: Vec<u64> = vec![low, 1];
        let s = to_decimal_string(&words);
        assert_eq!(s, "19446744073709551615");
    }

    #[test]
    fn decimal_conversion_single_word() {
        let words: Vec<u64> = vec![55];
        assert_eq!(to_decimal_string(&words), "55");
    }

    #[test]
    fn decimal_conversion_of_zero() {
        assert_eq!(to_decimal_string(&[0, 0, 0]), "0");
    }
}
