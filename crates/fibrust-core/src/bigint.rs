//! Arbitrary-precision non-negative integers.
//!
//! A [`BigUint`] is an ordered sequence of `u64` words, little-endian,
//! trimmed so the top word is always nonzero (zero is the empty vector).
//! There are no signs: every quantity this crate needs (Fibonacci numbers,
//! matrix entries, FFT outputs after reassembly) is non-negative.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

use crate::wordvec;

#[derive(Clone, Debug, Default, Eq)]
pub struct BigUint {
    /// Little-endian words, top word always nonzero.
    words: Vec<u64>,
}

impl BigUint {
    pub fn zero() -> Self {
        BigUint { words: Vec::new() }
    }

    pub fn one() -> Self {
        BigUint { words: vec![1] }
    }

    pub fn from_u64(v: u64) -> Self {
        if v == 0 {
            BigUint::zero()
        } else {
            BigUint { words: vec![v] }
        }
    }

    /// Builds a `BigUint` from already-trimmed little-endian words. Used
    /// by the FFT pipeline and pool to hand back owned results without a
    /// redundant re-trim.
    pub fn from_words_trimmed(mut words: Vec<u64>) -> Self {
        trim(&mut words);
        BigUint { words }
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u64> {
        self.words
    }

    pub fn is_zero(&self) -> bool {
        self.words.is_empty()
    }

    pub fn bit_length(&self) -> u64 {
        wordvec::bit_length(&self.words)
    }

    /// Lowest 64 bits, useful for the small-index lookup table and tests.
    pub fn low_u64(&self) -> u64 {
        self.words.first().copied().unwrap_or(0)
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self.words.len() {
            0 => Some(0),
            1 => Some(self.words[0]),
            _ => None,
        }
    }

    pub fn add(&self, other: &BigUint) -> BigUint {
        let len = self.words.len().max(other.words.len()) + 1;
        let mut z = vec![0u64; len];
        let carry = wordvec::add(&mut z[..len - 1], &self.words, &other.words);
        z[len - 1] = carry;
        BigUint::from_words_trimmed(z)
    }

    /// `self - other`. Panics (a programming-error signal, per §7) if
    /// `other > self`; callers are responsible for ordering operands.
    pub fn sub(&self, other: &BigUint) -> BigUint {
        debug_assert!(self.cmp(other) != Ordering::Less, "BigUint::sub underflow");
        let len = self.words.len();
        let mut z = vec![0u64; len];
        let borrow = wordvec::sub(&mut z, &self.words, &other.words);
        debug_assert_eq!(borrow, 0, "BigUint::sub underflow");
        BigUint::from_words_trimmed(z)
    }

    pub fn shl(&self, bits: u64) -> BigUint {
        if self.is_zero() || bits == 0 {
            return self.clone();
        }
        let extra_words = (bits / 64) as usize + 2;
        let len = self.words.len() + extra_words;
        let mut z = vec![0u64; len];
        wordvec::shl_bits(&mut z, &self.words, bits);
        BigUint::from_words_trimmed(z)
    }

    /// Schoolbook O(n*m) multiplication. Used directly by C4 (Fermat-ring
    /// `mul`, per §4.3: "Uses C1's multiplication") and as the smallest
    /// tier of the adaptive multiplier (C6).
    pub fn mul_schoolbook(&self, other: &BigUint) -> BigUint {
        if self.is_zero() || other.is_zero() {
            return BigUint::zero();
        }
        let (x, y) = if self.words.len() >= other.words.len() {
            (&self.words, &other.words)
        } else {
            (&other.words, &self.words)
        };
        let mut z = vec![0u64; x.len() + y.len()];
        for (i, &yi) in y.iter().enumerate() {
            if yi == 0 {
                continue;
            }
            let carry = wordvec::add_mul_word(&mut z[i..i + x.len()], x, yi);
            z[i + x.len()] = z[i + x.len()].wrapping_add(carry);
        }
        BigUint::from_words_trimmed(z)
    }

    pub fn cmp(&self, other: &BigUint) -> Ordering {
        wordvec::cmp(&self.words, &other.words)
    }

    /// Parses a decimal literal via repeated `* 10 + digit`. Test-only
    /// helper: the core itself has no decimal formatter (§6, out of
    /// scope), but tests need to assert against literal reference values.
    #[cfg(any(test, feature = "test-support"))]
    pub fn from_decimal_str(s: &str) -> BigUint {
        let ten = BigUint::from_u64(10);
        let mut acc = BigUint::zero();
        for c in s.chars() {
            let digit = c.to_digit(10).expect("decimal digit") as u64;
            acc = acc.mul_schoolbook(&ten).add(&BigUint::from_u64(digit));
        }
        acc
    }
}

fn trim(words: &mut Vec<u64>) {
    while let Some(&0) = words.last() {
        words.pop();
    }
}

impl PartialEq for BigUint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for BigUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigUint {
    fn cmp(&self, other: &Self) -> Ordering {
        BigUint::cmp(self, other)
    }
}

impl Add for &BigUint {
    type Output = BigUint;
    fn add(self, rhs: &BigUint) -> BigUint {
        BigUint::add(self, rhs)
    }
}

impl Sub for &BigUint {
    type Output = BigUint;
    fn sub(self, rhs: &BigUint) -> BigUint {
        BigUint::sub(self, rhs)
    }
}
