//! Arithmetic in the Fermat ring R_n = ℤ/(2^(n·W)+1)ℤ (§4.3, C4).
//!
//! Elements are (n+1)-word buffers. The extra word absorbs the ±1 wrap
//! at the top: a canonical representative has its top word in {0, 1},
//! and if it is 1 every lower word is 0 (that single value represents
//! 2^(n·W) ≡ -1). Every public operation here leaves its destination in
//! that canonical form — simpler than the spec's "near-canonical between
//! ops" allowance, and cheap enough at the sizes this engine targets.

use std::cmp::Ordering;

use crate::alloc;
use crate::bigint::BigUint;
use crate::wordvec;

#[derive(Clone, Copy, Debug)]
pub struct FermatRing {
    /// Ring element buffers have `n + 1` words; the ring is modulo
    /// `2^(n*64) + 1`.
    pub n: usize,
}

impl FermatRing {
    pub fn new(n: usize) -> Self {
        FermatRing { n }
    }

    pub fn buf_len(&self) -> usize {
        self.n + 1
    }

    /// Acquired from the process-wide word pool (§4.2.1) rather than a
    /// fresh heap allocation; callers that only need the buffer for the
    /// lifetime of one call should take a [`alloc::PoolGuard`] via
    /// [`Self::acquire`] instead, so it returns to the pool on drop.
    pub fn zero_buf(&self) -> Vec<u64> {
        alloc::global_pool().acquire(self.buf_len()).take()
    }

    /// Scratch buffer for a single call, released back to the pool when
    /// the guard drops instead of staying allocated for the caller's
    /// lifetime.
    fn acquire(&self, len: usize) -> alloc::PoolGuard {
        alloc::global_pool().acquire(len)
    }

    /// `n * W`, the bit width used by the ±1 wrap identity.
    pub fn modulus_bits(&self) -> u64 {
        self.n as u64 * 64
    }

    fn modulus_words(&self) -> Vec<u64> {
        let mut m = self.acquire(self.buf_len());
        m.as_mut_slice()[0] = 1;
        m.as_mut_slice()[self.n] = 1;
        m.take()
    }

    /// Reduces `z` into the canonical range `[0, 2^(n*W)]` by repeated
    /// subtraction of the modulus. Bounded to a handful of iterations
    /// for every caller in this module (operands are never more than a
    /// small constant multiple of the modulus).
    pub fn canonicalize(&self, z: &mut [u64]) {
        let modulus = self.modulus_words();
        while wordvec::cmp(z, &modulus) != Ordering::Less {
            sub_in_place(z, &modulus);
        }
    }

    /// `z = a + b (mod 2^(n*W)+1)`.
    pub fn add(&self, z: &mut [u64], a: &[u64], b: &[u64]) {
        debug_assert_eq!(z.len(), self.buf_len());
        let carry = wordvec::add(z, a, b);
        debug_assert_eq!(carry, 0, "fermat add overflowed its (n+1)-word buffer");
        self.canonicalize(z);
    }

    /// `z = a - b (mod 2^(n*W)+1)`.
    pub fn sub(&self, z: &mut [u64], a: &[u64], b: &[u64]) {
        debug_assert_eq!(z.len(), self.buf_len());
        if wordvec::cmp(a, b) != Ordering::Less {
            let borrow = wordvec::sub(z, a, b);
            debug_assert_eq!(borrow, 0);
        } else {
            let modulus = self.modulus_words();
            let mut tmp = self.acquire(self.buf_len());
            let carry = wordvec::add(tmp.as_mut_slice(), a, &modulus);
            debug_assert_eq!(carry, 0);
            let borrow = wordvec::sub(z, &tmp, b);
            debug_assert_eq!(borrow, 0);
        }
        self.canonicalize(z);
    }

    /// `z = a * b (mod 2^(n*W)+1)`: full schoolbook product (C1), then
    /// fold the upper half subtractively since `2^(n*W) ≡ -1`.
    pub fn mul(&self, z: &mut [u64], a: &[u64], b: &[u64]) {
        debug_assert_eq!(z.len(), self.buf_len());
        let pa = BigUint::from_words_trimmed(a.to_vec());
        let pb = BigUint::from_words_trimmed(b.to_vec());
        let product = pa.mul_schoolbook(&pb);
        let words = product.words();

        let mut low = self.acquire(self.buf_len());
        let low_n = self.n.min(words.len());
        low.as_mut_slice()[..low_n].copy_from_slice(&words[..low_n]);

        let mut high = self.acquire(self.buf_len());
        if words.len() > self.n {
            let hi_src = &words[self.n..];
            let hi_n = hi_src.len().min(high.len());
            high.as_mut_slice()[..hi_n].copy_from_slice(&hi_src[..hi_n]);
        }

        self.canonicalize(&mut low);
        self.canonicalize(&mut high);
        self.sub(z, &low, &high);
    }

    /// `z = a * 2^s (mod 2^(n*W)+1)`, `s` may be negative. O(n) via a
    /// single wide shift followed by the ±1 fold.
    pub fn shift(&self, z: &mut [u64], a: &[u64], s: i64) {
        debug_assert_eq!(z.len(), self.buf_len());
        let l_bits = self.modulus_bits() as i64;
        let period = 2 * l_bits;
        let mut s_mod = s.rem_euclid(period);
        let mut negate = false;
        if s_mod >= l_bits {
            s_mod -= l_bits;
            negate = true;
        }
        let s_mod = s_mod as u64;

        let wide_len = self.buf_len() + (s_mod / 64) as usize + 1;
        let mut wide = self.acquire(wide_len);
        wordvec::shl_bits(wide.as_mut_slice(), a, s_mod);

        let mut low = self.acquire(self.buf_len());
        let low_n = self.n.min(wide.len());
        low.as_mut_slice()[..low_n].copy_from_slice(&wide.as_slice()[..low_n]);

        let mut high = self.acquire(self.buf_len());
        if wide.len() > self.n {
            let hi_src_n = wide.len() - self.n;
            let hi_n = hi_src_n.min(high.len());
            high.as_mut_slice()[..hi_n].copy_from_slice(&wide.as_slice()[self.n..self.n + hi_n]);
        }

        self.canonicalize(&mut low);
        self.canonicalize(&mut high);

        let mut result = self.acquire(self.buf_len());
        self.sub(&mut result, &low, &high);

        if negate && !wordvec::is_zero(&result) {
            let modulus = self.modulus_words();
            let mut negated = self.acquire(self.buf_len());
            let borrow = wordvec::sub(negated.as_mut_slice(), &modulus, &result);
            debug_assert_eq!(borrow, 0);
            self.canonicalize(&mut negated);
            z.copy_from_slice(&negated);
        } else {
            z.copy_from_slice(&result);
        }
    }

    /// `z = a * (√2)^s (mod 2^(n*W)+1)`, using
    /// √2 ≡ 2^(3·n·W/4) − 2^(n·W/4). Requires `n*W % 4 == 0`.
    pub fn shift_half(&self, z: &mut [u64], a: &[u64], s: i64, tmp: &mut [u64]) {
        debug_assert_eq!(z.len(), self.buf_len());
        debug_assert_eq!(tmp.len(), self.buf_len());
        debug_assert_eq!(
            self.modulus_bits() % 4,
            0,
            "shift_half requires n*W to be a multiple of 4"
        );

        let half = s.div_euclid(2);
        let odd = s.rem_euclid(2) == 1;
        if !odd {
            self.shift(z, a, half);
            return;
        }

        self.shift(tmp, a, half);
        let quarter = (self.modulus_bits() / 4) as i64;
        let mut hi = self.acquire(self.buf_len());
        let mut lo = self.acquire(self.buf_len());
        self.shift(&mut hi, tmp, 3 * quarter);
        self.shift(&mut lo, tmp, quarter);
        self.sub(z, &hi, &lo);
    }
}

fn sub_in_place(z: &mut [u64], y: &[u64]) -> u64 {
    let mut borrow = 0u64;
    for i in 0..z.len() {
        let yi = y.get(i).copied().unwrap_or(0);
        let (d1, b1) = z[i].overflowing_sub(yi);
        let (d2, b2) = d1.overflowing_sub(borrow);
        z[i] = d2;
        borrow = (b1 as u64) + (b2 as u64);
    }
    borrow
}
