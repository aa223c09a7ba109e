//! FFT/NTT engine over the Fermat ring (§4.4, C5).
//!
//! Schönhage–Strassen-style multiplication: split operands into
//! `2^k`-coefficient polynomials, transform both to value form via a
//! recursive radix-2 NTT over `R_n`, multiply pointwise, transform back,
//! and reassemble. Parallel recursion is capped by depth and a
//! process-wide semaphore; the transform cache (§4.6) is optional and
//! consulted only above a bit-length floor.

pub mod cache;

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::OnceLock;

use crate::alloc;
use crate::bigint::BigUint;
use crate::error::{FibError, FibResult};
use crate::fermat::FermatRing;

pub use cache::{CacheKey, TransformCache, TransformCacheConfig, TransformCacheStats};

/// Largest supported transform length, `2^MAX_K`. Inputs that would need
/// a larger transform raise [`FibError::InvalidArgument`] (§4.4 failure
/// semantics: "parameter selection that exceeds table bounds").
const MAX_K: u32 = 24;

/// Recursion depth, counted from the top of a single transform, below
/// which a branch may still be spawned in parallel (§4.4).
const MAX_PARALLEL_FFT_DEPTH: u32 = 3;

/// Sub-problem size (`half`, in ring elements) above which a branch is
/// large enough to be worth spawning (§4.4: "≈ 16 leaves").
const PARALLEL_FFT_LEAF_THRESHOLD: usize = 16;

/// A polynomial in coefficient form: `2^k` coefficients, each embedded
/// directly into an `(n+1)`-word ring buffer (§3).
#[derive(Clone, Debug)]
pub struct Poly {
    pub k: u32,
    pub m: usize,
    pub ring: FermatRing,
    pub coeffs: Vec<Vec<u64>>,
}

/// The same polynomial in value form: its `2^k` evaluations at powers
/// of a primitive `2^k`-th root of unity in `R_n`.
#[derive(Clone, Debug)]
pub struct PolyValues {
    pub k: u32,
    pub ring: FermatRing,
    pub values: Vec<Vec<u64>>,
}

/// Process-wide cap on concurrent FFT recursion tasks (§4.4, §5):
/// "a process-wide counting semaphore (capacity = number of hardware
/// threads) limits total concurrent FFT tasks; if no token is available,
/// the branch runs inline."
struct Semaphore {
    available: AtomicUsize,
}

impl Semaphore {
    fn new(capacity: usize) -> Self {
        Semaphore {
            available: AtomicUsize::new(capacity),
        }
    }

    fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        loop {
            let cur = self.available.load(AtomicOrdering::Acquire);
            if cur == 0 {
                return None;
            }
            if self
                .available
                .compare_exchange(cur, cur - 1, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
                .is_ok()
            {
                return Some(SemaphorePermit { sem: self });
            }
        }
    }
}

struct SemaphorePermit<'a> {
    sem: &'a Semaphore,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.sem.available.fetch_add(1, AtomicOrdering::Release);
    }
}

static FFT_SEMAPHORE: OnceLock<Semaphore> = OnceLock::new();

fn fft_semaphore() -> &'static Semaphore {
    FFT_SEMAPHORE.get_or_init(|| Semaphore::new(rayon::current_num_threads()))
}

/// Chooses `(k, m, n)` for multiplying operands whose combined word
/// length is `w_total_words` (§4.4 parameter selection).
pub fn select_params(w_total_words: usize) -> FibResult<(u32, usize, usize)> {
    let w_total_words = w_total_words.max(2);
    let target = 2.0 * (w_total_words as f64).sqrt();
    let mut k = 2u32;
    while (1usize << k) < (target.ceil() as usize).max(4) {
        k += 1;
        if k > MAX_K {
            return Err(FibError::InvalidArgument(format!(
                "operand too large for the configured FFT tables (needs k > {MAX_K})"
            )));
        }
    }
    let big_k = 1usize << k;
    let m = (w_total_words + big_k - 1) / big_k + 1;
    let n = value_size(k, m);
    Ok((k, m, n))
}

/// `n = valueSize(k, m, extra=2)`: smallest `n` (in words) such that
/// `(n+1)` words hold the product bound `2*m*64 + K`, and `n` is a
/// multiple of `K / (64 * 4)` so that both `ω` and `√2` exist in `R_n`.
fn value_size(k: u32, m: usize) -> usize {
    let big_k = 1u64 << k;
    let bound_bits = 2 * (m as u64) * 64 + big_k;
    let mut n = bound_bits.div_ceil(64);
    let step = (big_k / 256).max(1);
    let rem = n % step;
    if rem != 0 {
        n += step - rem;
    }
    n.max(4) as usize
}

/// Splits `x`'s words into `2^k` coefficients of exactly `m` words each
/// (§4.4 `poly_from_nat`).
pub fn poly_from_nat(x: &[u64], k: u32, m: usize, ring: FermatRing) -> Poly {
    let big_k = 1usize << k;
    let mut coeffs = vec![ring.zero_buf(); big_k];
    for i in 0..big_k {
        let start = i * m;
        if start >= x.len() {
            break;
        }
        let end = ((i + 1) * m).min(x.len());
        let n_copy = end - start;
        coeffs[i][..n_copy].copy_from_slice(&x[start..end]);
    }
    Poly { k, m, ring, coeffs }
}

/// Evaluates coefficients at `B^m` (`B = 2^64`) via successive shifted
/// addition, then trims (§4.4 `poly_to_int`).
pub fn poly_to_int(ring: FermatRing, m: usize, coeffs: &[Vec<u64>]) -> BigUint {
    let mut acc = BigUint::zero();
    for (i, c) in coeffs.iter().enumerate() {
        let c_big = BigUint::from_words_trimmed(c.clone());
        if c_big.is_zero() {
            continue;
        }
        let shifted = c_big.shl((i * m) as u64 * 64);
        acc = acc.add(&shifted);
    }
    let _ = ring; // ring kept in signature for symmetry with poly_from_nat
    acc
}

fn twiddle_exponent(ring: &FermatRing, len: usize) -> i64 {
    let n = ring.n as u64;
    ((256 * n) / len as u64) as i64
}

/// Recursive radix-2 transform (§4.4). `sign = 1` is forward, `sign =
/// -1` is inverse (pre-scaling; the `1/K` division happens once in
/// [`transform`]/[`inverse_transform`]).
fn recurse(
    ring: &FermatRing,
    dst: &mut [Vec<u64>],
    src: &[Vec<u64>],
    src_offset: usize,
    src_stride: usize,
    len: usize,
    sign: i64,
    depth: u32,
) {
    if len == 1 {
        dst[0].copy_from_slice(&src[src_offset]);
        return;
    }
    let half = len / 2;
    let (dst_lo, dst_hi) = dst.split_at_mut(half);

    let do_lo = || recurse(ring, dst_lo, src, src_offset, src_stride * 2, half, sign, depth + 1);
    let do_hi = || {
        recurse(
            ring,
            dst_hi,
            src,
            src_offset + src_stride,
            src_stride * 2,
            half,
            sign,
            depth + 1,
        )
    };

    let eligible = half >= PARALLEL_FFT_LEAF_THRESHOLD && depth <= MAX_PARALLEL_FFT_DEPTH;
    if eligible {
        if let Some(_permit) = fft_semaphore().try_acquire() {
            rayon::join(do_lo, do_hi);
        } else {
            do_lo();
            do_hi();
        }
    } else {
        do_lo();
        do_hi();
    }

    let e = sign * twiddle_exponent(ring, len);
    // One bump arena per `recurse` call: its two scratch buffers never
    // outlive this combining step, and each call (including ones spawned
    // onto another thread by `rayon::join` above) acquires its own, so
    // no arena is ever shared across a thread boundary.
    let mut bump = alloc::acquire_bump(2 * half * ring.buf_len());
    for i in 0..half {
        let (t, tmp) = bump.arena().alloc_two(ring.buf_len(), ring.buf_len());
        ring.shift_half(t, &dst_hi[i], i as i64 * e, tmp);
        let lo_i = dst_lo[i].clone();
        ring.sub(&mut dst_hi[i], &lo_i, t);
        ring.add(&mut dst_lo[i], &lo_i, t);
    }
}

/// Forward transform: `Poly -> PolyValues`.
pub fn transform(poly: &Poly) -> PolyValues {
    let big_k = 1usize << poly.k;
    let mut values = vec![poly.ring.zero_buf(); big_k];
    recurse(&poly.ring, &mut values, &poly.coeffs, 0, 1, big_k, 1, 0);
    PolyValues {
        k: poly.k,
        ring: poly.ring,
        values,
    }
}

/// Inverse transform: `PolyValues -> Poly` (coefficients), including the
/// final division by `K`.
pub fn inverse_transform(pv: &PolyValues) -> Poly {
    let big_k = 1usize << pv.k;
    let mut coeffs = vec![pv.ring.zero_buf(); big_k];
    recurse(&pv.ring, &mut coeffs, &pv.values, 0, 1, big_k, -1, 0);
    let neg_k = -(pv.k as i64);
    for c in coeffs.iter_mut() {
        let src = c.clone();
        pv.ring.shift(c, &src, neg_k);
    }
    Poly {
        k: pv.k,
        m: 0,
        ring: pv.ring,
        coeffs,
    }
}

/// `r.values[i] = a.values[i] * b.values[i] mod (2^(n*W)+1)` (§4.4
/// pointwise product).
pub fn pointwise_mul(ring: &FermatRing, a: &[Vec<u64>], b: &[Vec<u64>]) -> Vec<Vec<u64>> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = vec![ring.zero_buf(); a.len()];
    for i in 0..a.len() {
        ring.mul(&mut out[i], &a[i], &b[i]);
    }
    out
}

/// Full `fft_mul(x, y)` pipeline (§4.4). `cache`, if present, is
/// consulted and populated for forward transforms of operands at or
/// above its configured bit-length floor.
pub fn fft_mul(x: &BigUint, y: &BigUint, cache: Option<&TransformCache>) -> FibResult<BigUint> {
    let w_total = x.words().len() + y.words().len();
    let (k, m, n) = select_params(w_total)?;
    let ring = FermatRing::new(n);

    let vx = forward_cached(&ring, k, m, x, cache);
    let vy = forward_cached(&ring, k, m, y, cache);

    let product = pointwise_mul(&ring, &vx.values, &vy.values);
    let product_values = PolyValues { k, ring, values: product };
    let result_poly = inverse_transform(&product_values);
    Ok(poly_to_int(ring, m, &result_poly.coeffs))
}

/// `fft_square(x)`: elides the second forward transform by cloning the
/// first (§4.4, §9 — "any value slice passed to more than one consumer
/// that may mutate it must be cloned first").
pub fn fft_square(x: &BigUint, cache: Option<&TransformCache>) -> FibResult<BigUint> {
    let w_total = x.words().len() * 2;
    let (k, m, n) = select_params(w_total)?;
    let ring = FermatRing::new(n);

    let vx = forward_cached(&ring, k, m, x, cache);
    let vx_clone = vx.values.clone();

    let product = pointwise_mul(&ring, &vx.values, &vx_clone);
    let product_values = PolyValues { k, ring, values: product };
    let result_poly = inverse_transform(&product_values);
    Ok(poly_to_int(ring, m, &result_poly.coeffs))
}

fn forward_cached(
    ring: &FermatRing,
    k: u32,
    m: usize,
    x: &BigUint,
    cache: Option<&TransformCache>,
) -> PolyValues {
    if let Some(c) = cache {
        let key = CacheKey::compute(x.words(), k, ring.n);
        if let Some(values) = c.get(&key) {
            return PolyValues { k, ring: *ring, values };
        }
        let poly = poly_from_nat(x.words(), k, m, *ring);
        let values = transform(&poly);
        c.put(key, x.bit_length(), values.values.clone());
        values
    } else {
        let poly = poly_from_nat(x.words(), k, m, *ring);
        transform(&poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poly_from_nat_then_poly_to_int_roundtrips() {
        let ring = FermatRing::new(64);
        let x: Vec<u64> = vec![0xDEADBEEF, 1, 2, 3, 0xFEED];
        let k = 3u32;
        let m = 2usize;
        let poly = poly_from_nat(&x, k, m, ring);
        let back = poly_to_int(ring, m, &poly.coeffs);
        assert_eq!(back, BigUint::from_words_trimmed(x));
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let ring = FermatRing::new(64);
        let k = 3u32;
        let m = 2usize;
        let big_k = 1usize << k;
        let mut coeffs = vec![ring.zero_buf(); big_k];
        for (i, c) in coeffs.iter_mut().enumerate() {
            c[0] = (i as u64 + 1) * 17;
        }
        let poly = Poly { k, m, ring, coeffs: coeffs.clone() };
        let values = transform(&poly);
        let back = inverse_transform(&values);
        assert_eq!(back.coeffs, coeffs);
    }

    #[test]
    fn fft_mul_matches_schoolbook_on_small_values() {
        let x = BigUint::from_u64(123_456_789);
        let y = BigUint::from_u64(987_654_321);
        let via_fft = fft_mul(&x, &y, None).unwrap();
        let via_schoolbook = x.mul_schoolbook(&y);
        assert_eq!(via_fft, via_schoolbook);
    }

    #[test]
    fn fft_mul_matches_schoolbook_on_multi_word_values() {
        let x = BigUint::from_decimal_str("340282366920938463463374607431768211456111");
        let y = BigUint::from_decimal_str("99999999999999999999999999999999999999999999");
        let via_fft = fft_mul(&x, &y, None).unwrap();
        let via_schoolbook = x.mul_schoolbook(&y);
        assert_eq!(via_fft, via_schoolbook);
    }

    #[test]
    fn fft_square_matches_fft_mul_with_self() {
        let x = BigUint::from_decimal_str("123456789012345678901234567890123456789");
        let squared = fft_square(&x, None).unwrap();
        let multiplied = fft_mul(&x, &x, None).unwrap();
        assert_eq!(squared, multiplied);
    }

    #[test]
    fn select_params_rejects_absurd_sizes() {
        let err = select_params(1usize << 60);
        assert!(err.is_err());
    }
}
