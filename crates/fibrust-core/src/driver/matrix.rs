//! Matrix Exponentiation driver (§4.9, C9).
//!
//! Computes `Q^n` for `Q = [[1,1],[1,0]]` via binary exponentiation
//! from the least significant bit up: the running power-of-two base
//! `Q^(2^i)` is always symmetric (`[[p,q],[q,r]]`, since it is itself a
//! power of `Q`) and is squared with the 4-multiplication symmetric
//! formula; the accumulator is folded in with a general 2x2 product
//! whenever a set bit requires combining it with the current base,
//! without assuming the accumulator stays symmetric. That fold picks
//! classic schoolbook (8 multiplications) below `strassen_bits` and
//! Strassen–Winograd (7 multiplications, 15 adds) above it. `F(n)` is
//! the off-diagonal entry of the final accumulator — this must
//! bit-match [`crate::driver::fast_doubling::calculate`].
//!
//! Strassen–Winograd needs subtraction in a ring, but
//! [`crate::bigint::BigUint`] has no sign, so intermediate sums here
//! use a small signed wrapper local to this module.

use std::cmp::Ordering;

use crate::bigint::BigUint;
use crate::config::Thresholds;
use crate::error::FibResult;
use crate::fft::TransformCache;
use crate::lookup;
use crate::multiply;
use crate::progress::{CancellationToken, ProgressReporter, StepWeights};

/// A symmetric 2x2 matrix `[[p,q],[q,r]]`.
#[derive(Clone)]
struct Sym {
    p: BigUint,
    q: BigUint,
    r: BigUint,
}

/// A general 2x2 matrix `[[a,b],[c,d]]`.
#[derive(Clone)]
struct Full {
    a: BigUint,
    b: BigUint,
    c: BigUint,
    d: BigUint,
}

impl Full {
    fn identity() -> Self {
        Full {
            a: BigUint::one(),
            b: BigUint::zero(),
            c: BigUint::zero(),
            d: BigUint::one(),
        }
    }

    fn from_sym(s: &Sym) -> Self {
        Full {
            a: s.p.clone(),
            b: s.q.clone(),
            c: s.q.clone(),
            d: s.r.clone(),
        }
    }
}

#[derive(Clone)]
struct Signed {
    neg: bool,
    mag: BigUint,
}

impl Signed {
    fn pos(mag: BigUint) -> Self {
        let neg = false;
        Signed { neg, mag }
    }

    fn add(&self, other: &Signed) -> Signed {
        if self.mag.is_zero() {
            return other.clone();
        }
        if other.mag.is_zero() {
            return self.clone();
        }
        if self.neg == other.neg {
            Signed {
                neg: self.neg,
                mag: self.mag.add(&other.mag),
            }
        } else {
            match self.mag.cmp(&other.mag) {
                Ordering::Greater => Signed {
                    neg: self.neg,
                    mag: self.mag.sub(&other.mag),
                },
                Ordering::Less => Signed {
                    neg: other.neg,
                    mag: other.mag.sub(&self.mag),
                },
                Ordering::Equal => Signed::pos(BigUint::zero()),
            }
        }
    }

    fn negated(&self) -> Signed {
        Signed {
            neg: !self.neg,
            mag: self.mag.clone(),
        }
    }

    fn sub(&self, other: &Signed) -> Signed {
        self.add(&other.negated())
    }

    fn mul(&self, other: &Signed, thresholds: &Thresholds, cache: Option<&TransformCache>) -> FibResult<Signed> {
        let mag = multiply::multiply(&self.mag, &other.mag, thresholds, cache)?;
        let neg = (self.neg != other.neg) && !mag.is_zero();
        Ok(Signed { neg, mag })
    }

    fn into_nonneg(self) -> BigUint {
        debug_assert!(!self.neg || self.mag.is_zero(), "matrix driver produced a negative result");
        self.mag
    }
}

fn s(v: &BigUint) -> Signed {
    Signed::pos(v.clone())
}

/// `[[p,q],[q,r]]^2` via the symmetric 4-multiplication formula.
fn square_symmetric(m: &Sym, thresholds: &Thresholds, cache: Option<&TransformCache>) -> FibResult<Sym> {
    let p2 = multiply::square(&m.p, thresholds, cache)?;
    let q2 = multiply::square(&m.q, thresholds, cache)?;
    let r2 = multiply::square(&m.r, thresholds, cache)?;
    let p_plus_r = m.p.add(&m.r);
    let q_sum = multiply::multiply(&m.q, &p_plus_r, thresholds, cache)?;
    Ok(Sym {
        p: p2.add(&q2),
        q: q_sum,
        r: q2.add(&r2),
    })
}

/// Largest bit length among the four elements of each matrix.
fn max_element_bitlen(x: &Full, y: &Full) -> u64 {
    [&x.a, &x.b, &x.c, &x.d, &y.a, &y.b, &y.c, &y.d]
        .iter()
        .map(|v| v.bit_length())
        .max()
        .unwrap_or(0)
}

/// `x * y` for general 2x2 matrices via the schoolbook formula (8
/// element multiplications, no subtraction needed since every term is
/// non-negative).
fn mul_classic(x: &Full, y: &Full, thresholds: &Thresholds, cache: Option<&TransformCache>) -> FibResult<Full> {
    let a = multiply::multiply(&x.a, &y.a, thresholds, cache)?.add(&multiply::multiply(&x.b, &y.c, thresholds, cache)?);
    let b = multiply::multiply(&x.a, &y.b, thresholds, cache)?.add(&multiply::multiply(&x.b, &y.d, thresholds, cache)?);
    let c = multiply::multiply(&x.c, &y.a, thresholds, cache)?.add(&multiply::multiply(&x.d, &y.c, thresholds, cache)?);
    let d = multiply::multiply(&x.c, &y.b, thresholds, cache)?.add(&multiply::multiply(&x.d, &y.d, thresholds, cache)?);
    Ok(Full { a, b, c, d })
}

/// `x * y` for general 2x2 matrices via Strassen–Winograd (7
/// multiplications, 15 adds/subs).
fn mul_strassen_winograd(x: &Full, y: &Full, thresholds: &Thresholds, cache: Option<&TransformCache>) -> FibResult<Full> {
    let (xa, xb, xc, xd) = (s(&x.a), s(&x.b), s(&x.c), s(&x.d));
    let (ya, yb, yc, yd) = (s(&y.a), s(&y.b), s(&y.c), s(&y.d));

    let s1 = xc.add(&xd);
    let s2 = s1.sub(&xa);
    let s3 = xa.sub(&xc);
    let s4 = xb.sub(&s2);

    let t1 = yb.sub(&ya);
    let t2 = yd.sub(&t1);
    let t3 = yd.sub(&yb);
    let t4 = t2.sub(&yc);

    let m1 = xa.mul(&ya, thresholds, cache)?;
    let m2 = xb.mul(&yc, thresholds, cache)?;
    let m3 = s4.mul(&yd, thresholds, cache)?;
    let m4 = xd.mul(&t4, thresholds, cache)?;
    let m5 = s1.mul(&t1, thresholds, cache)?;
    let m6 = s2.mul(&t2, thresholds, cache)?;
    let m7 = s3.mul(&t3, thresholds, cache)?;

    let u1 = m1.add(&m2);
    let u2 = m1.add(&m6);
    let u3 = u2.add(&m7);
    let u4 = u2.add(&m5);
    let u5 = u4.add(&m3);
    let u6 = u3.sub(&m4);
    let u7 = u3.add(&m5);

    Ok(Full {
        a: u1.into_nonneg(),
        b: u5.into_nonneg(),
        c: u6.into_nonneg(),
        d: u7.into_nonneg(),
    })
}

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

    let mut base = Sym {
        p: BigUint::one(),
        q: BigUint::one(),
        r: BigUint::zero(),
    };
    let mut acc = Full::identity();
    let mut progress = 0.0f64;

    for i in 0..bits {
        cancel.check()?;
        let bit = (n >> i) & 1 == 1; // process from LSB (i=0) upward

        if bit {
            let rhs = Full::from_sym(&base);
            acc = if max_element_bitlen(&acc, &rhs) <= thresholds.strassen_bits {
                mul_classic(&acc, &rhs, thresholds, cache)?
            } else {
                mul_strassen_winograd(&acc, &rhs, thresholds, cache)?
            };
        }
        if i + 1 < bits {
            base = square_symmetric(&base, thresholds, cache)?;
        }

        progress += weights[i as usize];
        reporter.report(progress.min(1.0));
    }

    Ok(acc.b)
}
