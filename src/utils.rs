//! Stateless numeric helpers.
//!
//! The quality score takes the Nth root of a 256-bit digest, which
//! overflows fixed-width floats early in Newton's method, so the
//! iteration runs over arbitrary-precision decimals with a bounded
//! number of carried digits.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::config::ROOT_PRECISION_DIGITS;

/// Floor of the base-2 logarithm. `x` must be positive.
pub fn floor_log2(x: i64) -> i64 {
    debug_assert!(x > 0);
    63 - x.leading_zeros() as i64
}

/// Binary exponentiation: `x^n`. Negative exponents invert the base.
/// Each step is rounded to the carried precision so digit counts stay
/// bounded across large exponents.
pub fn pow(x: &BigDecimal, n: i64) -> BigDecimal {
    let mut res = x.clone();
    let mut n = n;
    if n < 0 {
        res = (BigDecimal::one() / &res).with_prec(ROOT_PRECISION_DIGITS);
        n = -n;
    } else if n == 0 {
        return BigDecimal::one();
    }
    let mut y = BigDecimal::one();
    let mut i = n;
    while i > 1 {
        if i % 2 == 0 {
            i /= 2;
        } else {
            y = (&res * &y).with_prec(ROOT_PRECISION_DIGITS);
            i = (i - 1) / 2;
        }
        res = (&res * &res).with_prec(ROOT_PRECISION_DIGITS);
    }
    (&res * &y).with_prec(ROOT_PRECISION_DIGITS)
}

/// Newton iteration for the nth root of a non-negative value,
/// terminating once the step size drops below `1e-8`.
pub fn nth_root(x: &BigDecimal, n: i64) -> BigDecimal {
    debug_assert!(n >= 1);
    if x.is_zero() {
        return BigDecimal::zero();
    }
    let nf = BigDecimal::from(n);
    let epsilon = BigDecimal::new(BigInt::one(), 8);
    let mut guess = (x / &nf).with_prec(ROOT_PRECISION_DIGITS);
    loop {
        let prev = pow(&guess, n - 1);
        let mut diff = (x / &prev).with_prec(ROOT_PRECISION_DIGITS);
        diff = diff - &guess;
        diff = (&diff / &nf).with_prec(ROOT_PRECISION_DIGITS);
        guess = &guess + &diff;
        if diff.abs() < epsilon {
            break;
        }
    }
    guess
}
