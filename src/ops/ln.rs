//! Natural logarithm.

use std::sync::{Arc, OnceLock};

use num_traits::{One, Zero};
use tracing::debug;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Caching, Node, NodeOp};
use crate::precision::{bit_length, bound_log2, scale, Precision};
use crate::real::Real;

/// Precision of the rough argument estimate (sixteenths).
const ROUGH_PRECISION: Precision = -4;
/// At or below 1/2 the argument is inverted.
const LOW_LIMIT: i64 = 8;
/// At or above 3/2 the argument is reduced.
const HIGH_LIMIT: i64 = 24;
/// Up to 4 the reduction takes two square roots; beyond it, powers of two are split off.
const ROOT_LIMIT: i64 = 64;

/// Taylor series for `ln(1 + x)`, accurate for `|x| < 1/2`.
pub struct PrescaledLnOp {
    pub inner: Arc<Node>,
}

impl NodeOp for PrescaledLnOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        if precision >= 0 {
            return Ok(BigInteger::zero());
        }
        let iterations_needed = -precision;
        let calc_precision = precision - bound_log2(2 * iterations_needed) - 4;
        let op_precision = precision - 3;
        let op_appr = self.inner.approximate(op_precision, eval)?;

        let mut x_nth = scale(&op_appr, op_precision - calc_precision);
        let mut term = x_nth.clone();
        let mut sum = term.clone();
        let mut n: i64 = 1;
        let mut sign: i64 = 1;
        let max_truncation_error = BigInteger::one().shift_left(precision - 4 - calc_precision);
        while term.abs() >= max_truncation_error {
            eval.check_cancelled()?;
            n += 1;
            sign = -sign;
            x_nth = scale(&(&x_nth * &op_appr), op_precision);
            term = x_nth.divide(&BigInteger::from(n * sign))?;
            sum = sum + &term;
        }
        Ok(scale(&sum, calc_precision - precision))
    }

    fn caching(&self) -> Caching {
        Caching::Coarse
    }
}

fn prescaled_ln_of(x: &Real) -> Real {
    let reduced = x - &Real::one();
    Real::from_op(PrescaledLnOp {
        inner: Arc::clone(&reduced.node),
    })
}

/// `ln(x)`, rescaling the argument into `(1/2, 3/2)` before summing the series.
pub(crate) fn ln(x: &Real) -> Real {
    let x = x.clone();
    Real::deferred(move |eval| {
        let rough = x.node.approximate(ROUGH_PRECISION, eval)?;
        if rough.is_negative() {
            return Err(RealError::Domain("logarithm of a negative number"));
        }
        if rough <= BigInteger::from(LOW_LIMIT) {
            debug!(%rough, "ln: inverting small argument");
            return Ok(-x.inverse().ln());
        }
        if rough >= BigInteger::from(HIGH_LIMIT) {
            if rough <= BigInteger::from(ROOT_LIMIT) {
                debug!(%rough, "ln: taking fourth root");
                return Ok(x.sqrt().sqrt().ln().shift_left(2));
            }
            let extra_bits = bit_length(&rough) - 3;
            debug!(%rough, extra_bits, "ln: splitting off powers of two");
            let reduced = x.shift_right(extra_bits).ln();
            return Ok(reduced + Real::from(extra_bits) * ln2());
        }
        Ok(prescaled_ln_of(&x))
    })
}

/// `ln 2 = 7 ln(10/9) - 2 ln(25/24) + 3 ln(81/80)`, shared by all users.
pub(crate) fn ln2() -> Real {
    static LN2: OnceLock<Real> = OnceLock::new();
    LN2.get_or_init(|| {
        let series = |numerator: i64, denominator: i64| {
            prescaled_ln_of(&(Real::from(numerator) / Real::from(denominator)))
        };
        Real::from(7) * series(10, 9) - Real::from(2) * series(25, 24)
            + Real::from(3) * series(81, 80)
    })
    .clone()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{assert_close, assert_decimal, decimal, real};

    #[test]
    fn ln_of_e_is_one() {
        assert_decimal(&real(1).exp().ln(), "1.00000000000000000000");
    }

    #[test]
    fn ln2_matches_known_digits() {
        assert_decimal(&crate::Real::ln2(), "0.69314718055994530942");
    }

    #[test]
    fn ln_covers_every_reduction() {
        // inverted, direct series, fourth root, and power-of-two split
        assert_decimal(&decimal("0.1").ln(), "-2.30258509299404568402");
        assert_decimal(&decimal("1.2").ln(), "0.18232155679395462621");
        assert_decimal(&real(3).ln(), "1.0986122886681096914");
        assert_decimal(&real(1000).ln(), "6.90775527898213705205");
    }

    #[test]
    fn ln_inverts_exp() {
        let x = decimal("7.25");
        assert_close(&x.exp().ln(), &x, -80);
    }

    #[test]
    fn ln_of_negative_is_domain_error() {
        assert!(matches!(
            real(-2).ln().approximate(-10),
            Err(RealError::Domain(_))
        ));
    }

    #[test]
    fn ln_of_zero_overflows() {
        assert_eq!(
            real(0).ln().approximate(-10),
            Err(RealError::PrecisionOverflow)
        );
    }
}
