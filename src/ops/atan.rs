//! Arctangent of integer reciprocals, pi, and the two-argument arctangent.

use std::sync::OnceLock;

use num_traits::{One, Zero};
use tracing::debug;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Caching, Node, NodeOp};
use crate::precision::{bound_log2, check_precision, scale, Precision};
use crate::real::Real;

/// Taylor series for `atan(1/n)` with integer `n > 1`.
pub struct IntegralAtanOp {
    pub n: i64,
}

impl NodeOp for IntegralAtanOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        if precision >= 1 {
            return Ok(BigInteger::zero());
        }
        let iterations_needed = -precision / 2 + 2;
        let calc_precision = precision - bound_log2(2 * iterations_needed) - 2;
        let scaled_one = BigInteger::one().shift_left(-calc_precision);
        let n = BigInteger::from(self.n);
        let n_squared = BigInteger::from(self.n * self.n);

        let mut power = scaled_one.divide(&n)?;
        let mut term = power.clone();
        let mut sum = power.clone();
        let mut sign: i64 = 1;
        let mut k: i64 = 1;
        let max_truncation_error = BigInteger::one().shift_left(precision - 2 - calc_precision);
        while term.abs() >= max_truncation_error {
            eval.check_cancelled()?;
            k += 2;
            power = power.divide(&n_squared)?;
            sign = -sign;
            term = power.divide(&BigInteger::from(sign * k))?;
            sum = sum + &term;
        }
        Ok(scale(&sum, calc_precision - precision))
    }

    fn caching(&self) -> Caching {
        Caching::Coarse
    }
}

/// Pi by Machin's formula, `pi = 4 (4 atan(1/5) - atan(1/239))`, shared by all users.
pub(crate) fn pi() -> Real {
    static PI: OnceLock<Real> = OnceLock::new();
    PI.get_or_init(|| {
        let atan_fifth = Real::from_op(IntegralAtanOp { n: 5 });
        let atan_239th = Real::from_op(IntegralAtanOp { n: 239 });
        (atan_fifth.shift_left(2) - atan_239th).shift_left(2)
    })
    .clone()
}

/// Angle of the point `(x, y)` in `(-pi, pi]`.
///
/// The quadrant is decided from approximations just large enough to tell the
/// coordinates apart from zero, so `atan2(0, 0)` fails with
/// [`RealError::PrecisionOverflow`]. A point within rounding of the negative
/// x-axis takes the sign of its approximate `y`.
pub(crate) fn atan2(y: &Real, x: &Real) -> Real {
    let y = y.clone();
    let x = x.clone();
    Real::deferred(move |eval| atan2_expansion(&y, &x, eval))
}

fn atan2_expansion(y: &Real, x: &Real, eval: &Evaluation<'_>) -> Result<Real, RealError> {
    let one = BigInteger::one();
    let mut precision: Precision = -20;
    let (x_appr, y_appr) = loop {
        check_precision(precision)?;
        eval.check_cancelled()?;
        let x_appr = x.node.approximate(precision, eval)?;
        let y_appr = y.node.approximate(precision, eval)?;
        if x_appr.abs() > one || y_appr.abs() > one {
            break (x_appr, y_appr);
        }
        precision *= 2;
    };
    debug!(precision, %x_appr, %y_appr, "atan2: quadrant resolved");

    if x_appr.abs() >= y_appr.abs() {
        let base = (y / x).atan();
        if x_appr.is_negative() {
            let pi = Real::pi();
            return Ok(if y_appr.is_negative() { base - pi } else { base + pi });
        }
        Ok(base)
    } else {
        let base = (x / y).atan();
        let half_pi = Real::pi().shift_right(1);
        Ok(if y_appr.is_negative() { -half_pi - base } else { half_pi - base })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{assert_close, assert_decimal, decimal, real};
    use crate::Real;

    #[test]
    fn pi_matches_known_digits() {
        assert_decimal(&Real::pi(), "3.14159265358979323846");
    }

    #[test]
    fn integral_atan_series() {
        let atan_seventh = Real::from_op(super::IntegralAtanOp { n: 7 });
        assert_decimal(&atan_seventh, "0.14189705460416392281");
    }

    #[test]
    fn atan2_of_known_point() {
        assert_decimal(&real(1).atan2(&real(2)), "0.46364760900080611621");
    }

    #[test]
    fn atan2_covers_all_quadrants() {
        let pi = Real::pi();
        assert_close(&real(1).atan2(&real(1)), &pi.shift_right(2), -70);
        assert_close(&real(1).atan2(&real(-1)), &(&pi - &pi.shift_right(2)), -70);
        assert_close(
            &real(-1).atan2(&real(-1)),
            &(-(&pi - &pi.shift_right(2))),
            -70,
        );
        assert_close(&real(-3).atan2(&decimal("0.5")), &-(real(6).atan()), -70);
        assert_close(&real(0).atan2(&real(-2)), &pi, -70);
        assert_close(&real(5).atan2(&real(0)), &pi.shift_right(1), -70);
    }

    #[test]
    fn atan2_of_origin_overflows() {
        assert_eq!(
            real(0).atan2(&real(0)).approximate(-10),
            Err(RealError::PrecisionOverflow)
        );
    }
}
