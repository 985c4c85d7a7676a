//! Cosine.

use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::debug;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Caching, Node, NodeOp};
use crate::precision::{bound_log2, scale, Precision};
use crate::real::Real;

/// Precision of the rough argument estimate (halves).
const ROUGH_PRECISION: Precision = -1;

/// Fraction bits of `x / pi` used to pick the multiple of pi.
const QUOTIENT_GUARD_BITS: Precision = 2;

/// Taylor series for `cos(x)`, accurate for `|x| < 1`.
pub struct PrescaledCosOp {
    pub inner: Arc<Node>,
}

impl NodeOp for PrescaledCosOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        if precision >= 1 {
            return Ok(BigInteger::zero());
        }
        let iterations_needed = -precision / 2 + 4;
        let calc_precision = precision - bound_log2(2 * iterations_needed) - 4;
        let op_precision = precision - 2;
        let op_appr = self.inner.approximate(op_precision, eval)?;

        let max_truncation_error = BigInteger::one().shift_left(precision - 4 - calc_precision);
        let mut term = BigInteger::one().shift_left(-calc_precision);
        let mut sum = term.clone();
        let mut n: i64 = 0;
        while term.abs() >= max_truncation_error {
            eval.check_cancelled()?;
            n += 2;
            // term *= -x^2 / (n (n - 1))
            term = scale(&(&term * &op_appr), op_precision);
            term = scale(&(&term * &op_appr), op_precision);
            term = term.divide(&BigInteger::from(-n * (n - 1)))?;
            sum = sum + &term;
        }
        Ok(scale(&sum, calc_precision - precision))
    }

    fn caching(&self) -> Caching {
        Caching::Coarse
    }
}

/// `cos(x)`, subtracting multiples of pi and halving the angle until the series applies.
pub(crate) fn cos(x: &Real) -> Real {
    let x = x.clone();
    Real::deferred(move |eval| {
        let rough = x.node.approximate(ROUGH_PRECISION, eval)?;
        let magnitude = rough.abs();
        if magnitude >= BigInteger::from(6) {
            // The nearest multiple of pi leaves |x - m * pi| < 3 * pi / 4,
            // which needs no further pi reduction.
            let quotient = (&x / &Real::pi())
                .node
                .approximate(-QUOTIENT_GUARD_BITS, eval)?;
            let multiplier = scale(&quotient, -QUOTIENT_GUARD_BITS);
            debug!(%multiplier, "cos: subtracting multiple of pi");
            let odd = multiplier.is_odd();
            let adjustment = Real::pi() * Real::from(multiplier);
            let reduced = (&x - &adjustment).cos();
            Ok(if odd { -reduced } else { reduced })
        } else if magnitude >= BigInteger::from(2) {
            debug!(%rough, "cos: halving angle");
            let half = x.shift_right(1).cos();
            Ok((&half * &half).shift_left(1) - Real::one())
        } else {
            Ok(Real::from_op(PrescaledCosOp {
                inner: Arc::clone(&x.node),
            }))
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::test_utils::{assert_close, assert_decimal, decimal, real};
    use crate::Real;

    #[test]
    fn cos_of_small_arguments() {
        assert_decimal(&real(0).cos(), "1.0000000000");
        assert_decimal(&real(1).cos(), "0.54030230586813971740");
        assert_decimal(&decimal("2.5").cos(), "-0.80114361554693371483");
    }

    #[test]
    fn cos_reduces_large_arguments() {
        assert_decimal(&real(100).cos(), "0.86231887228768393410");
        assert_close(&real(-100).cos(), &real(100).cos(), -70);
    }

    #[test]
    fn huge_arguments_reduce_in_one_step() {
        assert_decimal(&real(1_000_000).cos(), "0.93675212753314478694");
        assert_decimal(&real(1).shift_left(200).cos(), "-0.87787066099503299734");
        let huge = real(1).shift_left(1000).cos();
        assert_decimal(&huge, "0.98724607759891348424");
        let (_, depth) = real(1).shift_left(1000).cos().approximate_traced(-60).expect("cos");
        assert!(depth < 60, "depth = {depth}");
    }

    #[test]
    fn cos_of_pi_is_minus_one() {
        assert_decimal(&Real::pi().cos(), "-1.000000000000000");
    }

    #[test]
    fn sin_and_tan_derive_from_cos() {
        assert_decimal(&real(1).sin(), "0.84147098480789650665");
        assert_decimal(&decimal("0.5").tan(), "0.546302489843790513");
        let x = decimal("0.7");
        let identity = &(&x.sin() * &x.sin()) + &(&x.cos() * &x.cos());
        assert_close(&identity, &real(1), -80);
    }
}
