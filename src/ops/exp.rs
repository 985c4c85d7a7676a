//! Exponential function.

use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::debug;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{bound_log2, scale, Precision};
use crate::real::Real;

/// Precision of the rough argument estimate used to pick a reduction.
const ROUGH_PRECISION: Precision = -10;

/// Arguments above this many units of [`ROUGH_PRECISION`] (one half) are halved.
const SERIES_LIMIT: i64 = 512;

/// Taylor series for `exp(x)`, accurate for `|x| <= 1/2`.
pub struct PrescaledExpOp {
    pub inner: Arc<Node>,
}

impl NodeOp for PrescaledExpOp {
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
        // Each term is accurate to 2 units of calc_precision. The four extra
        // bits cover argument error and series truncation.
        let calc_precision = precision - bound_log2(2 * iterations_needed) - 4;
        let op_precision = precision - 3;
        let op_appr = self.inner.approximate(op_precision, eval)?;

        let scaled_one = BigInteger::one().shift_left(-calc_precision);
        let max_truncation_error = BigInteger::one().shift_left(precision - 4 - calc_precision);
        let mut term = scaled_one.clone();
        let mut sum = scaled_one;
        let mut n: i64 = 0;
        while term.abs() >= max_truncation_error {
            eval.check_cancelled()?;
            n += 1;
            term = scale(&(&term * &op_appr), op_precision);
            term = term.divide(&BigInteger::from(n))?;
            sum = sum + &term;
        }
        Ok(scale(&sum, calc_precision - precision))
    }
}

/// `exp(x)`, halving the argument and squaring until the series applies.
pub(crate) fn exp(x: &Real) -> Real {
    let x = x.clone();
    Real::deferred(move |eval| {
        let rough = x.node.approximate(ROUGH_PRECISION, eval)?;
        if rough.abs() > BigInteger::from(SERIES_LIMIT) {
            debug!(%rough, "exp: squaring half-argument");
            let half = x.shift_right(1).exp();
            Ok(&half * &half)
        } else {
            Ok(Real::from_op(PrescaledExpOp {
                inner: Arc::clone(&x.node),
            }))
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::test_utils::{assert_close, assert_decimal, decimal, real};

    #[test]
    fn exp_of_one_is_e() {
        assert_decimal(&real(1).exp(), "2.71828182845904523536");
    }

    #[test]
    fn exp_of_zero_is_one() {
        assert_decimal(&real(0).exp(), "1.000000000000000");
    }

    #[test]
    fn exp_of_negative_argument() {
        assert_decimal(&real(-1).exp(), "0.36787944117144232160");
        assert_decimal(&real(-20).exp(), "0.00000000206115362244");
    }

    #[test]
    fn exp_adds_exponents() {
        let a = decimal("1.25");
        let b = decimal("-3.5");
        assert_close(&(a.clone() + b.clone()).exp(), &(a.exp() * b.exp()), -60);
    }

    #[test]
    fn exp_of_large_argument() {
        assert_decimal(&real(50).exp(), "5184705528587072464087.45332293348538");
    }
}
