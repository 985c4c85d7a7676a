//! Multiplicative inverse.

use std::sync::Arc;

use num_traits::{One, Zero};

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::Precision;

/// Inverse (reciprocal) operation.
///
/// The operand's magnitude is found with an unbounded search, so the inverse of
/// an exact zero fails with [`RealError::PrecisionOverflow`].
pub struct InvOp {
    pub inner: Arc<Node>,
}

impl NodeOp for InvOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let msd = self.inner.msd_unbounded(eval)?;
        let inverse_msd = 1 - msd;
        let digits_needed = inverse_msd - precision + 3;
        let precision_needed = msd - digits_needed;
        let log_scale_factor = -precision - precision_needed;
        if log_scale_factor < 0 {
            return Ok(BigInteger::zero());
        }

        let divisor = self.inner.approximate(precision_needed, eval)?;
        let abs_divisor = divisor.abs();
        let dividend = BigInteger::one().shift_left(log_scale_factor) + abs_divisor.shift_right(1);
        let quotient = dividend.divide(&abs_divisor)?;
        if divisor.is_negative() {
            Ok(-quotient)
        } else {
            Ok(quotient)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{appr, assert_decimal, int, real};

    #[test]
    fn inverse_of_integers() {
        assert_decimal(&real(4).inverse(), "0.2500");
        assert_decimal(&real(-8).inverse(), "-0.125000");
        assert_decimal(&real(3).inverse(), "0.33333333333333333333");
    }

    #[test]
    fn inverse_of_large_value_is_zero_at_coarse_precision() {
        let huge = real(1).shift_left(100);
        assert_eq!(appr(&huge.inverse(), 0), int(0));
        assert_eq!(appr(&huge.inverse(), -101), int(2));
    }

    #[test]
    fn division_by_exact_zero_overflows() {
        let quotient = real(1) / real(0);
        assert_eq!(quotient.approximate(0), Err(RealError::PrecisionOverflow));
    }
}
