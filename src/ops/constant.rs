//! Exact integer constants.

use std::sync::Arc;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{scale, Precision};

/// An exact integer.
pub struct IntegerOp {
    pub value: BigInteger,
}

impl NodeOp for IntegerOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        _eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        Ok(scale(&self.value, -precision))
    }
}

/// A subexpression the caller guarantees to be an integer.
///
/// Fractional digits are never evaluated: any request finer than the integers
/// is answered from the approximation at precision zero.
pub struct AssumedIntOp {
    pub inner: Arc<Node>,
}

impl NodeOp for AssumedIntOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        if precision >= 0 {
            self.inner.approximate(precision, eval)
        } else {
            Ok(scale(&self.inner.approximate(0, eval)?, -precision))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::test_utils::{appr, decimal, int, real};

    #[test]
    fn integer_rounds_at_coarse_precision() {
        let seven = real(7);
        assert_eq!(appr(&seven, 0), int(7));
        assert_eq!(appr(&seven, 1), int(4));
        assert_eq!(appr(&seven, 2), int(2));
        assert_eq!(appr(&seven, -3), int(56));
        assert_eq!(appr(&real(-7), 1), int(-3));
    }

    #[test]
    fn assumed_int_is_exact_below_the_integers() {
        // (1/3) * 3 evaluated at precision 0 rounds to exactly 1.
        let nearly_one = decimal("1") / real(3) * real(3);
        let assumed = nearly_one.assume_int();
        assert_eq!(appr(&assumed, -100), int(1).shift_left(100));
        assert_eq!(appr(&assumed, 2), int(0));
    }
}
