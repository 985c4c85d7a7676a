//! Arithmetic operations: negation, addition, multiplication, and binary shifts.

use std::sync::Arc;

use num_traits::Zero;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{bit_length, scale, Precision};

/// Negation operation.
pub struct NegOp {
    pub inner: Arc<Node>,
}

impl NodeOp for NegOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        Ok(-self.inner.approximate(precision, eval)?)
    }
}

/// Addition operation.
///
/// Each operand is approximated two bits finer, so their combined error is at
/// most half a unit before the final rounding.
pub struct AddOp {
    pub left: Arc<Node>,
    pub right: Arc<Node>,
}

impl NodeOp for AddOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let left = self.left.approximate(precision - 2, eval)?;
        let right = self.right.approximate(precision - 2, eval)?;
        Ok(scale(&(left + right), -2))
    }
}

/// Multiplication operation.
pub struct MulOp {
    pub left: Arc<Node>,
    pub right: Arc<Node>,
}

impl NodeOp for MulOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let half_precision = (precision >> 1) - 1;

        // Put the operand with a known magnitude first.
        let (first, second, first_msd) = match self.left.msd(half_precision, eval)? {
            Some(msd) => (&self.left, &self.right, msd),
            None => match self.right.msd(half_precision, eval)? {
                Some(msd) => (&self.right, &self.left, msd),
                // Both operands are below 2^half_precision, so zero will do.
                None => return Ok(BigInteger::zero()),
            },
        };

        // The second operand's error is scaled by at most 2^(first_msd + 1),
        // contributing a quarter unit.
        let second_precision = precision - first_msd - 3;
        let second_appr = second.approximate(second_precision, eval)?;
        if second_appr.is_zero() {
            return Ok(BigInteger::zero());
        }
        let second_msd = second_precision + bit_length(&second_appr) - 1;

        let first_precision = precision - second_msd - 3;
        let first_appr = first.approximate(first_precision, eval)?;
        Ok(scale(
            &(first_appr * second_appr),
            first_precision + second_precision - precision,
        ))
    }
}

/// Multiplication by `2^shift`.
pub struct ShiftOp {
    pub inner: Arc<Node>,
    pub shift: i32,
}

impl NodeOp for ShiftOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let shifted = precision
            .checked_sub(self.shift)
            .ok_or(RealError::PrecisionOverflow)?;
        self.inner.approximate(shifted, eval)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{appr, assert_decimal, decimal, int, real};

    #[test]
    fn add_combines_operands() {
        let sum = real(2) + decimal("0.25");
        assert_eq!(appr(&sum, -2), int(9));
        assert_decimal(&sum, "2.2500");
    }

    #[test]
    fn sub_combines_operands() {
        let difference = decimal("4.5") - real(6);
        assert_decimal(&difference, "-1.50");
    }

    #[test]
    fn neg_flips_sign() {
        let negated = -decimal("1.75");
        assert_eq!(appr(&negated, -2), int(-7));
    }

    #[test]
    fn mul_handles_signs() {
        assert_decimal(&(real(3) * real(-4)), "-12.0");
        assert_decimal(&(decimal("-1.5") * decimal("-2.5")), "3.750");
        assert_decimal(&(decimal("0.001") * real(1000)), "1.000");
    }

    #[test]
    fn mul_of_tiny_operands_is_zero_at_coarse_precision() {
        let tiny = real(1).shift_right(200);
        assert_eq!(appr(&(tiny.clone() * tiny), 0), int(0));
    }

    #[test]
    fn mul_with_zero_operand_is_zero() {
        let product = real(0) * real(5).sqrt();
        assert_eq!(appr(&product, -100), int(0));
    }

    #[test]
    fn shift_moves_binary_point() {
        let value = real(3);
        assert_eq!(appr(&value.shift_left(4), 0), int(48));
        assert_eq!(appr(&value.shift_right(1), -1), int(3));
    }

    #[test]
    fn shift_overflow_is_reported() {
        let value = real(1).shift_right(i32::MAX);
        assert_eq!(value.approximate(-10), Err(RealError::PrecisionOverflow));
    }
}
