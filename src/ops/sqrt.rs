//! Square root by float seeding and Newton refinement.

use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::debug;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{scale, Precision, FLOAT_SQRT_OPERAND_PRECISION, FLOAT_SQRT_PRECISION};

/// Square root operation.
///
/// Up to [`FLOAT_SQRT_PRECISION`] result digits come from an `f64` square root.
/// Beyond that, the node approximates itself at roughly half the digits and
/// takes one Newton step. The self-request is strictly coarser, so recursion
/// depth grows with the logarithm of the requested precision.
pub struct SqrtOp {
    pub inner: Arc<Node>,
}

impl NodeOp for SqrtOp {
    fn compute_approximation(
        &self,
        node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let max_precision_needed = 2 * precision - 1;
        let msd = match self.inner.iter_msd(max_precision_needed, eval)? {
            Some(msd) if msd > max_precision_needed => msd,
            _ => return Ok(BigInteger::zero()),
        };
        let result_msd = msd / 2;
        let result_digits = result_msd - precision;

        if result_digits > FLOAT_SQRT_PRECISION {
            let approximation_digits = result_digits / 2 + 6;
            let approximation_precision = result_msd - approximation_digits;
            debug!(precision, approximation_precision, "sqrt: newton step");
            let last = node.approximate(approximation_precision, eval)?;
            if last.is_zero() {
                return Err(RealError::Domain("square root of a negative number"));
            }
            let op_appr = self.inner.approximate(2 * approximation_precision, eval)?;
            // (last^2 + op) / (2 last), with the halving done by the final shift
            let numerator = scale(
                &(&last * &last + op_appr),
                approximation_precision - precision,
            );
            let quotient = numerator.divide(&last)?;
            Ok((quotient + BigInteger::one()).shift_right(1))
        } else {
            // Even precisions keep the square root's exponent integral.
            let op_precision = (msd - FLOAT_SQRT_OPERAND_PRECISION) & !1;
            let working_precision = op_precision - FLOAT_SQRT_OPERAND_PRECISION;
            let scaled = self
                .inner
                .approximate(op_precision, eval)?
                .shift_left(FLOAT_SQRT_OPERAND_PRECISION);
            let scaled_float = scaled.to_f64_lossy();
            if scaled_float < 0.0 {
                return Err(RealError::Domain("square root of a negative number"));
            }
            let root = BigInteger::from(scaled_float.sqrt() as u64);
            debug!(precision, "sqrt: float seed");
            Ok(root.shift_left(working_precision / 2 - precision))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{appr, assert_close, assert_decimal, decimal, int, real};

    #[test]
    fn sqrt_squared_round_trips() {
        let root = real(13).sqrt();
        assert_decimal(&(&root * &root), "13.00000000000000000000");
        let root = decimal("0.0002").sqrt();
        assert_close(&(&root * &root), &decimal("0.0002"), -70);
    }

    #[test]
    fn sqrt_of_perfect_square() {
        assert_decimal(&real(144).sqrt(), "12.000000000000000000000000000000");
        assert_eq!(appr(&real(1 << 40).sqrt(), 0), int(1 << 20));
    }

    #[test]
    fn sqrt_of_two_at_high_precision() {
        let root = real(2).sqrt();
        assert_decimal(
            &root,
            "1.4142135623730950488016887242096980785696718753769480731766797379907324784621",
        );
    }

    #[test]
    fn sqrt_recursion_depth_is_logarithmic() {
        let root = real(2).sqrt();
        let (_, depth) = root.approximate_traced(-10_000).expect("approximate");
        assert!(depth <= 32, "depth {depth}");

        let root = real(3).sqrt();
        let (_, depth) = root.approximate_traced(-100_000).expect("approximate");
        assert!(depth <= 40, "depth {depth}");
    }

    #[test]
    fn sqrt_of_zero_is_zero() {
        assert_eq!(appr(&real(0).sqrt(), -1000), int(0));
    }

    #[test]
    fn sqrt_of_negative_is_domain_error() {
        assert!(matches!(
            real(-4).sqrt().approximate(-10),
            Err(RealError::Domain(_))
        ));
        assert!(matches!(
            real(-4).sqrt().approximate(-500),
            Err(RealError::Domain(_))
        ));
    }
}
