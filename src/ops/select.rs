//! Sign-driven branching.

use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::bigint::{BigInteger, Sign};
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{scale, Precision};

const SIGN_UNKNOWN: i8 = 0;

/// Evaluates to `when_negative` if the selector is negative and to
/// `when_positive` otherwise.
///
/// The branches must agree when the selector is exactly zero. This is assumed,
/// not checked: the selector's sign is only computed when the two branches
/// visibly disagree, which cannot happen at zero if the assumption holds.
pub struct SelectOp {
    pub selector: Arc<Node>,
    pub when_negative: Arc<Node>,
    pub when_positive: Arc<Node>,
    known_sign: AtomicI8,
}

impl SelectOp {
    pub fn new(selector: Arc<Node>, when_negative: Arc<Node>, when_positive: Arc<Node>) -> Self {
        Self {
            selector,
            when_negative,
            when_positive,
            known_sign: AtomicI8::new(SIGN_UNKNOWN),
        }
    }

    fn known_sign(&self) -> Option<Sign> {
        match self.known_sign.load(Ordering::Acquire) {
            SIGN_UNKNOWN => self
                .selector
                .cached()
                .map(|cached| cached.value.sign())
                .filter(|sign| *sign != Sign::Zero),
            sign if sign < 0 => Some(Sign::Minus),
            _ => Some(Sign::Plus),
        }
    }

    fn branch(&self, sign: Sign) -> &Arc<Node> {
        if sign == Sign::Minus {
            &self.when_negative
        } else {
            &self.when_positive
        }
    }
}

impl NodeOp for SelectOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        if let Some(sign) = self.known_sign() {
            return self.branch(sign).approximate(precision, eval);
        }

        let negative_appr = self.when_negative.approximate(precision - 1, eval)?;
        let positive_appr = self.when_positive.approximate(precision - 1, eval)?;
        if (&negative_appr - &positive_appr).abs() <= BigInteger::from(1) {
            return Ok(scale(&negative_appr, -1));
        }

        // The branches differ, so the selector is nonzero and its sign terminates.
        debug!(precision, "select branches disagree, resolving selector sign");
        let sign = self.selector.signum(eval)?;
        self.known_sign.store(sign.as_i32() as i8, Ordering::Release);
        if sign == Sign::Minus {
            Ok(scale(&negative_appr, -1))
        } else {
            Ok(scale(&positive_appr, -1))
        }
    }
}

/// Sign of the operand as an exact `-1`, `0` or `1`.
///
/// A value within `2^precision` of zero is reported as zero at that precision.
pub struct SignumOp {
    pub inner: Arc<Node>,
}

impl NodeOp for SignumOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let sign = self.inner.signum_within(precision, eval)?;
        Ok(scale(&BigInteger::from(sign.as_i32()), -precision))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::error::RealError;
    use crate::test_utils::{appr, assert_decimal, decimal, int, real};

    #[test]
    fn select_follows_selector_sign() {
        let chosen = real(-3).select(&real(10), &real(20));
        assert_decimal(&chosen, "10.00");
        let chosen = decimal("0.5").select(&real(10), &real(20));
        assert_decimal(&chosen, "20.00");
    }

    #[test]
    fn select_at_zero_with_equal_branches_terminates() {
        let chosen = real(0).select(&real(7), &real(7));
        assert_decimal(&chosen, "7.000");
    }

    #[test]
    fn abs_max_min_build_on_select() {
        assert_decimal(&real(-5).abs(), "5.0");
        assert_decimal(&real(0).abs(), "0.0");
        assert_decimal(&real(2).max(&real(9)), "9.0");
        assert_decimal(&real(2).min(&real(9)), "2.0");
        assert_decimal(&decimal("-1.5").max(&real(-2)), "-1.50");
    }

    #[test]
    fn sign_is_exact_unit() {
        assert_eq!(appr(&real(-42).sign(), -10), int(-1024));
        assert_eq!(appr(&decimal("0.75").sign(), 0), int(1));
        assert_eq!(appr(&real(0).sign(), -50), int(0));
    }

    #[test]
    fn select_on_zero_selector_with_distinct_branches_overflows() {
        let chosen = real(0).select(&real(1), &real(2));
        assert_eq!(chosen.approximate(0), Err(RealError::PrecisionOverflow));
    }
}
