//! Operator overloads for `Real`.
//!
//! Operators only build nodes; nothing is evaluated until an approximation is
//! requested, so dividing by zero surfaces as
//! [`RealError::PrecisionOverflow`](crate::RealError::PrecisionOverflow) from
//! the eventual evaluation rather than a panic.

use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use super::Real;
use crate::ops::{AddOp, MulOp, NegOp};

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $body:expr) => {
        impl $trait<&Real> for &Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                let body: fn(&Real, &Real) -> Real = $body;
                body(self, rhs)
            }
        }

        impl $trait<Real> for &Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                $trait::$method(self, &rhs)
            }
        }

        impl $trait<&Real> for Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<Real> for Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                $trait::$method(&self, &rhs)
            }
        }
    };
}

forward_binop!(Add, add, |lhs, rhs| Real::from_op(AddOp {
    left: Arc::clone(&lhs.node),
    right: Arc::clone(&rhs.node),
}));
forward_binop!(Sub, sub, |lhs, rhs| lhs + &-rhs);
forward_binop!(Mul, mul, |lhs, rhs| Real::from_op(MulOp {
    left: Arc::clone(&lhs.node),
    right: Arc::clone(&rhs.node),
}));
forward_binop!(Div, div, |lhs, rhs| lhs * &rhs.inverse());

impl Neg for &Real {
    type Output = Real;

    fn neg(self) -> Real {
        Real::from_op(NegOp {
            inner: Arc::clone(&self.node),
        })
    }
}

impl Neg for Real {
    type Output = Real;

    fn neg(self) -> Real {
        -&self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::test_utils::{appr, assert_decimal, int, real};

    #[test]
    fn operators_accept_owned_and_borrowed_operands() {
        let a = real(6);
        let b = real(4);
        assert_eq!(appr(&(&a + &b), 0), int(10));
        assert_eq!(appr(&(a.clone() - &b), 0), int(2));
        assert_eq!(appr(&(&a * b.clone()), 0), int(24));
        assert_decimal(&(a / b), "1.50");
    }

    #[test]
    fn subexpressions_can_be_shared() {
        let x = real(3).sqrt();
        let y = &(&x * &x) - &x;
        assert_decimal(&y, "1.2679491924311227065");
    }
}
