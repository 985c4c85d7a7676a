//! Operator overloads for `BigInteger`.
//!
//! Every binary operator is available for all four owned/borrowed operand
//! combinations. `/` and `%` panic on a zero divisor, matching the primitive
//! integer types; use [`BigInteger::div_rem`] for a checked variant.

use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use super::BigInteger;

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $body:expr) => {
        impl $trait<&BigInteger> for &BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: &BigInteger) -> BigInteger {
                let body: fn(&BigInteger, &BigInteger) -> BigInteger = $body;
                body(self, rhs)
            }
        }

        impl $trait<BigInteger> for &BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: BigInteger) -> BigInteger {
                $trait::$method(self, &rhs)
            }
        }

        impl $trait<&BigInteger> for BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: &BigInteger) -> BigInteger {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<BigInteger> for BigInteger {
            type Output = BigInteger;

            fn $method(self, rhs: BigInteger) -> BigInteger {
                $trait::$method(&self, &rhs)
            }
        }
    };
}

forward_binop!(Add, add, |lhs, rhs| lhs.add_signed(rhs, rhs.negative));
forward_binop!(Sub, sub, |lhs, rhs| lhs.add_signed(rhs, !rhs.negative));
forward_binop!(Mul, mul, |lhs, rhs| lhs.mul_ref(rhs));
forward_binop!(Div, div, |lhs, rhs| match lhs.div_rem(rhs) {
    Ok((quotient, _)) => quotient,
    #[allow(clippy::panic)]
    Err(err) => panic!("attempt to divide by zero: {err}"),
});
forward_binop!(Rem, rem, |lhs, rhs| match lhs.div_rem(rhs) {
    Ok((_, remainder)) => remainder,
    #[allow(clippy::panic)]
    Err(err) => panic!("attempt to calculate the remainder with a divisor of zero: {err}"),
});

impl Neg for &BigInteger {
    type Output = BigInteger;

    fn neg(self) -> BigInteger {
        BigInteger::from_words(!self.negative, self.magnitude.clone())
    }
}

impl Neg for BigInteger {
    type Output = BigInteger;

    fn neg(self) -> BigInteger {
        BigInteger::from_words(!self.negative, self.magnitude)
    }
}
