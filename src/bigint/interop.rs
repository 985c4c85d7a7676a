//! Lossless conversions between `BigInteger` and `num_bigint::BigInt`.

use num_bigint::{BigInt, Sign as NumSign};

use super::BigInteger;

impl From<&BigInt> for BigInteger {
    fn from(value: &BigInt) -> Self {
        let (sign, mut digits) = value.to_u32_digits();
        // num-bigint stores the least significant digit first.
        digits.reverse();
        BigInteger::from_words(sign == NumSign::Minus, digits)
    }
}

impl From<BigInt> for BigInteger {
    fn from(value: BigInt) -> Self {
        BigInteger::from(&value)
    }
}

impl From<&BigInteger> for BigInt {
    fn from(value: &BigInteger) -> Self {
        let sign = if value.negative {
            NumSign::Minus
        } else {
            NumSign::Plus
        };
        let digits: Vec<u32> = value.magnitude.iter().rev().copied().collect();
        BigInt::from_slice(sign, &digits)
    }
}

impl From<BigInteger> for BigInt {
    fn from(value: BigInteger) -> Self {
        BigInt::from(&value)
    }
}
