//! Conversions between `Real` and primitive or textual values.

use std::str::FromStr;

use super::Real;
use crate::bigint::BigInteger;
use crate::concurrency::{CancelToken, Evaluation};
use crate::error::RealError;
use crate::precision::Precision;

/// Bits of an `f64` significand plus guard bits for the final rounding.
const F64_WORKING_BITS: Precision = 60;

/// Slightly beyond the `f64` exponent range, including subnormals.
const F64_MIN_MSD: Precision = -1080;

const F64_FRACTION_BITS: u32 = 52;
const F64_EXPONENT_BIAS: i32 = 1075;

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Real {
                fn from(value: $t) -> Self {
                    Real::from(BigInteger::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Real {
    /// The exact value of a finite `f64`.
    pub fn from_f64(value: f64) -> Result<Self, RealError> {
        if !value.is_finite() {
            return Err(RealError::NonFinite);
        }
        let bits = value.abs().to_bits();
        let biased_exponent = (bits >> F64_FRACTION_BITS) as i32;
        let fraction = bits & ((1 << F64_FRACTION_BITS) - 1);
        let (mantissa, exponent) = if biased_exponent == 0 {
            // subnormal
            (fraction, 1 - F64_EXPONENT_BIAS)
        } else {
            (
                fraction | (1 << F64_FRACTION_BITS),
                biased_exponent - F64_EXPONENT_BIAS,
            )
        };
        let magnitude = Real::from(mantissa).shift_left(exponent);
        Ok(if value.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        })
    }

    /// Parses an optionally signed positional numeral such as `-12.75` or `ff.8`.
    ///
    /// Surrounding whitespace is ignored. The result is the exact rational value.
    pub fn from_str_radix(text: &str, radix: u32) -> Result<Self, RealError> {
        let trimmed = text.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let scaled = BigInteger::parse_radix(&format!("{whole}{fraction}"), radix)?;
        if fraction.is_empty() {
            return Ok(Real::from(scaled));
        }
        let places = u32::try_from(fraction.len())
            .map_err(|_| RealError::InvalidArgument("too many fraction digits"))?;
        let divisor = BigInteger::from(radix).pow(places);
        Ok(Real::from(scaled) / Real::from(divisor))
    }

    /// The nearest `f64`, or an infinity if the value is out of range.
    ///
    /// Values near the subnormal range may round to an adjacent `f64`.
    pub fn to_f64(&self) -> Result<f64, RealError> {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let Some(msd) = self.node.iter_msd(F64_MIN_MSD, &eval)? else {
            return Ok(0.0);
        };
        let precision = msd - F64_WORKING_BITS;
        let scaled = self.node.approximate(precision, &eval)?.to_f64_lossy();
        Ok(scale_f64(scaled, precision))
    }
}

/// `value * 2^exponent` in steps that stay inside the normal `f64` range.
fn scale_f64(mut value: f64, mut exponent: i32) -> f64 {
    const STEP: i32 = 1000;
    while exponent > 0 && value.is_finite() {
        let step = exponent.min(STEP);
        value *= 2f64.powi(step);
        exponent -= step;
    }
    while exponent < 0 && value != 0.0 {
        let step = exponent.max(-STEP);
        value *= 2f64.powi(step);
        exponent -= step;
    }
    value
}

impl FromStr for Real {
    type Err = RealError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Real::from_str_radix(text, 10)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use crate::bigint::BigIntegerError;
    use crate::error::RealError;
    use crate::test_utils::{appr, assert_decimal, decimal, digits, int, real};
    use crate::Real;

    #[test]
    fn from_f64_is_exact() {
        let tenth = Real::from_f64(0.1).expect("finite");
        assert_decimal(&tenth, "0.100000000000000005551115123126");
        let negative = Real::from_f64(-1234.5).expect("finite");
        assert_eq!(appr(&negative, -1), int(-2469));
        let smallest = Real::from_f64(f64::from_bits(1)).expect("finite");
        assert_eq!(appr(&smallest, -1074), int(1));
        assert_eq!(appr(&Real::from_f64(-0.0).expect("finite"), -10), int(0));
    }

    #[test]
    fn from_f64_rejects_non_finite() {
        assert_eq!(Real::from_f64(f64::NAN).err(), Some(RealError::NonFinite));
        assert_eq!(Real::from_f64(f64::INFINITY).err(), Some(RealError::NonFinite));
    }

    #[test]
    fn parses_positional_numerals() {
        assert_decimal(&decimal("  -12.75 "), "-12.750");
        assert_decimal(&decimal(".5"), "0.50");
        assert_decimal(&decimal("42"), "42.0");
        let hex = Real::from_str_radix("ff.8", 16).expect("valid");
        assert_eq!(appr(&hex, -1), int(511));
        assert_eq!(
            "1.2.3".parse::<Real>().err(),
            Some(RealError::Integer(BigIntegerError::InvalidDigit('.')))
        );
        assert!(matches!(
            Real::from_str_radix("10", 40),
            Err(RealError::Integer(BigIntegerError::InvalidRadix(40)))
        ));
    }

    #[test]
    fn to_f64_rounds_to_nearest() {
        assert_eq!(real(2).sqrt().to_f64().expect("convert"), std::f64::consts::SQRT_2);
        assert_eq!((real(1) / real(3)).to_f64().expect("convert"), 1.0 / 3.0);
        assert_eq!(real(0).to_f64().expect("convert"), 0.0);
        assert_eq!(real(-96).to_f64().expect("convert"), -96.0);
        let huge = real(1).shift_left(5000);
        assert_eq!(huge.to_f64().expect("convert"), f64::INFINITY);
        let tiny = real(1).shift_right(5000);
        assert_eq!(tiny.to_f64().expect("convert"), 0.0);
    }

    #[test]
    fn f64_round_trips() {
        for value in [1.5e300, -7.25, 3.0e-200, 0.1] {
            let converted = Real::from_f64(value).expect("finite");
            assert_eq!(converted.to_f64().expect("convert"), value);
        }
        assert_eq!(digits(&Real::from_f64(2.5).expect("finite"), 1), "2.5");
    }
}
