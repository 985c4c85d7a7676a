//! Positional and floating-point string representations.

use std::fmt;

use super::Real;
use crate::bigint::{BigInteger, Sign};
use crate::concurrency::{CancelToken, Evaluation};
use crate::error::RealError;
use crate::precision::{check_precision, scale, Precision};

/// Extra bits evaluated below the last digit before rounding to it.
const DIGIT_GUARD_BITS: Precision = 8;

/// Digits shown by `Display` when no precision is given.
const DEFAULT_DISPLAY_DIGITS: usize = 10;

fn check_radix(radix: u32) -> Result<(), RealError> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(RealError::InvalidArgument("radix must be between 2 and 36"))
    }
}

/// Scaled value rounded to the nearest integer, with guard bits so that
/// rounding is decided by the value rather than by approximation error.
fn round_scaled(value: &Real, eval: &Evaluation<'_>) -> Result<BigInteger, RealError> {
    Ok(scale(
        &value.node.approximate(-DIGIT_GUARD_BITS, eval)?,
        -DIGIT_GUARD_BITS,
    ))
}

/// `value * radix^places`, as a shift when the radix is a power of two.
fn scale_by_radix(value: &Real, radix: u32, places: u32) -> Result<Real, RealError> {
    if radix.is_power_of_two() {
        let shift = places
            .checked_mul(radix.trailing_zeros())
            .and_then(|bits| i32::try_from(bits).ok())
            .ok_or(RealError::PrecisionOverflow)?;
        return Ok(value.shift_left(shift));
    }
    Ok(value * &Real::from(BigInteger::from(radix).pow(places)))
}

/// A floating-point rendering: `sign * 0.mantissa * radix^exponent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloatRep {
    pub sign: Sign,
    /// Exactly the requested number of digits, most significant first.
    pub mantissa: String,
    pub radix: u32,
    pub exponent: i32,
}

impl fmt::Display for FloatRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Minus {
            f.write_str("-")?;
        }
        write!(f, ".{}E{}", self.mantissa, self.exponent)?;
        if self.radix != 10 {
            write!(f, "(radix {})", self.radix)?;
        }
        Ok(())
    }
}

impl Real {
    /// Formats with `digits` places after the point in the given radix,
    /// rounding to nearest.
    pub fn to_string_radix(&self, digits: usize, radix: u32) -> Result<String, RealError> {
        self.to_string_radix_with(digits, radix, &CancelToken::new())
    }

    pub fn to_string_radix_with(
        &self,
        digits: usize,
        radix: u32,
        token: &CancelToken,
    ) -> Result<String, RealError> {
        check_radix(radix)?;
        let places = u32::try_from(digits)
            .map_err(|_| RealError::InvalidArgument("too many digits requested"))?;
        let eval = Evaluation::new(token);
        let rounded = round_scaled(&scale_by_radix(self, radix, places)?, &eval)?;

        let mut text = rounded.abs().to_str_radix(radix)?;
        if digits > 0 {
            if text.len() <= digits {
                text.insert_str(0, &"0".repeat(digits + 1 - text.len()));
            }
            text.insert(text.len() - digits, '.');
        }
        if rounded.is_negative() {
            text.insert(0, '-');
        }
        Ok(text)
    }

    /// Renders `digits` significant digits in the given radix.
    ///
    /// Values below `radix^msd_hint` may be reported as zero; the hint bounds
    /// how hard the magnitude search tries.
    pub fn to_float_rep(
        &self,
        digits: usize,
        radix: u32,
        msd_hint: i32,
    ) -> Result<FloatRep, RealError> {
        if digits == 0 {
            return Err(RealError::InvalidArgument("at least one digit is required"));
        }
        check_radix(radix)?;
        let digit_count = i32::try_from(digits)
            .map_err(|_| RealError::InvalidArgument("too many digits requested"))?;

        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let log2_radix = f64::from(radix).log2();
        let msd_precision = (log2_radix * f64::from(msd_hint)).floor();
        if msd_precision.abs() >= f64::from(i32::MAX) {
            return Err(RealError::PrecisionOverflow);
        }
        let msd_precision = msd_precision as Precision;
        check_precision(msd_precision)?;
        let Some(msd) = self.node.iter_msd(msd_precision - 2, &eval)? else {
            return Ok(FloatRep {
                sign: Sign::Zero,
                mantissa: "0".to_string(),
                radix,
                exponent: 0,
            });
        };

        // A guess that is usually right; corrected below.
        let mut exponent = (f64::from(msd) / log2_radix).ceil() as i32;
        let scale_exponent = exponent - digit_count;
        let big_radix = BigInteger::from(radix);
        let factor = Real::from(big_radix.pow(scale_exponent.unsigned_abs()));
        let mut scaled = if scale_exponent > 0 {
            self / &factor
        } else {
            self * &factor
        };
        let mut rounded = round_scaled(&scaled, &eval)?;
        let mut mantissa = rounded.abs().to_str_radix(radix)?;
        while mantissa.len() < digits {
            eval.check_cancelled()?;
            scaled = &scaled * &Real::from(radix);
            exponent -= 1;
            rounded = round_scaled(&scaled, &eval)?;
            mantissa = rounded.abs().to_str_radix(radix)?;
        }
        if mantissa.len() > digits {
            let excess = u32::try_from(mantissa.len() - digits)
                .map_err(|_| RealError::InvalidArgument("too many digits requested"))?;
            scaled = &scaled / &Real::from(big_radix.pow(excess));
            exponent += excess as i32;
            rounded = round_scaled(&scaled, &eval)?;
            mantissa = rounded.abs().to_str_radix(radix)?;
            if mantissa.len() > digits {
                // Rounding carried into a new leading digit; the rest are zeros.
                exponent += 1;
                mantissa.truncate(digits);
            }
        }
        Ok(FloatRep {
            sign: rounded.sign(),
            mantissa,
            radix,
            exponent,
        })
    }
}

/// Decimal digits after the point: ten by default, or as many as `{:.N}` asks for.
///
/// Evaluation failures surface as [`fmt::Error`].
impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(DEFAULT_DISPLAY_DIGITS);
        let text = self.to_string_radix(digits, 10).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
