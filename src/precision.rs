//! Precision arithmetic and tuning constants.
//!
//! A precision `p` names the unit `2^p`: an approximation at precision `p` is
//! the value divided by `2^p` and rounded to an integer. Negative precisions
//! are finer than the integers.

use num_traits::One;

use crate::bigint::BigInteger;
use crate::error::RealError;

/// Binary exponent of an approximation's unit.
pub type Precision = i32;

/// Bits of headroom kept between any accepted precision and the limits of [`Precision`].
pub const PRECISION_HEADROOM_BITS: u32 = 8;

/// Accepted precisions lie strictly inside `(-MAX_PRECISION_MAGNITUDE, MAX_PRECISION_MAGNITUDE)`.
pub const MAX_PRECISION_MAGNITUDE: Precision = 1 << (Precision::BITS - 1 - PRECISION_HEADROOM_BITS);

/// Slow series evaluate at multiples of this increment.
pub(crate) const COARSE_PRECISION_INCREMENT: Precision = 32;

/// Slow series never evaluate coarser than this precision.
pub(crate) const COARSE_PRECISION_FLOOR: Precision = -64;

/// Significant bits trusted from a double-precision square root.
pub(crate) const FLOAT_SQRT_PRECISION: Precision = 50;

/// Bits of the operand handed to the double-precision square root.
pub(crate) const FLOAT_SQRT_OPERAND_PRECISION: Precision = 60;

/// Fails with [`RealError::PrecisionOverflow`] unless `precision` keeps the required headroom.
pub fn check_precision(precision: Precision) -> Result<(), RealError> {
    if precision <= -MAX_PRECISION_MAGNITUDE || precision >= MAX_PRECISION_MAGNITUDE {
        return Err(RealError::PrecisionOverflow);
    }
    Ok(())
}

/// `ceil(log2(|n| + 1))`, a bound on the bits needed to count `n` iterations.
pub(crate) fn bound_log2(n: Precision) -> Precision {
    (Precision::BITS - n.unsigned_abs().leading_zeros()) as Precision
}

/// Bit length of an approximation as a precision offset.
pub(crate) fn bit_length(value: &BigInteger) -> Precision {
    Precision::try_from(value.bits()).unwrap_or(Precision::MAX)
}

/// Multiplies `value` by `2^shift`, rounding to nearest when `shift` is negative.
pub(crate) fn scale(value: &BigInteger, shift: Precision) -> BigInteger {
    if shift >= 0 {
        value.shift_left(shift)
    } else {
        (value.shift_left(shift + 1) + BigInteger::one()).shift_right(1)
    }
}

/// Snaps a requested precision down to the coarse grid used by slow series.
pub(crate) fn coarsen(precision: Precision) -> Precision {
    if precision >= COARSE_PRECISION_FLOOR {
        COARSE_PRECISION_FLOOR
    } else {
        (precision - COARSE_PRECISION_INCREMENT + 1) & !(COARSE_PRECISION_INCREMENT - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::int;

    #[test]
    fn check_precision_keeps_headroom() {
        assert!(check_precision(0).is_ok());
        assert!(check_precision(MAX_PRECISION_MAGNITUDE - 1).is_ok());
        assert!(check_precision(-MAX_PRECISION_MAGNITUDE + 1).is_ok());
        assert_eq!(
            check_precision(MAX_PRECISION_MAGNITUDE),
            Err(RealError::PrecisionOverflow)
        );
        assert_eq!(
            check_precision(Precision::MIN),
            Err(RealError::PrecisionOverflow)
        );
    }

    #[test]
    fn bound_log2_matches_definition() {
        for n in -100..=100 {
            let expected = ((n as f64).abs() + 1.0).log2().ceil() as Precision;
            assert_eq!(bound_log2(n), expected, "n = {n}");
        }
    }

    #[test]
    fn scale_rounds_to_nearest() {
        assert_eq!(scale(&int(5), 2), int(20));
        assert_eq!(scale(&int(5), -1), int(3));
        assert_eq!(scale(&int(6), -2), int(2));
        assert_eq!(scale(&int(-5), -1), int(-2));
        assert_eq!(scale(&int(-7), -2), int(-2));
    }

    #[test]
    fn coarsen_snaps_to_grid() {
        assert_eq!(coarsen(10), COARSE_PRECISION_FLOOR);
        assert_eq!(coarsen(-64), -64);
        assert_eq!(coarsen(-65), -96);
        assert_eq!(coarsen(-95), -128);
        assert_eq!(coarsen(-96), -128);
        assert_eq!(coarsen(-97), -128);
    }
}
