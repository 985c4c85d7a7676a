//! Shared test utilities for integer and real-number tests.
//!
//! This module provides common helper functions used across test modules to reduce
//! code duplication and provide a consistent testing interface.

use crate::bigint::BigInteger;
use crate::precision::Precision;
use crate::real::Real;

/// Creates a BigInteger from an i64.
///
/// # Examples
/// ```ignore
/// let minus_three = int(-3);
/// ```
pub fn int(value: i64) -> BigInteger {
    BigInteger::from(value)
}

/// Creates an exact integer Real.
pub fn real(value: i64) -> Real {
    Real::from(value)
}

/// Parses a decimal literal into a Real, panicking on malformed input.
pub fn decimal(text: &str) -> Real {
    match text.parse::<Real>() {
        Ok(value) => value,
        Err(err) => panic!("invalid decimal literal {text:?}: {err}"),
    }
}

/// Formats `value` with `digits` decimal places, panicking on evaluation failure.
pub fn digits(value: &Real, digits: usize) -> String {
    match value.to_string_radix(digits, 10) {
        Ok(text) => text,
        Err(err) => panic!("failed to format real: {err}"),
    }
}

/// Approximates `value` at `precision`, panicking on evaluation failure.
pub fn appr(value: &Real, precision: Precision) -> BigInteger {
    match value.approximate(precision) {
        Ok(approximation) => approximation,
        Err(err) => panic!("failed to approximate at {precision}: {err}"),
    }
}

/// Asserts that `actual` and `expected` differ by less than `2^precision`.
///
/// Both sides are approximated at `precision - 2` and compared with a margin of
/// four units to absorb each side's approximation error.
pub fn assert_close(actual: &Real, expected: &Real, precision: Precision) {
    let a = appr(actual, precision - 2);
    let e = appr(expected, precision - 2);
    let difference = (&a - &e).abs();
    assert!(
        difference <= BigInteger::from(4),
        "values differ at precision {precision}: {a} vs {e}"
    );
}

/// Asserts that `value` formats to exactly `expected` in decimal.
///
/// The number of decimal places is taken from `expected`.
pub fn assert_decimal(value: &Real, expected: &str) {
    let places = expected.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    assert_eq!(digits(value, places), expected);
}
