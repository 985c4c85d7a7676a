//! Error type for arbitrary-precision integer operations.

use std::fmt;

/// Errors that can occur during integer arithmetic and parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BigIntegerError {
    /// Division or remainder with a zero divisor.
    DivisionByZero,
    /// Radix outside `2..=36`.
    InvalidRadix(u32),
    /// The input held no digits.
    Empty,
    /// A character is not a digit in the requested radix.
    InvalidDigit(char),
}

impl fmt::Display for BigIntegerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::InvalidRadix(radix) => write!(f, "radix {radix} is outside 2..=36"),
            Self::Empty => write!(f, "cannot parse integer from empty string"),
            Self::InvalidDigit(digit) => write!(f, "invalid digit {digit:?}"),
        }
    }
}

impl std::error::Error for BigIntegerError {}
