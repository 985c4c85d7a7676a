//! Error types for real-number evaluation.
//!
//! Building an expression never fails; every error below surfaces when an
//! approximation is requested.
//!
//! Two failure kinds are fatal by design and are never retried internally:
//!
//! - **`PrecisionOverflow`**: a requested or derived precision came within
//!   [`PRECISION_HEADROOM_BITS`](crate::precision::PRECISION_HEADROOM_BITS) of
//!   overflowing [`Precision`](crate::Precision). The sign and magnitude search
//!   loops give up with this error, so it is also the symptom of dividing by an
//!   exact zero.
//! - **`Aborted`**: the evaluation's [`CancelToken`](crate::CancelToken) was cancelled.

use std::fmt;

use crate::bigint::BigIntegerError;

/// Errors that can occur while evaluating a real number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RealError {
    /// A precision value is too close to the limits of the precision type.
    PrecisionOverflow,
    /// The evaluation was cancelled.
    Aborted,
    /// Error from the integer layer.
    Integer(BigIntegerError),
    /// Input is outside the domain of the operation (e.g. the logarithm of a negative number).
    Domain(&'static str),
    /// A floating-point input was NaN or infinite.
    NonFinite,
    /// An argument to a conversion was out of range.
    InvalidArgument(&'static str),
}

impl fmt::Display for RealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrecisionOverflow => write!(f, "precision overflow"),
            Self::Aborted => write!(f, "evaluation aborted"),
            Self::Integer(err) => write!(f, "{err}"),
            Self::Domain(what) => write!(f, "domain error: {what}"),
            Self::NonFinite => write!(f, "floating-point input is not finite"),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
        }
    }
}

impl std::error::Error for RealError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Integer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BigIntegerError> for RealError {
    fn from(error: BigIntegerError) -> Self {
        Self::Integer(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_error_display() {
        assert_eq!(RealError::PrecisionOverflow.to_string(), "precision overflow");
        assert_eq!(RealError::Aborted.to_string(), "evaluation aborted");
        assert_eq!(
            RealError::Domain("logarithm of a negative number").to_string(),
            "domain error: logarithm of a negative number"
        );
    }

    #[test]
    fn integer_error_converts_and_keeps_source() {
        let err: RealError = BigIntegerError::DivisionByZero.into();
        assert_eq!(err, RealError::Integer(BigIntegerError::DivisionByZero));
        assert_eq!(err.to_string(), "division by zero");
        assert!(std::error::Error::source(&err).is_some());
    }
}
