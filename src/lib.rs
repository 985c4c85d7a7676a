#![warn(
    clippy::shadow_reuse,
    clippy::shadow_same,
    clippy::shadow_unrelated,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

//! Constructive real arithmetic.
//!
//! A [`Real`] is an exact real number represented by an expression graph that
//! can be approximated to any binary precision on demand:
//!
//! ```
//! use constructive::Real;
//!
//! let two = Real::from(2);
//! let root = two.sqrt();
//! let square = &root * &root;
//! assert_eq!(square.to_string_radix(20, 10)?, "2.00000000000000000000");
//! # Ok::<(), constructive::RealError>(())
//! ```
//!
//! `approximate(p)` returns the value divided by `2^p`, rounded to an integer
//! with an error below one. Everything else (comparisons, sign tests, decimal
//! formatting) is built from that single operation.
//!
//! Exact equality of reals is undecidable. Comparisons of equal values
//! therefore never finish on their own; they end with
//! [`RealError::PrecisionOverflow`] once the precision limit is reached, and
//! the tolerance-bounded variants ([`Real::compare_within`],
//! [`Real::signum_within`]) are the way to ask "equal up to `2^a`".

mod bigint;
mod concurrency;
mod error;
mod function;
mod node;
mod ops;
mod precision;
mod real;
#[cfg(test)]
mod test_utils;

pub use bigint::{BigInteger, BigIntegerError, Sign};
pub use concurrency::CancelToken;
pub use error::RealError;
pub use function::{Function, UnaryFunction};
pub use precision::{check_precision, Precision, MAX_PRECISION_MAGNITUDE, PRECISION_HEADROOM_BITS};
pub use real::{FloatRep, Real};
