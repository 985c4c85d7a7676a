//! The main Real type representing constructive real numbers.
//!
//! A `Real` is a handle to a node in an immutable expression graph. Building
//! expressions is cheap and never evaluates anything; digits are produced on
//! demand by [`Real::approximate`] and the comparison and formatting methods
//! built on it. Subexpressions may be shared freely between expressions and
//! threads.

mod convert;
mod display;
mod ops;

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::bigint::{BigInteger, Sign};
use crate::concurrency::{CancelToken, Evaluation};
use crate::error::RealError;
use crate::function::Function;
use crate::node::{Node, NodeOp};
use crate::ops::{
    AssumedIntOp, DeferredOp, InvOp, IntegerOp, SelectOp, ShiftOp, SignumOp, SqrtOp,
};
use crate::precision::Precision;

pub use display::FloatRep;

/// A constructive real number backed by a shared node graph.
#[derive(Clone)]
pub struct Real {
    pub(crate) node: Arc<Node>,
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Real")
            .field("node", &Arc::as_ptr(&self.node))
            .finish_non_exhaustive()
    }
}

impl Real {
    pub(crate) fn from_op(op: impl NodeOp + 'static) -> Self {
        Self { node: Node::new(op) }
    }

    /// Creates a real whose expression is built on first evaluation.
    pub(crate) fn deferred(
        expand: impl Fn(&Evaluation<'_>) -> Result<Real, RealError> + Send + Sync + 'static,
    ) -> Self {
        Self::from_op(DeferredOp::new(expand))
    }

    pub fn zero() -> Self {
        Self::from(0)
    }

    pub fn one() -> Self {
        Self::from(1)
    }

    /// The ratio of a circle's circumference to its diameter.
    pub fn pi() -> Self {
        crate::ops::pi()
    }

    /// Euler's number.
    pub fn e() -> Self {
        static E: OnceLock<Real> = OnceLock::new();
        E.get_or_init(|| Real::one().exp()).clone()
    }

    /// The natural logarithm of two.
    pub fn ln2() -> Self {
        crate::ops::ln2()
    }

    /// Multiplies by `2^n`.
    pub fn shift_left(&self, n: i32) -> Self {
        Self::from_op(ShiftOp {
            inner: Arc::clone(&self.node),
            shift: n,
        })
    }

    /// Divides by `2^n`.
    pub fn shift_right(&self, n: i32) -> Self {
        self.shift_left(n.saturating_neg())
    }

    /// Multiplicative inverse. Evaluating the inverse of zero fails with
    /// [`RealError::PrecisionOverflow`].
    pub fn inverse(&self) -> Self {
        Self::from_op(InvOp {
            inner: Arc::clone(&self.node),
        })
    }

    /// `when_negative` if `self < 0`, otherwise `when_positive`.
    ///
    /// The two branches must be equal when `self` is exactly zero; otherwise
    /// the result is unspecified.
    pub fn select(&self, when_negative: &Real, when_positive: &Real) -> Self {
        Self::from_op(SelectOp::new(
            Arc::clone(&self.node),
            Arc::clone(&when_negative.node),
            Arc::clone(&when_positive.node),
        ))
    }

    pub fn max(&self, other: &Real) -> Self {
        (self - other).select(other, self)
    }

    pub fn min(&self, other: &Real) -> Self {
        (self - other).select(self, other)
    }

    pub fn abs(&self) -> Self {
        self.select(&-self, self)
    }

    /// `-1`, `0` or `1`. A value within `2^p` of zero reads as zero when
    /// approximated at precision `p`.
    pub fn sign(&self) -> Self {
        Self::from_op(SignumOp {
            inner: Arc::clone(&self.node),
        })
    }

    /// Declares that this value is an integer, so fractional digits are never evaluated.
    pub fn assume_int(&self) -> Self {
        Self::from_op(AssumedIntOp {
            inner: Arc::clone(&self.node),
        })
    }

    pub fn exp(&self) -> Self {
        crate::ops::exp(self)
    }

    /// Natural logarithm. Fails with [`RealError::Domain`] for negative arguments.
    pub fn ln(&self) -> Self {
        crate::ops::ln(self)
    }

    pub fn cos(&self) -> Self {
        crate::ops::cos(self)
    }

    pub fn sin(&self) -> Self {
        (Self::pi().shift_right(1) - self).cos()
    }

    pub fn tan(&self) -> Self {
        self.sin() / self.cos()
    }

    /// Square root. Fails with [`RealError::Domain`] for negative arguments.
    pub fn sqrt(&self) -> Self {
        Self::from_op(SqrtOp {
            inner: Arc::clone(&self.node),
        })
    }

    /// Arcsine on `[-1, 1]`, with values in `[-pi/2, pi/2]`.
    pub fn asin(&self) -> Self {
        Function::asin().execute(self)
    }

    /// Arccosine on `[-1, 1]`, with values in `[0, pi]`.
    pub fn acos(&self) -> Self {
        Self::pi().shift_right(1) - self.asin()
    }

    pub fn atan(&self) -> Self {
        let hypotenuse = (Self::one() + self * self).sqrt();
        (self / &hypotenuse).asin()
    }

    /// Two-argument arctangent of `self / x`, in `(-pi, pi]`.
    pub fn atan2(&self, x: &Real) -> Self {
        crate::ops::atan2(self, x)
    }

    /// `self^exponent` for positive `self`, as `exp(exponent * ln(self))`.
    pub fn pow(&self, exponent: &Real) -> Self {
        (self.ln() * exponent).exp()
    }

    /// Integer power by repeated squaring.
    pub fn powi(&self, exponent: i64) -> Self {
        let mut remaining = exponent.unsigned_abs();
        let mut result = Self::one();
        let mut base = self.clone();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = &result * &base;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = &base * &base;
            }
        }
        if exponent < 0 {
            result.inverse()
        } else {
            result
        }
    }

    /// Returns `round(self / 2^precision)` with error below one.
    pub fn approximate(&self, precision: Precision) -> Result<BigInteger, RealError> {
        self.approximate_with(precision, &CancelToken::new())
    }

    /// Like [`approximate`](Self::approximate), failing with
    /// [`RealError::Aborted`] once `token` is cancelled.
    pub fn approximate_with(
        &self,
        precision: Precision,
        token: &CancelToken,
    ) -> Result<BigInteger, RealError> {
        let eval = Evaluation::new(token);
        self.node.approximate(precision, &eval)
    }

    /// Approximates and also reports the deepest nesting of node evaluations.
    pub fn approximate_traced(
        &self,
        precision: Precision,
    ) -> Result<(BigInteger, usize), RealError> {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let value = self.node.approximate(precision, &eval)?;
        Ok((value, eval.peak_depth()))
    }

    /// Position `m` of the most significant digit, with `2^(m-1) < |x| < 2^(m+1)`.
    ///
    /// Fails with [`RealError::PrecisionOverflow`] for zero.
    pub fn msd(&self) -> Result<Precision, RealError> {
        let token = CancelToken::new();
        self.node.msd_unbounded(&Evaluation::new(&token))
    }

    /// Most significant digit, or `None` if `|x|` may be below `2^n`.
    pub fn msd_within(&self, n: Precision) -> Result<Option<Precision>, RealError> {
        let token = CancelToken::new();
        self.node.iter_msd(n, &Evaluation::new(&token))
    }

    /// Sign of the value. Fails with [`RealError::PrecisionOverflow`] for zero.
    pub fn signum(&self) -> Result<Sign, RealError> {
        self.signum_with(&CancelToken::new())
    }

    pub fn signum_with(&self, token: &CancelToken) -> Result<Sign, RealError> {
        self.node.signum(&Evaluation::new(token))
    }

    /// Sign of the value, or [`Sign::Zero`] if `|x| < 2^a` cannot be ruled out.
    pub fn signum_within(&self, a: Precision) -> Result<Sign, RealError> {
        let token = CancelToken::new();
        self.node.signum_within(a, &Evaluation::new(&token))
    }

    /// Compares two values. Fails with [`RealError::PrecisionOverflow`] if they are equal.
    pub fn compare(&self, other: &Real) -> Result<Ordering, RealError> {
        self.compare_with(other, &CancelToken::new())
    }

    pub fn compare_with(&self, other: &Real, token: &CancelToken) -> Result<Ordering, RealError> {
        self.node.compare(&other.node, &Evaluation::new(token))
    }

    /// Compares two values, reporting `Equal` when they are within `2^a`.
    pub fn compare_within(&self, other: &Real, a: Precision) -> Result<Ordering, RealError> {
        let token = CancelToken::new();
        self.node
            .compare_within(&other.node, a, &Evaluation::new(&token))
    }

    /// Compares two values, reporting `Equal` when they are within `2^r` times
    /// the larger magnitude or within `2^a` absolutely.
    pub fn compare_relative(
        &self,
        other: &Real,
        r: Precision,
        a: Precision,
    ) -> Result<Ordering, RealError> {
        let token = CancelToken::new();
        self.node
            .compare_relative(&other.node, r, a, &Evaluation::new(&token))
    }

    /// The nearest integer.
    pub fn to_big_integer(&self) -> Result<BigInteger, RealError> {
        self.approximate(0)
    }
}

impl From<BigInteger> for Real {
    fn from(value: BigInteger) -> Self {
        Self::from_op(IntegerOp { value })
    }
}
