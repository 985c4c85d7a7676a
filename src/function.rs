//! Unary functions on constructive reals.
//!
//! A [`Function`] maps a `Real` to a new `Real` expression. Like everything
//! else in the crate, applying one only builds nodes; the two higher-order
//! constructions ([`Function::inverse_monotone`] and
//! [`Function::monotone_derivative`]) defer all of their setup work until the
//! first approximation of a result.

mod derivative;
mod inverse;

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::real::Real;

/// A unary real function.
pub trait UnaryFunction: Send + Sync {
    fn execute(&self, x: &Real) -> Real;
}

impl<F> UnaryFunction for F
where
    F: Fn(&Real) -> Real + Send + Sync,
{
    fn execute(&self, x: &Real) -> Real {
        self(x)
    }
}

/// Shared handle to a unary function.
#[derive(Clone)]
pub struct Function {
    inner: Arc<dyn UnaryFunction>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").finish_non_exhaustive()
    }
}

impl Function {
    pub fn new(function: impl UnaryFunction + 'static) -> Self {
        Self {
            inner: Arc::new(function),
        }
    }

    pub fn execute(&self, x: &Real) -> Real {
        self.inner.execute(x)
    }

    pub fn identity() -> Self {
        Self::new(|x: &Real| x.clone())
    }

    pub fn negate() -> Self {
        Self::new(|x: &Real| -x)
    }

    pub fn inverse() -> Self {
        Self::new(Real::inverse)
    }

    pub fn abs() -> Self {
        Self::new(Real::abs)
    }

    pub fn sqrt() -> Self {
        Self::new(Real::sqrt)
    }

    pub fn exp() -> Self {
        Self::new(Real::exp)
    }

    pub fn ln() -> Self {
        Self::new(Real::ln)
    }

    pub fn sin() -> Self {
        Self::new(Real::sin)
    }

    pub fn cos() -> Self {
        Self::new(Real::cos)
    }

    pub fn tan() -> Self {
        Self::new(Real::tan)
    }

    /// Arcsine, as the inverse of sine on `[-pi/2, pi/2]`.
    pub fn asin() -> Self {
        static ASIN: OnceLock<Function> = OnceLock::new();
        ASIN.get_or_init(|| {
            let half_pi = Real::pi().shift_right(1);
            Function::sin().inverse_monotone(&-&half_pi, &half_pi)
        })
        .clone()
    }

    pub fn acos() -> Self {
        Self::new(Real::acos)
    }

    pub fn atan() -> Self {
        Self::new(Real::atan)
    }

    /// The function that ignores its argument.
    pub fn constant(value: Real) -> Self {
        Self::new(move |_: &Real| value.clone())
    }

    /// `x -> self(inner(x))`.
    pub fn compose(&self, inner: &Function) -> Self {
        let outer = self.clone();
        let inner = inner.clone();
        Self::new(move |x: &Real| outer.execute(&inner.execute(x)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::test_utils::{assert_close, assert_decimal, decimal, real};

    #[test]
    fn builtin_functions_match_methods() {
        let x = decimal("0.6");
        assert_close(&Function::identity().execute(&x), &x, -60);
        assert_close(&Function::negate().execute(&x), &-&x, -60);
        assert_close(&Function::inverse().execute(&x), &x.inverse(), -60);
        assert_close(&Function::abs().execute(&-&x), &x, -60);
        assert_close(&Function::sqrt().execute(&x), &x.sqrt(), -60);
        assert_close(&Function::exp().execute(&x), &x.exp(), -60);
        assert_close(&Function::ln().execute(&x), &x.ln(), -60);
        assert_close(&Function::sin().execute(&x), &x.sin(), -60);
        assert_close(&Function::cos().execute(&x), &x.cos(), -60);
        assert_close(&Function::tan().execute(&x), &x.tan(), -60);
        assert_close(&Function::asin().execute(&x), &x.asin(), -60);
        assert_close(&Function::acos().execute(&x), &x.acos(), -60);
        assert_close(&Function::atan().execute(&x), &x.atan(), -60);
    }

    #[test]
    fn constant_ignores_argument() {
        let seven = Function::constant(real(7));
        assert_decimal(&seven.execute(&real(100)), "7.00");
    }

    #[test]
    fn closures_and_composition() {
        let square = Function::new(|x: &Real| x * x);
        let plus_one = Function::new(|x: &Real| x + Real::one());
        let composed = square.compose(&plus_one);
        assert_decimal(&composed.execute(&real(4)), "25.000");
        assert_decimal(&plus_one.compose(&square).execute(&real(4)), "17.000");
    }

    #[test]
    fn asin_of_known_values() {
        assert_decimal(&decimal("0.5").asin(), "0.52359877559829887308");
        assert_close(&real(1).asin(), &Real::pi().shift_right(1), -60);
        assert_close(&real(-1).asin(), &-Real::pi().shift_right(1), -60);
    }
}
