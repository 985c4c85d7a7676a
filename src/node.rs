//! Expression graph nodes with memoized approximations.
//!
//! This module provides the core abstractions for the expression graph:
//! - `NodeOp` trait implemented once per operator or function kind
//! - `Node` pairing an operator with its one-slot approximation cache
//! - the magnitude (`msd`), sign and comparison searches built on top of
//!   `Node::approximate`
//!
//! ## The approximation contract
//!
//! `approximate(p)` returns an integer `a` with `|a - x / 2^p| < 1`, where `x`
//! is the exact value. Each operator only implements
//! [`NodeOp::compute_approximation`]; the node wraps it with caching.
//!
//! ## Caching
//!
//! The cache holds the finest approximation computed so far as a
//! `(precision, value)` pair. A request at an equal or coarser precision is
//! answered by rescaling the cached value; only a strictly finer request calls
//! into the operator. The cache is a pure optimization: clearing it never
//! changes a result beyond the one-ulp tolerance.
//!
//! The slot sits behind a `parking_lot::Mutex` that is held only to read or
//! replace the slot, never while computing. Concurrent evaluation of one node is
//! therefore safe. It may duplicate work, and the finer of two racing results wins.

use std::cmp::Ordering;
use std::sync::Arc;

use num_traits::One;
use parking_lot::Mutex;
use tracing::debug;

use crate::bigint::{BigInteger, Sign};
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::precision::{bit_length, check_precision, coarsen, scale, Precision};

/// How a node's operator wants its results cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Caching {
    /// Compute exactly at the requested precision.
    Exact,
    /// Compute at the requested precision snapped to a coarse grid, so that
    /// nearby requests are served from one expensive evaluation.
    Coarse,
}

/// Operator stored in a [`Node`].
pub(crate) trait NodeOp: Send + Sync {
    /// Returns the value divided by `2^precision`, with error below one.
    ///
    /// `node` is the node that owns this operator, for operators that refine
    /// their own lower-precision results.
    fn compute_approximation(
        &self,
        node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError>;

    fn caching(&self) -> Caching {
        Caching::Exact
    }
}

/// A cached approximation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Approximation {
    pub precision: Precision,
    pub value: BigInteger,
}

/// Node in the expression graph. Immutable apart from its cache.
pub(crate) struct Node {
    op: Box<dyn NodeOp>,
    cache: Mutex<Option<Approximation>>,
}

impl Node {
    pub(crate) fn new(op: impl NodeOp + 'static) -> Arc<Self> {
        Arc::new(Self {
            op: Box::new(op),
            cache: Mutex::new(None),
        })
    }

    /// Returns the cached approximation, if any, without computing.
    pub(crate) fn cached(&self) -> Option<Approximation> {
        self.cache.lock().clone()
    }

    /// Approximates the value to precision `precision`, consulting the cache first.
    pub(crate) fn approximate(
        &self,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        check_precision(precision)?;
        if let Some(cached) = self.cached().filter(|cached| precision >= cached.precision) {
            return Ok(scale(&cached.value, cached.precision - precision));
        }

        let eval_precision = match self.op.caching() {
            Caching::Exact => precision,
            Caching::Coarse => coarsen(precision),
        };
        let value = {
            let _depth = eval.enter();
            self.op.compute_approximation(self, eval_precision, eval)?
        };
        let result = scale(&value, eval_precision - precision);
        self.store(Approximation {
            precision: eval_precision,
            value,
        });
        Ok(result)
    }

    fn store(&self, approximation: Approximation) {
        let mut slot = self.cache.lock();
        let finer = slot
            .as_ref()
            .map_or(true, |existing| approximation.precision < existing.precision);
        if finer {
            *slot = Some(approximation);
        }
    }

    /// Most significant digit position estimated from one probe at precision `n - 1`.
    ///
    /// Returns `m` with `2^(m-1) < |x| < 2^(m+1)`, or `None` when `|x|` is too
    /// small to tell at this precision.
    pub(crate) fn msd(
        &self,
        n: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<Option<Precision>, RealError> {
        let known = self
            .cached()
            .filter(|cached| cached.value.bits() > 1)
            .map(|cached| (cached.precision, cached.value));
        let (precision, value) = match known {
            Some(known) => known,
            None => {
                let precision = n - 1;
                let value = self.approximate(precision, eval)?;
                if value.bits() <= 1 {
                    return Ok(None);
                }
                (precision, value)
            }
        };
        Ok(Some(precision + bit_length(&value) - 1))
    }

    /// Searches for the most significant digit down to precision `n`.
    ///
    /// Probes start cheap and grow geometrically finer, so large values are
    /// found without evaluating at precision `n`.
    pub(crate) fn iter_msd(
        &self,
        n: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<Option<Precision>, RealError> {
        let mut precision: Precision = 0;
        while precision > n.saturating_add(30) {
            if let Some(msd) = self.msd(precision, eval)? {
                return Ok(Some(msd));
            }
            check_precision(precision)?;
            eval.check_cancelled()?;
            precision = precision * 3 / 2 - 16;
        }
        self.msd(n, eval)
    }

    /// Most significant digit with no lower bound on the search.
    ///
    /// Never succeeds for an exact zero; the search ends in
    /// [`RealError::PrecisionOverflow`] instead.
    pub(crate) fn msd_unbounded(&self, eval: &Evaluation<'_>) -> Result<Precision, RealError> {
        let mut precision: Precision = 0;
        loop {
            if let Some(msd) = self.msd(precision, eval)? {
                return Ok(msd);
            }
            check_precision(precision)?;
            eval.check_cancelled()?;
            precision = precision * 3 / 2 - 16;
        }
    }

    /// Sign of the value, or `Sign::Zero` if `|x| < 2^a` cannot be ruled out.
    pub(crate) fn signum_within(
        &self,
        a: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<Sign, RealError> {
        if let Some(cached) = self.cached() {
            let quick = cached.value.sign();
            if quick != Sign::Zero {
                return Ok(quick);
            }
        }
        Ok(self.approximate(a - 1, eval)?.sign())
    }

    /// Sign of the value. Never returns for an exact zero other than by
    /// [`RealError::PrecisionOverflow`].
    pub(crate) fn signum(&self, eval: &Evaluation<'_>) -> Result<Sign, RealError> {
        let mut a: Precision = -20;
        loop {
            check_precision(a)?;
            eval.check_cancelled()?;
            let sign = self.signum_within(a, eval)?;
            if sign != Sign::Zero {
                return Ok(sign);
            }
            debug!(precision = a, "sign still unknown, refining");
            a *= 2;
        }
    }

    /// Compares with `other`, treating values closer than `2^a` as equal.
    pub(crate) fn compare_within(
        &self,
        other: &Node,
        a: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<Ordering, RealError> {
        let needed = a - 1;
        let this = self.approximate(needed, eval)?;
        let that = other.approximate(needed, eval)?;
        let one = BigInteger::one();
        if this > &that + &one {
            Ok(Ordering::Greater)
        } else if this < &that - &one {
            Ok(Ordering::Less)
        } else {
            Ok(Ordering::Equal)
        }
    }

    /// Compares with `other` to a tolerance that is relative (`2^r` times the
    /// larger magnitude) but never finer than the absolute tolerance `2^a`.
    pub(crate) fn compare_relative(
        &self,
        other: &Node,
        r: Precision,
        a: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<Ordering, RealError> {
        let this_msd = self.iter_msd(a, eval)?;
        let other_msd = other.iter_msd(this_msd.map_or(a, |msd| msd.max(a)), eval)?;
        let max_msd = match (this_msd, other_msd) {
            (None, None) => return Ok(Ordering::Equal),
            (Some(msd), None) | (None, Some(msd)) => msd,
            (Some(this), Some(other)) => this.max(other),
        };
        check_precision(r)?;
        let tolerance = (max_msd + r).max(a);
        self.compare_within(other, tolerance, eval)
    }

    /// Compares with `other`, refining until the values are distinguished.
    /// Never returns for equal values other than by [`RealError::PrecisionOverflow`].
    pub(crate) fn compare(&self, other: &Node, eval: &Evaluation<'_>) -> Result<Ordering, RealError> {
        let mut a: Precision = -20;
        loop {
            check_precision(a)?;
            eval.check_cancelled()?;
            let ordering = self.compare_within(other, a, eval)?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
            debug!(precision = a, "comparison inconclusive, refining");
            a *= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::thread;

    use super::*;
    use crate::concurrency::CancelToken;
    use crate::test_utils::int;

    /// Test helper: a constant `value * 2^exponent` that counts computations.
    struct CountingOp {
        calls: Arc<AtomicUsize>,
        value: BigInteger,
        exponent: Precision,
        caching: Caching,
    }

    impl NodeOp for CountingOp {
        fn compute_approximation(
            &self,
            _node: &Node,
            precision: Precision,
            _eval: &Evaluation<'_>,
        ) -> Result<BigInteger, RealError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(scale(&self.value, self.exponent - precision))
        }

        fn caching(&self) -> Caching {
            self.caching
        }
    }

    fn counting_node(value: i64, exponent: Precision, caching: Caching) -> (Arc<Node>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let node = Node::new(CountingOp {
            calls: Arc::clone(&calls),
            value: int(value),
            exponent,
            caching,
        });
        (node, calls)
    }

    #[test]
    fn coarser_requests_are_served_from_cache() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (node, calls) = counting_node(5, -3, Caching::Exact);

        assert_eq!(node.approximate(-10, &eval).expect("approximate"), int(5 << 7));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

        assert_eq!(node.approximate(-2, &eval).expect("approximate"), int(3));
        assert_eq!(node.approximate(-10, &eval).expect("approximate"), int(5 << 7));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

        node.approximate(-11, &eval).expect("approximate");
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
        assert_eq!(node.cached().map(|c| c.precision), Some(-11));
    }

    #[test]
    fn coarse_caching_evaluates_on_grid() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (node, calls) = counting_node(1, 0, Caching::Coarse);

        assert_eq!(node.approximate(-3, &eval).expect("approximate"), int(8));
        assert_eq!(node.cached().map(|c| c.precision), Some(-64));
        for precision in -64..=0 {
            node.approximate(precision, &eval).expect("approximate");
        }
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

        node.approximate(-70, &eval).expect("approximate");
        assert_eq!(node.cached().map(|c| c.precision), Some(-128));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn approximate_rejects_overflowing_precision() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (node, calls) = counting_node(1, 0, Caching::Exact);
        assert_eq!(
            node.approximate(Precision::MIN, &eval),
            Err(RealError::PrecisionOverflow)
        );
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn msd_brackets_magnitude() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        // 12 = 0b1100, so 2^2 < 12 < 2^4 and msd is 3 (or 2 given probe slop).
        let (node, _) = counting_node(12, 0, Caching::Exact);
        let msd = node.iter_msd(-50, &eval).expect("msd").expect("nonzero");
        assert!((2..=3).contains(&msd), "msd = {msd}");

        let (tiny, _) = counting_node(1, -200, Caching::Exact);
        assert_eq!(tiny.iter_msd(-50, &eval).expect("msd"), None);
        let msd = tiny.msd_unbounded(&eval).expect("msd");
        assert!((-201..=-199).contains(&msd), "msd = {msd}");
    }

    #[test]
    fn msd_of_zero_overflows() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (zero, _) = counting_node(0, 0, Caching::Exact);
        assert_eq!(zero.msd_unbounded(&eval), Err(RealError::PrecisionOverflow));
        assert_eq!(zero.signum(&eval), Err(RealError::PrecisionOverflow));
    }

    #[test]
    fn bounded_sign_reports_zero_when_inconclusive() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (tiny, _) = counting_node(-1, -100, Caching::Exact);
        assert_eq!(tiny.signum_within(-10, &eval).expect("sign"), Sign::Zero);
        assert_eq!(tiny.signum(&eval).expect("sign"), Sign::Minus);
    }

    #[test]
    fn comparison_uses_one_ulp_margin() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        let (a, _) = counting_node(1, 0, Caching::Exact);
        let (b, _) = counting_node((1 << 30) + 1, -30, Caching::Exact);
        assert_eq!(a.compare_within(&b, -10, &eval).expect("compare"), Ordering::Equal);
        assert_eq!(a.compare(&b, &eval).expect("compare"), Ordering::Less);
        assert_eq!(
            a.compare_relative(&b, -10, -100, &eval).expect("compare"),
            Ordering::Equal
        );
    }

    #[test]
    fn cancelled_search_aborts() {
        let token = CancelToken::new();
        token.cancel();
        let eval = Evaluation::new(&token);
        let (zero, _) = counting_node(0, 0, Caching::Exact);
        assert_eq!(zero.signum(&eval), Err(RealError::Aborted));
    }

    #[test]
    fn concurrent_evaluation_agrees() {
        let (node, _) = counting_node(7, -5, Caching::Exact);
        let handles: Vec<_> = (0..8)
            .map(|offset| {
                let node = Arc::clone(&node);
                thread::spawn(move || {
                    let token = CancelToken::new();
                    let eval = Evaluation::new(&token);
                    node.approximate(-20 - offset, &eval)
                })
            })
            .collect();
        for (offset, handle) in handles.into_iter().enumerate() {
            let value = handle.join().expect("join").expect("approximate");
            assert_eq!(value, int(7).shift_left(15 + offset as i32));
        }
        assert_eq!(node.cached().map(|c| c.precision), Some(-27));
    }
}
