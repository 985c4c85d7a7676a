//! Derivatives of monotone functions by central differences.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::trace;

use super::Function;
use crate::bigint::{BigInteger, Sign};
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{bit_length, check_precision, scale, Precision};
use crate::real::Real;

const EXTRA_PRECISION: Precision = 4;

/// Estimates further apart than this, in working units, mean the step was
/// too coarse.
const MAX_ESTIMATE_GAP: i64 = 8;

/// Marks a curvature estimate that has not been computed yet.
const UNKNOWN_MSD: Precision = Precision::MIN;

struct DerivativeShared {
    function: Function,
    low: Real,
    high: Real,
    /// Step-size driver: an upper estimate of the msd of the second
    /// derivative, shared by all arguments and only ever raised.
    curvature_msd: AtomicI32,
}

impl DerivativeShared {
    /// Msd of `f''` from the second difference over `[a, b]`, if measurable.
    fn second_difference_msd(
        &self,
        a: &Real,
        b: &Real,
        eval: &Evaluation<'_>,
    ) -> Result<Option<Precision>, RealError> {
        let middle = (a + b).shift_right(1);
        let f_a = self.function.execute(a);
        let f_middle = self.function.execute(&middle);
        let f_b = self.function.execute(b);
        let second_difference = &(&f_b - &f_middle.shift_left(1)) + &f_a;
        let width_msd = (b - a).node.msd_unbounded(eval)?;
        let difference_msd = second_difference.node.msd(width_msd - 20, eval)?;
        // The second difference spans two half-width steps.
        Ok(difference_msd.map(|msd| msd - 2 * (width_msd - 1)))
    }

    fn curvature_msd(&self, eval: &Evaluation<'_>) -> Result<Precision, RealError> {
        let known = self.curvature_msd.load(Ordering::Relaxed);
        if known != UNKNOWN_MSD {
            return Ok(known);
        }
        // Odd curvature cancels over the whole interval; the halves catch it.
        let middle = (&self.low + &self.high).shift_right(1);
        let measured = [
            self.second_difference_msd(&self.low, &self.high, eval)?,
            self.second_difference_msd(&self.low, &middle, eval)?,
            self.second_difference_msd(&middle, &self.high, eval)?,
        ]
        .into_iter()
        .flatten()
        .max();
        let estimate = match measured {
            Some(msd) => msd,
            None => {
                // Below the probe's resolution: |f''| < 2^(w - 20) / 2^(2w - 2).
                let width_msd = (&self.high - &self.low).node.msd_unbounded(eval)?;
                -width_msd - 18
            }
        } + EXTRA_PRECISION;
        trace!(estimate, "derivative: initial curvature estimate");
        let _ = self.curvature_msd.compare_exchange(
            UNKNOWN_MSD,
            estimate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
        Ok(self.curvature_msd.load(Ordering::Relaxed))
    }

    /// Raises the estimate to at least `corrected`, and always by at least one.
    fn raise_curvature(&self, previous: Precision, corrected: Precision) {
        let raised = corrected.max(previous.saturating_add(1));
        self.curvature_msd.fetch_max(raised, Ordering::Relaxed);
    }
}

/// `f'(arg)` for one argument.
struct DerivativeOp {
    shared: Arc<DerivativeShared>,
    arg: Real,
    f_arg: Real,
    max_delta_msd: OnceLock<Precision>,
}

impl DerivativeOp {
    /// Largest step exponent that keeps `arg +- delta` inside the interval.
    fn max_delta_msd(&self, eval: &Evaluation<'_>) -> Result<Precision, RealError> {
        if let Some(&msd) = self.max_delta_msd.get() {
            return Ok(msd);
        }
        let to_low = &self.arg - &self.shared.low;
        let to_high = &self.shared.high - &self.arg;
        if to_low.node.signum(eval)? == Sign::Minus || to_high.node.signum(eval)? == Sign::Minus {
            return Err(RealError::Domain("derivative argument outside the interval"));
        }
        let msd = to_low
            .node
            .msd_unbounded(eval)?
            .min(to_high.node.msd_unbounded(eval)?);
        Ok(*self.max_delta_msd.get_or_init(|| msd))
    }

    /// Left and right difference quotients with step `2^log_delta`.
    fn slopes(
        &self,
        log_delta: Precision,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<(BigInteger, BigInteger), RealError> {
        let delta = Real::one().shift_left(log_delta);
        let f_left = self.shared.function.execute(&(&self.arg - &delta));
        let f_right = self.shared.function.execute(&(&self.arg + &delta));
        let left_slope = (&self.f_arg - &f_left).shift_right(log_delta);
        let right_slope = (&f_right - &self.f_arg).shift_right(log_delta);
        Ok((
            left_slope.node.approximate(precision, eval)?,
            right_slope.node.approximate(precision, eval)?,
        ))
    }
}

impl NodeOp for DerivativeOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let max_delta_msd = self.max_delta_msd(eval)?;
        let eval_precision = precision - EXTRA_PRECISION;
        check_precision(eval_precision)?;
        let max_gap = BigInteger::from(MAX_ESTIMATE_GAP);
        loop {
            eval.check_cancelled()?;
            let curvature_msd = self.shared.curvature_msd(eval)?;
            let log_delta = precision
                .checked_sub(curvature_msd)
                .ok_or(RealError::PrecisionOverflow)?
                .min(max_delta_msd)
                - EXTRA_PRECISION;
            check_precision(log_delta - 1)?;

            let (left, right) = self.slopes(log_delta, eval_precision, eval)?;
            let gap = (&right - &left).abs();
            if gap >= max_gap {
                // The one-sided slopes differ by about f'' * delta.
                let corrected = eval_precision + bit_length(&gap) + EXTRA_PRECISION - log_delta;
                trace!(log_delta, %gap, corrected, "derivative: slopes disagree, retrying");
                self.shared.raise_curvature(curvature_msd, corrected);
                continue;
            }

            // Central differences at delta and delta / 2 differ by three times
            // the truncation error left in the finer one.
            let (half_left, half_right) = self.slopes(log_delta - 1, eval_precision, eval)?;
            let central = &left + &right;
            let half_central = &half_left + &half_right;
            let central_gap = (&central - &half_central).abs();
            if central_gap < max_gap {
                return Ok(scale(&half_central, -EXTRA_PRECISION - 1));
            }
            // Truncation error shrinks with delta squared.
            let corrected = curvature_msd + (bit_length(&central_gap) + 1) / 2 + 1;
            eval.check_cancelled()?;
            trace!(log_delta, %central_gap, corrected, "derivative: truncation too large, retrying");
            self.shared.raise_curvature(curvature_msd, corrected);
        }
    }
}

impl Function {
    /// The derivative of a function monotone on `[low, high]`, valid for
    /// arguments strictly inside the interval.
    ///
    /// The step size adapts to a shared estimate of the second derivative,
    /// so later evaluations benefit from corrections made by earlier ones.
    /// Each step is checked against one of half the size before it is used.
    pub fn monotone_derivative(&self, low: &Real, high: &Real) -> Function {
        let shared = Arc::new(DerivativeShared {
            function: self.clone(),
            low: low.clone(),
            high: high.clone(),
            curvature_msd: AtomicI32::new(UNKNOWN_MSD),
        });
        Function::new(move |x: &Real| {
            Real::from_op(DerivativeOp {
                shared: Arc::clone(&shared),
                arg: x.clone(),
                f_arg: shared.function.execute(x),
                max_delta_msd: OnceLock::new(),
            })
        })
    }
}
