//! Inverses of monotone functions by bracketing.
//!
//! For each requested precision the inverse keeps an interval `[l, h]` of
//! scaled arguments with `f(l) <= arg <= f(h)` and narrows it with a
//! secant-style guess. Steps that fail to halve the interval are paid back
//! with bisection steps, so convergence is at least linear.

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use num_traits::{One, Zero};
use tracing::trace;

use super::Function;
use crate::bigint::{BigInteger, Sign};
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::{bit_length, check_precision, scale, Precision};
use crate::real::Real;

/// Argument bits evaluated beyond the requested precision.
const EXTRA_ARG_PRECISION: Precision = 4;

/// Below this many digits the whole domain is used as the starting bracket.
const WHOLE_DOMAIN_DIGITS: Precision = 30;

/// Bracket width, in working units, at which the midpoint is close enough.
const DONE_WIDTH: i64 = 6;

struct InverseSetup {
    /// Increasing version of the inverted function.
    function: Function,
    negated: bool,
    f_low: Real,
    f_high: Real,
    max_msd: Precision,
    max_arg_precision: Precision,
    derivative_msd: Precision,
}

struct InverseShared {
    function: Function,
    low: Real,
    high: Real,
    setup: OnceLock<InverseSetup>,
}

impl InverseShared {
    fn setup(&self, eval: &Evaluation<'_>) -> Result<&InverseSetup, RealError> {
        if let Some(setup) = self.setup.get() {
            return Ok(setup);
        }
        let setup = self.compute_setup(eval)?;
        Ok(self.setup.get_or_init(|| setup))
    }

    fn compute_setup(&self, eval: &Evaluation<'_>) -> Result<InverseSetup, RealError> {
        let f_low = self.function.execute(&self.low);
        let f_high = self.function.execute(&self.high);
        // Terminates because the function is strictly monotone and low < high.
        let negated = f_low.node.compare(&f_high.node, eval)? == Ordering::Greater;
        let (function, f_low, f_high) = if negated {
            (Function::negate().compose(&self.function), -f_low, -f_high)
        } else {
            (self.function.clone(), f_low, f_high)
        };

        let max_msd = self
            .low
            .abs()
            .max(&self.high.abs())
            .node
            .msd_unbounded(eval)?;
        let width = &self.high - &self.low;
        let max_arg_precision = width.node.msd_unbounded(eval)? - EXTRA_ARG_PRECISION;
        let slope = &(&f_high - &f_low) / &width;
        let derivative_msd = slope.node.msd_unbounded(eval)?;
        trace!(negated, max_msd, max_arg_precision, derivative_msd, "inverse setup");
        Ok(InverseSetup {
            function,
            negated,
            f_low,
            f_high,
            max_msd,
            max_arg_precision,
            derivative_msd,
        })
    }
}

/// `f^-1(arg)` for one argument.
struct InverseOp {
    shared: Arc<InverseShared>,
    arg: Real,
    negated_arg: Real,
}

/// Compares with a difference of one treated as equality.
fn sloppy_compare(x: &BigInteger, y: &BigInteger) -> Ordering {
    let difference = x - y;
    if difference > BigInteger::one() {
        Ordering::Greater
    } else if difference < -BigInteger::one() {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// `f(scaled * 2^arg_precision)` approximated at `eval_precision`.
fn evaluate_at(
    function: &Function,
    scaled: &BigInteger,
    arg_precision: Precision,
    eval_precision: Precision,
    eval: &Evaluation<'_>,
) -> Result<BigInteger, RealError> {
    let x = Real::from(scaled.clone()).shift_left(arg_precision);
    function.execute(&x).node.approximate(eval_precision, eval)
}

struct Bracket {
    low: BigInteger,
    f_low: BigInteger,
    at_low_end: bool,
    high: BigInteger,
    f_high: BigInteger,
    at_high_end: bool,
}

impl NodeOp for InverseOp {
    fn compute_approximation(
        &self,
        node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        let setup = self.shared.setup(eval)?;
        let function = &setup.function;
        let arg = if setup.negated {
            &self.negated_arg
        } else {
            &self.arg
        };

        let digits_needed = setup.max_msd - precision;
        if digits_needed < 0 {
            return Ok(BigInteger::zero());
        }
        let working_arg = (precision - EXTRA_ARG_PRECISION).min(setup.max_arg_precision);
        let mut working_eval = working_arg + setup.derivative_msd - 20;
        check_precision(working_arg)?;
        check_precision(working_eval)?;

        let one = BigInteger::one();
        let two = BigInteger::from(2);
        let low_limit = self.shared.low.node.approximate(working_arg, eval)? + &one;
        let high_limit = self.shared.high.node.approximate(working_arg, eval)? - &one;
        let mut arg_appr = arg.node.approximate(working_eval, eval)?;

        let cached = node.cached();
        let have_good_appr = cached
            .as_ref()
            .map_or(false, |cached| cached.precision < setup.max_msd);
        let mut small_step_deficit: i32;
        let mut bracket = if digits_needed < WHOLE_DOMAIN_DIGITS && !have_good_appr {
            trace!("inverse: bracketing the whole domain");
            let bracket = Bracket {
                f_low: setup.f_low.node.approximate(working_eval, eval)?,
                low: low_limit,
                at_low_end: true,
                f_high: setup.f_high.node.approximate(working_eval, eval)?,
                high: high_limit,
                at_high_end: true,
            };
            if bracket.f_high < &arg_appr - &one || bracket.f_low > &arg_appr + &one {
                return Err(RealError::Domain(
                    "argument outside the range of the inverted function",
                ));
            }
            small_step_deficit = 2;
            bracket
        } else {
            let mut rough_precision = precision + digits_needed / 2;
            if let Some(cached) = cached.filter(|cached| {
                have_good_appr
                    && (digits_needed < WHOLE_DOMAIN_DIGITS
                        || cached.precision < precision + 3 * digits_needed / 4)
            }) {
                rough_precision = cached.precision;
            }
            let rough = node.approximate(rough_precision, eval)?;
            trace!(rough_precision, %rough, "inverse: bracketing a previous approximation");
            let mut high = (&rough + &one).shift_left(rough_precision - working_arg);
            let mut low = (&rough - &one).shift_left(rough_precision - working_arg);
            let (f_high, at_high_end) = if high > high_limit {
                high = high_limit;
                (setup.f_high.node.approximate(working_eval, eval)?, true)
            } else {
                (evaluate_at(function, &high, working_arg, working_eval, eval)?, false)
            };
            let (f_low, at_low_end) = if low < low_limit {
                low = low_limit;
                (setup.f_low.node.approximate(working_eval, eval)?, true)
            } else {
                (evaluate_at(function, &low, working_arg, working_eval, eval)?, false)
            };
            // A clamped end is the domain end, where the range check applies
            // at the working precision.
            if (at_high_end && f_high < &arg_appr - &one) || (at_low_end && f_low > &arg_appr + &one)
            {
                return Err(RealError::Domain(
                    "argument outside the range of the inverted function",
                ));
            }
            small_step_deficit = 0;
            Bracket {
                low,
                f_low,
                at_low_end,
                high,
                f_high,
                at_high_end,
            }
        };

        let done_width = BigInteger::from(DONE_WIDTH);
        let mut difference = &bracket.high - &bracket.low;
        let mut iteration = 0usize;
        loop {
            eval.check_cancelled()?;
            trace!(
                iteration,
                working_arg,
                working_eval,
                low = %bracket.low,
                high = %bracket.high,
                f_low = %bracket.f_low,
                f_high = %bracket.f_high,
                "inverse: narrowing"
            );
            if difference < done_width {
                let midpoint = (&bracket.low + &bracket.high).shift_right(1);
                return Ok(scale(&midpoint, working_arg - precision));
            }

            let f_difference = &bracket.f_high - &bracket.f_low;
            let binary_step = small_step_deficit > 0 || f_difference.is_zero();
            let mut guess = if binary_step {
                small_step_deficit -= 1;
                (&bracket.low + &bracket.high).shift_right(1)
            } else {
                // Interpolate, backing off when within 1/1024 of either end so
                // the next step is likely to bracket the answer.
                let arg_difference = &arg_appr - &bracket.f_low;
                let mut adjustment = (&arg_difference * &difference).divide(&f_difference)?;
                if adjustment < difference.shift_right(10) {
                    adjustment = adjustment.shift_left(8);
                } else if adjustment > (&difference * BigInteger::from(1023)).shift_right(10) {
                    adjustment = &difference - (&difference - &adjustment).shift_left(8);
                }
                if adjustment.sign() != Sign::Plus {
                    adjustment = two.clone();
                }
                if adjustment >= difference {
                    adjustment = &difference - &two;
                }
                if adjustment.sign() != Sign::Plus {
                    &bracket.low + &two
                } else {
                    &bracket.low + &adjustment
                }
            };

            let mut tweak = two.clone();
            let mut adjust_precision = false;
            let (outcome, f_guess) = loop {
                let f_guess = evaluate_at(function, &guess, working_arg, working_eval, eval)?;
                let outcome = sloppy_compare(&f_guess, &arg_appr);
                if outcome != Ordering::Equal {
                    break (outcome, f_guess);
                }
                eval.check_cancelled()?;
                if adjust_precision {
                    // Not enough resolution to tell f(guess) from arg.
                    let adjustment = (-bit_length(&f_guess) / 4).min(-20);
                    working_eval += adjustment;
                    check_precision(working_eval)?;
                    trace!(working_eval, "inverse: raising evaluation precision");
                    bracket.f_low = if bracket.at_low_end {
                        setup.f_low.node.approximate(working_eval, eval)?
                    } else {
                        evaluate_at(function, &bracket.low, working_arg, working_eval, eval)?
                    };
                    bracket.f_high = if bracket.at_high_end {
                        setup.f_high.node.approximate(working_eval, eval)?
                    } else {
                        evaluate_at(function, &bracket.high, working_arg, working_eval, eval)?
                    };
                    arg_appr = arg.node.approximate(working_eval, eval)?;
                } else {
                    // The guess may be exactly right. Nudge it, alternating sides
                    // so the interval keeps shrinking.
                    let nudged = &guess + &tweak;
                    guess = if nudged >= bracket.high {
                        &guess - &tweak
                    } else {
                        nudged
                    };
                    tweak = -tweak;
                }
                adjust_precision = !adjust_precision;
            };

            if outcome == Ordering::Greater {
                bracket.high = guess;
                bracket.f_high = f_guess;
                bracket.at_high_end = false;
            } else {
                bracket.low = guess;
                bracket.f_low = f_guess;
                bracket.at_low_end = false;
            }
            let new_difference = &bracket.high - &bracket.low;
            if !binary_step {
                if new_difference >= difference.shift_right(1) {
                    small_step_deficit += 1;
                } else {
                    small_step_deficit -= 1;
                }
            }
            difference = new_difference;
            iteration += 1;
        }
    }
}

impl Function {
    /// The inverse of a function strictly monotone on `[low, high]`.
    ///
    /// Applying the result to a value outside `f([low, high])` fails with
    /// [`RealError::Domain`] once it is evaluated finely enough to tell the
    /// value from the nearest end of the range.
    pub fn inverse_monotone(&self, low: &Real, high: &Real) -> Function {
        let shared = Arc::new(InverseShared {
            function: self.clone(),
            low: low.clone(),
            high: high.clone(),
            setup: OnceLock::new(),
        });
        Function::new(move |x: &Real| {
            Real::from_op(InverseOp {
                shared: Arc::clone(&shared),
                arg: x.clone(),
                negated_arg: -x,
            })
        })
    }
}
