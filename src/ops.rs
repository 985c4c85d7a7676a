//! Operators for the expression graph.
//!
//! This module contains all the NodeOp implementations:
//! - `IntegerOp`, `AssumedIntOp`: exact integers and integer-valued subexpressions
//! - `NegOp`, `AddOp`, `MulOp`, `ShiftOp`: arithmetic operations
//! - `InvOp`: multiplicative inverse
//! - `SelectOp`, `SignumOp`: sign-driven branching
//! - `PrescaledExpOp`, `PrescaledLnOp`, `PrescaledCosOp`, `IntegralAtanOp`:
//!   Taylor series valid on a restricted argument range
//! - `SqrtOp`: square root by float seeding and Newton steps
//! - `DeferredOp`: range reductions chosen on first evaluation

mod arithmetic;
mod atan;
mod constant;
mod cos;
mod deferred;
mod exp;
mod inv;
mod ln;
mod select;
mod sqrt;

pub(crate) use arithmetic::{AddOp, MulOp, NegOp, ShiftOp};
pub(crate) use atan::{atan2, pi};
pub(crate) use constant::{AssumedIntOp, IntegerOp};
pub(crate) use cos::cos;
pub(crate) use deferred::DeferredOp;
pub(crate) use exp::exp;
pub(crate) use inv::InvOp;
pub(crate) use ln::{ln, ln2};
pub(crate) use select::{SelectOp, SignumOp};
pub(crate) use sqrt::SqrtOp;
