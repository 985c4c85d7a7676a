//! Expressions expanded on first evaluation.

use std::sync::OnceLock;

use crate::bigint::BigInteger;
use crate::concurrency::Evaluation;
use crate::error::RealError;
use crate::node::{Node, NodeOp};
use crate::precision::Precision;
use crate::real::Real;

type Expansion = dyn Fn(&Evaluation<'_>) -> Result<Real, RealError> + Send + Sync;

/// A node whose expression depends on a rough look at its operands.
///
/// Range reductions pick their identity from a cheap approximation of the
/// argument. Building one must not evaluate anything, so the choice is made on
/// first approximation and the expanded expression is kept for later requests.
pub struct DeferredOp {
    expand: Box<Expansion>,
    expansion: OnceLock<Real>,
}

impl DeferredOp {
    pub fn new(
        expand: impl Fn(&Evaluation<'_>) -> Result<Real, RealError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            expand: Box::new(expand),
            expansion: OnceLock::new(),
        }
    }

    fn expansion(&self, eval: &Evaluation<'_>) -> Result<&Real, RealError> {
        if let Some(expanded) = self.expansion.get() {
            return Ok(expanded);
        }
        let expanded = (self.expand)(eval)?;
        Ok(self.expansion.get_or_init(|| expanded))
    }
}

impl NodeOp for DeferredOp {
    fn compute_approximation(
        &self,
        _node: &Node,
        precision: Precision,
        eval: &Evaluation<'_>,
    ) -> Result<BigInteger, RealError> {
        self.expansion(eval)?.node.approximate(precision, eval)
    }
}
