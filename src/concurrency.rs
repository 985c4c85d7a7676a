//! Cooperative cancellation and per-evaluation bookkeeping.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RealError;

/// Monotonic stop flag that can only transition from false to true.
#[derive(Debug)]
pub struct StopFlag {
    inner: AtomicBool,
}

impl StopFlag {
    pub fn new() -> Self {
        Self {
            inner: AtomicBool::new(false),
        }
    }

    pub fn stop(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Shared handle used to cancel evaluations from another thread.
///
/// Evaluation polls the token at the top of every long-running loop (series
/// summation, sign and magnitude searches, inverse-function bracketing) and fails
/// with [`RealError::Aborted`] once it has been cancelled.
#[derive(Clone, Debug)]
pub struct CancelToken {
    flag: Arc<StopFlag>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(StopFlag::new()),
        }
    }

    pub fn cancel(&self) {
        self.flag.stop();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_stopped()
    }
}

/// Context threaded through one top-level evaluation.
pub(crate) struct Evaluation<'a> {
    token: &'a CancelToken,
    depth: Cell<usize>,
    peak_depth: Cell<usize>,
}

impl<'a> Evaluation<'a> {
    pub(crate) fn new(token: &'a CancelToken) -> Self {
        Self {
            token,
            depth: Cell::new(0),
            peak_depth: Cell::new(0),
        }
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), RealError> {
        if self.token.is_cancelled() {
            return Err(RealError::Aborted);
        }
        Ok(())
    }

    /// Records entry into a nested node computation until the guard drops.
    pub(crate) fn enter(&self) -> DepthGuard<'_> {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        if depth > self.peak_depth.get() {
            self.peak_depth.set(depth);
        }
        DepthGuard { depth: &self.depth }
    }

    /// Deepest nesting of node computations seen so far.
    pub(crate) fn peak_depth(&self) -> usize {
        self.peak_depth.get()
    }
}

pub(crate) struct DepthGuard<'e> {
    depth: &'e Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_default_tokens_start_live() {
        assert!(!CancelToken::new().is_cancelled());
        assert!(!CancelToken::default().is_cancelled());
        let flag = StopFlag::new();
        flag.stop();
        assert!(flag.is_stopped());
    }

    #[test]
    fn token_cancellation_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn evaluation_reports_cancellation() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        assert!(eval.check_cancelled().is_ok());
        token.cancel();
        assert_eq!(eval.check_cancelled(), Err(RealError::Aborted));
    }

    #[test]
    fn depth_guard_tracks_peak() {
        let token = CancelToken::new();
        let eval = Evaluation::new(&token);
        {
            let _outer = eval.enter();
            {
                let _inner = eval.enter();
            }
            let _sibling = eval.enter();
        }
        assert_eq!(eval.peak_depth(), 2);
        let _again = eval.enter();
        assert_eq!(eval.peak_depth(), 2);
    }
}
