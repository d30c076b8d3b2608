//! Bounded-time execution of blocking backend calls.

use crate::error::{BackendError, Result};
use std::time::{Duration, Instant};

/// Run a blocking backend operation under a hard time budget.
///
/// The operation is issued exactly once and never retried here. A result
/// that arrives after the budget has elapsed is discarded and reported as a
/// transient [`BackendError::Timeout`]; no partial result is accepted.
/// Errors from the operation itself propagate unchanged, so transport
/// faults keep their own classification.
///
/// No cooperative cancellation is modeled: once issued, the operation
/// either completes, overruns the budget, or fails outright.
pub fn run_with_budget<T, F>(op: &'static str, budget: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let out = f()?;
    if start.elapsed() > budget {
        return Err(BackendError::Timeout { op, budget });
    }
    Ok(out)
}
