//! Errors reported by the event loop.
//!
//! Futures never return errors; they reject. These are host-level failures
//! of the loop that drives them.

use core_types::Value;
use thiserror::Error;

/// Event loop failure.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A host task threw and nothing caught it.
    #[error("uncaught exception in task: {0}")]
    UncaughtException(Value),

    /// The configured job budget ran out before the queues drained.
    #[error("event loop job budget of {budget} exhausted")]
    BudgetExhausted {
        /// Number of jobs allowed per `run_until_done` call
        budget: usize,
    },
}

/// Result type for event loop operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
