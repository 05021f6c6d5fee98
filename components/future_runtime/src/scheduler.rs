//! The deferred-execution seam.
//!
//! Futures never run settlement effects or handlers inline. They hand a
//! [`MicroTask`] to a [`Defer`] implementation, which must:
//!
//! - never run the action inside the call to `defer`;
//! - run actions deferred from the same call site in FIFO order.
//!
//! [`crate::EventLoop`] is the implementation shipped with this crate. Any
//! other host loop can be plugged in by implementing the trait.

use crate::task_queue::MicroTask;
use std::rc::Rc;

/// Capability to run an action on a later turn.
pub trait Defer {
    /// Queues `job` to run after the current synchronous call stack unwinds.
    fn defer(&self, job: MicroTask);
}

/// Shared handle to a [`Defer`] implementation, held by every future.
pub type Scheduler = Rc<dyn Defer>;
