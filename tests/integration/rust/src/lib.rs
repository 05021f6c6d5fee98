//! Integration test suite for the future runtime
//!
//! This crate verifies that the value model and the future runtime work
//! together across component boundaries, and hosts the adapter the
//! conformance tests drive.

use core_types::Value;
use future_runtime::{Deferred, EventLoop, Future, Scheduler};

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use future_runtime;
}

/// The three entry points a Promises/A+ conformance harness needs.
pub struct Adapter {
    event_loop: EventLoop,
}

impl Adapter {
    /// Creates an adapter over a fresh event loop.
    pub fn new() -> Self {
        Self {
            event_loop: EventLoop::new(),
        }
    }

    /// The loop the adapter's futures settle on.
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// Scheduler for building futures outside the adapter.
    pub fn scheduler(&self) -> Scheduler {
        self.event_loop.scheduler()
    }

    /// A future already on its way to fulfillment with `value`.
    pub fn resolved(&self, value: Value) -> Future {
        Future::resolve(&self.scheduler(), value)
    }

    /// A future already on its way to rejection with `reason`.
    pub fn rejected(&self, reason: Value) -> Future {
        Future::reject(&self.scheduler(), reason)
    }

    /// A pending future with its settle functions.
    pub fn deferred(&self) -> Deferred {
        Future::deferred(&self.scheduler())
    }

    /// Runs the loop to completion, panicking on an uncaught task exception.
    pub fn settle_all(&self) {
        if let Err(error) = self.event_loop.run_until_done() {
            panic!("event loop failed: {}", error);
        }
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}
