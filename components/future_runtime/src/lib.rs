//! Promises/A+ futures on a single-threaded event loop.
//!
//! This crate provides a deferred-value primitive and the loop that drives it:
//! - [`Future`] - Promises/A+ state machine with `then`, `catch` and `finally`
//! - The resolution procedure that adopts futures and unwraps foreign thenables
//! - Constructors ([`Future::resolve`], [`Future::reject`], [`Future::deferred`])
//!   and combinators ([`Future::all`], [`Future::race`], [`Future::all_settled`],
//!   [`Future::any`])
//! - [`EventLoop`] - microtask, task and virtual-time timer queues
//!
//! # Overview
//!
//! Futures never run handlers inline. Everything they defer goes through the
//! [`Defer`] trait, reached via a [`Scheduler`] handle; [`EventLoop`] is the
//! implementation shipped here.
//!
//! # Examples
//!
//! ## Event Loop Usage
//!
//! ```
//! use future_runtime::{EventLoop, Task};
//! use core_types::Value;
//!
//! let event_loop = EventLoop::new();
//! event_loop.enqueue_task(Task::new(|| Ok(Value::Undefined)));
//! event_loop.run_until_done().unwrap();
//! ```
//!
//! ## Future Usage
//!
//! ```
//! use future_runtime::{EventLoop, Future, FutureState};
//! use core_types::{Function, Value};
//!
//! let event_loop = EventLoop::new();
//! let scheduler = event_loop.scheduler();
//!
//! let rejected = Future::reject(&scheduler, Value::from("nope"));
//! let recovered = rejected.catch(Function::new(|_| Ok(Value::Smi(0))));
//!
//! event_loop.run_until_done().unwrap();
//! assert_eq!(recovered.state(), FutureState::Fulfilled);
//! assert_eq!(recovered.result(), Some(Value::Smi(0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod combinators;
pub mod constructors;
pub mod error;
pub mod event_loop;
pub mod future;
mod resolution;
pub mod scheduler;
pub mod task_queue;

// Re-export main types at crate root
pub use constructors::Deferred;
pub use error::{RuntimeError, RuntimeResult};
pub use event_loop::{EventLoop, EventLoopConfig};
pub use future::{Future, FutureState};
pub use scheduler::{Defer, Scheduler};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId, TimerQueue};
