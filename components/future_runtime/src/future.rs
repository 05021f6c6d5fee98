//! Future implementation following the Promises/A+ specification.
//!
//! A [`Future`] holds one eventual outcome and the handlers waiting for it.
//! Settling is one-shot and always deferred: the settle call claims the
//! future, and a microtask performs the transition and runs the queued
//! reactions. Handlers attached to an already settled future are deferred as
//! well, so no handler ever runs inside the call that attached it.

use crate::resolution;
use crate::scheduler::Scheduler;
use crate::task_queue::MicroTask;
use core_types::{arg, Function, JsError, JsObject, JsResult, Value};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// The state of a Future.
///
/// Futures transition at most once, from `Pending` to one of the settled
/// states, and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    /// The initial state; the future is neither fulfilled nor rejected.
    Pending,
    /// The future has been fulfilled with a value.
    Fulfilled,
    /// The future has been rejected with a reason.
    Rejected,
}

/// A fixed outcome.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Fulfilled(Value),
    Rejected(Value),
}

impl Outcome {
    fn state(&self) -> FutureState {
        match self {
            Outcome::Fulfilled(_) => FutureState::Fulfilled,
            Outcome::Rejected(_) => FutureState::Rejected,
        }
    }
}

#[derive(Debug)]
enum Slot {
    Pending,
    Settled(Outcome),
}

pub(crate) struct FutureCell {
    scheduler: Scheduler,
    slot: RefCell<Slot>,
    /// Set by the first accepted settle call, before the deferred transition runs.
    claimed: Cell<bool>,
    on_fulfilled: RefCell<Vec<ChainedReaction>>,
    on_rejected: RefCell<Vec<ChainedReaction>>,
    this: Weak<FutureCell>,
}

/// A deferred value.
///
/// `Future` is a cheap handle; clones refer to the same future. Equality of
/// futures is identity, see [`Future::ptr_eq`].
///
/// # Examples
///
/// ```
/// use core_types::{arg, Function, Value};
/// use future_runtime::{EventLoop, Future, FutureState};
///
/// let event_loop = EventLoop::new();
/// let scheduler = event_loop.scheduler();
///
/// let future = Future::new(&scheduler, |resolve, _reject| {
///     resolve.call1(Value::Smi(20))?;
///     Ok(())
/// });
/// let doubled = future.then(
///     Some(Function::new(|args| match arg(args, 0) {
///         Value::Smi(n) => Ok(Value::Smi(n + 22)),
///         other => Ok(other),
///     })),
///     None,
/// );
///
/// // Settlement is deferred until the loop runs.
/// assert_eq!(future.state(), FutureState::Pending);
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(doubled.result(), Some(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Future {
    cell: Rc<FutureCell>,
}

impl Future {
    /// Creates a future and runs `executor` synchronously with its settle
    /// functions.
    ///
    /// An `Err` returned by the executor rejects the future, unless it was
    /// already settled by the executor.
    pub fn new<F>(scheduler: &Scheduler, executor: F) -> Self
    where
        F: FnOnce(Function, Function) -> JsResult<()>,
    {
        let future = Future::pending(scheduler);
        let (resolve, reject) = future.settle_functions();
        if let Err(reason) = executor(resolve, reject) {
            future.settle(Outcome::Rejected(reason));
        }
        future
    }

    /// Creates a pending future with no executor.
    pub(crate) fn pending(scheduler: &Scheduler) -> Self {
        let cell = Rc::new_cyclic(|this| FutureCell {
            scheduler: Rc::clone(scheduler),
            slot: RefCell::new(Slot::Pending),
            claimed: Cell::new(false),
            on_fulfilled: RefCell::new(Vec::new()),
            on_rejected: RefCell::new(Vec::new()),
            this: this.clone(),
        });
        Future { cell }
    }

    /// Returns the fulfill and reject functions bound to this future.
    pub(crate) fn settle_functions(&self) -> (Function, Function) {
        let target = self.clone();
        let resolve = Function::new(move |args| {
            target.settle(Outcome::Fulfilled(arg(args, 0)));
            Ok(Value::Undefined)
        });
        let target = self.clone();
        let reject = Function::new(move |args| {
            target.settle(Outcome::Rejected(arg(args, 0)));
            Ok(Value::Undefined)
        });
        (resolve, reject)
    }

    /// Returns the scheduler this future defers its work onto.
    pub fn scheduler(&self) -> &Scheduler {
        &self.cell.scheduler
    }

    /// Returns the current state.
    pub fn state(&self) -> FutureState {
        match &*self.cell.slot.borrow() {
            Slot::Pending => FutureState::Pending,
            Slot::Settled(outcome) => outcome.state(),
        }
    }

    /// Returns the fulfillment value or rejection reason once settled.
    pub fn result(&self) -> Option<Value> {
        self.outcome().map(|outcome| match outcome {
            Outcome::Fulfilled(value) | Outcome::Rejected(value) => value,
        })
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        match &*self.cell.slot.borrow() {
            Slot::Pending => None,
            Slot::Settled(outcome) => Some(outcome.clone()),
        }
    }

    /// Returns true if both handles refer to the same future.
    pub fn ptr_eq(&self, other: &Future) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Wraps the future into a shared [`Value`].
    pub fn to_value(&self) -> Value {
        Value::Object(self.cell.clone())
    }

    /// Recovers a future previously wrapped with [`Future::to_value`].
    pub fn from_value(value: &Value) -> Option<Future> {
        let obj = value.as_object()?;
        let cell = Rc::clone(obj).into_any().downcast::<FutureCell>().ok()?;
        Some(Future { cell })
    }

    /// Claims the future for `outcome` and defers the transition.
    ///
    /// Only the first call is accepted; later calls are silent no-ops, even
    /// before the deferred transition has run.
    fn settle(&self, outcome: Outcome) {
        if self.cell.claimed.get() || self.state() != FutureState::Pending {
            tracing::trace!(state = ?outcome.state(), "settle ignored, future already claimed");
            return;
        }
        self.cell.claimed.set(true);
        tracing::trace!(state = ?outcome.state(), "future claimed");

        let target = self.clone();
        self.cell
            .scheduler
            .defer(MicroTask::new(move || target.transition(outcome)));
    }

    fn transition(&self, outcome: Outcome) {
        *self.cell.slot.borrow_mut() = Slot::Settled(outcome.clone());

        // Queues are never written once settled; taking them drops the other side.
        let fulfilled = std::mem::take(&mut *self.cell.on_fulfilled.borrow_mut());
        let rejected = std::mem::take(&mut *self.cell.on_rejected.borrow_mut());
        let (reactions, result) = match outcome {
            Outcome::Fulfilled(value) => (fulfilled, value),
            Outcome::Rejected(reason) => (rejected, reason),
        };
        tracing::trace!(state = ?self.state(), reactions = reactions.len(), "future settled");

        for reaction in reactions {
            reaction.run(result.clone());
        }
    }

    /// Registers handlers and returns the future they settle.
    ///
    /// A missing `on_fulfilled` passes the value through; a missing
    /// `on_rejected` rethrows the reason. The handler's return value is run
    /// through the resolution procedure; an `Err` from it rejects the
    /// returned future.
    pub fn then(&self, on_fulfilled: Option<Function>, on_rejected: Option<Function>) -> Future {
        let on_fulfilled = on_fulfilled.unwrap_or_else(|| Function::new(|args| Ok(arg(args, 0))));
        let on_rejected = on_rejected.unwrap_or_else(|| Function::new(|args| Err(arg(args, 0))));

        let promise2 = Future::pending(&self.cell.scheduler);
        let (resolve, reject) = promise2.settle_functions();
        let fulfill_reaction = ChainedReaction {
            handler: on_fulfilled,
            promise2: promise2.clone(),
            resolve: resolve.clone(),
            reject: reject.clone(),
        };
        let reject_reaction = ChainedReaction {
            handler: on_rejected,
            promise2: promise2.clone(),
            resolve,
            reject,
        };

        match self.outcome() {
            None => {
                self.cell.on_fulfilled.borrow_mut().push(fulfill_reaction);
                self.cell.on_rejected.borrow_mut().push(reject_reaction);
            }
            Some(Outcome::Fulfilled(value)) => {
                self.cell
                    .scheduler
                    .defer(MicroTask::new(move || fulfill_reaction.run(value)));
            }
            Some(Outcome::Rejected(reason)) => {
                self.cell
                    .scheduler
                    .defer(MicroTask::new(move || reject_reaction.run(reason)));
            }
        }

        promise2
    }

    /// Registers a rejection handler; same as `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Function) -> Future {
        self.then(None, Some(on_rejected))
    }

    /// Registers `callback` for both outcomes; same as
    /// `then(Some(callback), Some(callback))`.
    ///
    /// The callback's return value settles the returned future, so this does
    /// not preserve the original value the way `Promise.prototype.finally`
    /// does.
    pub fn finally(&self, callback: Function) -> Future {
        self.then(Some(callback.clone()), Some(callback))
    }
}

/// One pending handler invocation for the future returned by `then`.
struct ChainedReaction {
    handler: Function,
    promise2: Future,
    resolve: Function,
    reject: Function,
}

impl ChainedReaction {
    fn run(self, argument: Value) {
        match self.handler.call1(argument) {
            Ok(x) => resolution::resolve(&self.promise2, x, &self.resolve, &self.reject),
            Err(error) => resolution::settle_with(&self.reject, error),
        }
    }
}

/// Pending reactions own the futures derived from this one, which own theirs
/// in turn. Successors held only by those reactions are drained onto a
/// worklist here, so dropping a long chain does not recurse once per link.
impl Drop for FutureCell {
    fn drop(&mut self) {
        let mut worklist = std::mem::take(self.on_fulfilled.get_mut());
        worklist.append(self.on_rejected.get_mut());

        while let Some(reaction) = worklist.pop() {
            let ChainedReaction {
                handler,
                promise2,
                resolve,
                reject,
            } = reaction;
            drop((handler, resolve, reject));

            let cell = promise2.cell;
            if Rc::strong_count(&cell) == 1 {
                if let Ok(mut queue) = cell.on_fulfilled.try_borrow_mut() {
                    worklist.append(&mut queue);
                }
                if let Ok(mut queue) = cell.on_rejected.try_borrow_mut() {
                    worklist.append(&mut queue);
                }
            }
        }
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.state())
            .field("result", &self.result())
            .finish()
    }
}

/// A future seen as a JavaScript object exposes `then`, `catch` and
/// `finally` members bound to it. Non-callable handler arguments are treated
/// as missing.
impl JsObject for FutureCell {
    fn get(&self, key: &str) -> JsResult<Value> {
        let this = self.this.clone();
        let method = match key {
            "then" => Function::new(move |args| {
                let future = upgrade(&this)?;
                let on_fulfilled = Function::from_value(&arg(args, 0));
                let on_rejected = Function::from_value(&arg(args, 1));
                Ok(future.then(on_fulfilled, on_rejected).to_value())
            }),
            "catch" => Function::new(move |args| {
                let future = upgrade(&this)?;
                let on_rejected = Function::from_value(&arg(args, 0));
                Ok(future.then(None, on_rejected).to_value())
            }),
            "finally" => Function::new(move |args| {
                let future = upgrade(&this)?;
                let callback = Function::from_value(&arg(args, 0));
                Ok(future.then(callback.clone(), callback).to_value())
            }),
            _ => return Ok(Value::Undefined),
        };
        Ok(method.to_value())
    }

    fn has(&self, key: &str) -> bool {
        matches!(key, "then" | "catch" | "finally")
    }

    fn class_name(&self) -> &'static str {
        "Future"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

fn upgrade(this: &Weak<FutureCell>) -> JsResult<Future> {
    this.upgrade()
        .map(|cell| Future { cell })
        .ok_or_else(|| JsError::type_error("future is no longer alive").into())
}
