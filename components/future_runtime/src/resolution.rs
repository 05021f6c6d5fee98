//! The Promises/A+ resolution procedure.
//!
//! [`resolve`] decides how a handler's return value `x` settles the future
//! returned by `then`: adopt another future, unwrap a foreign thenable, or
//! fulfill with a plain value. Reading `then` and calling it are separate
//! failure points, and a thenable's continuations share a one-shot [`Gate`]
//! so the first call wins. Re-entry with a thenable's resolution value is
//! deferred as a microtask rather than recursing on the caller's stack.

use crate::future::{Future, Outcome};
use crate::task_queue::MicroTask;
use core_types::{arg, Function, JsError, JsObject, Value};
use std::cell::Cell;
use std::rc::Rc;

/// Settles `promise2` according to `x`, using its `resolve`/`reject`
/// functions.
///
/// Re-entry happens when `x` adopts a pending future or a thenable resolves
/// with another value. Every level runs as a separate microtask and repeats
/// the identity check against `promise2`.
pub(crate) fn resolve(promise2: &Future, x: Value, resolve_fn: &Function, reject_fn: &Function) {
    if let Some(inner) = Future::from_value(&x) {
        if inner.ptr_eq(promise2) {
            tracing::debug!("chaining cycle detected");
            settle_with(reject_fn, JsError::chaining_cycle().into());
            return;
        }
        adopt(promise2, &inner, resolve_fn, reject_fn);
        return;
    }

    let object = match &x {
        Value::Object(obj) => Rc::clone(obj),
        _ => {
            settle_with(resolve_fn, x);
            return;
        }
    };

    let then = match object.get("then") {
        Ok(then) => then,
        Err(error) => {
            tracing::debug!("reading then failed");
            settle_with(reject_fn, error);
            return;
        }
    };
    let then = match Function::from_value(&then) {
        Some(then) => then,
        None => {
            settle_with(resolve_fn, x);
            return;
        }
    };

    let gate = Gate::new();
    let on_resolve = {
        let gate = gate.clone();
        let promise2 = promise2.clone();
        let (resolve_fn, reject_fn) = (resolve_fn.clone(), reject_fn.clone());
        Function::new(move |args| {
            if gate.claim() {
                // Re-entry is a separate job; unwrapping never nests on the stack.
                let (promise2, resolve_fn, reject_fn) =
                    (promise2.clone(), resolve_fn.clone(), reject_fn.clone());
                let y = arg(args, 0);
                let scheduler = Rc::clone(promise2.scheduler());
                scheduler.defer(MicroTask::new(move || {
                    resolve(&promise2, y, &resolve_fn, &reject_fn)
                }));
            }
            Ok(Value::Undefined)
        })
    };
    let on_reject = {
        let gate = gate.clone();
        let reject_fn = reject_fn.clone();
        Function::new(move |args| {
            if gate.claim() {
                settle_with(&reject_fn, arg(args, 0));
            }
            Ok(Value::Undefined)
        })
    };

    if let Err(error) = then.call(&x, &[on_resolve.to_value(), on_reject.to_value()]) {
        if gate.claim() {
            tracing::debug!("calling then failed");
            settle_with(reject_fn, error);
        }
    }
}

/// Makes `promise2` follow the outcome of another future.
fn adopt(promise2: &Future, inner: &Future, resolve_fn: &Function, reject_fn: &Function) {
    match inner.outcome() {
        Some(Outcome::Fulfilled(value)) => settle_with(resolve_fn, value),
        Some(Outcome::Rejected(reason)) => settle_with(reject_fn, reason),
        None => {
            let promise2 = promise2.clone();
            let (resolve_fn, reject_next) = (resolve_fn.clone(), reject_fn.clone());
            let on_fulfilled = Function::new(move |args| {
                resolve(&promise2, arg(args, 0), &resolve_fn, &reject_next);
                Ok(Value::Undefined)
            });
            inner.then(Some(on_fulfilled), Some(reject_fn.clone()));
        }
    }
}

/// Calls one of a future's own settle functions.
///
/// Those never throw; anything else is logged and dropped since there is no
/// future left to reject.
pub(crate) fn settle_with(settle: &Function, value: Value) {
    if let Err(error) = settle.call1(value) {
        tracing::debug!(%error, "settle function threw");
    }
}

/// One-shot gate shared by a thenable's two continuations.
#[derive(Clone, Default)]
struct Gate {
    closed: Rc<Cell<bool>>,
}

impl Gate {
    fn new() -> Self {
        Self::default()
    }

    /// Returns true for the first call only.
    fn claim(&self) -> bool {
        !self.closed.replace(true)
    }
}
