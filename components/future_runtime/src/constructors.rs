//! Convenience constructors.

use crate::future::Future;
use crate::scheduler::Scheduler;
use core_types::{Function, JsError, JsObject, JsResult, Value};

/// A future together with its externally exposed settle functions.
///
/// Used by code that has to settle a future from outside an executor,
/// such as conformance harnesses.
#[derive(Debug, Clone)]
pub struct Deferred {
    /// The future settled by `resolve` and `reject`
    pub future: Future,
    /// Fulfills `future` with its first argument
    pub resolve: Function,
    /// Rejects `future` with its first argument
    pub reject: Function,
}

impl Future {
    /// Returns a future for `value`.
    ///
    /// - A future is returned unchanged.
    /// - An object with a `then` member is adapted one level: the new future's
    ///   settle functions are handed straight to `value.then`. A `then` member
    ///   that is not callable rejects the new future with a `TypeError`.
    /// - Anything else yields a future fulfilled with `value`.
    pub fn resolve(scheduler: &Scheduler, value: Value) -> Future {
        if let Some(future) = Future::from_value(&value) {
            return future;
        }

        let thenable = match &value {
            Value::Object(obj) if obj.has("then") => Some(obj.clone()),
            _ => None,
        };
        match thenable {
            Some(obj) => Future::new(scheduler, move |resolve, reject| {
                let then = obj.get("then")?;
                let then = Function::from_value(&then)
                    .ok_or_else(|| JsError::type_error("then is not a function"))?;
                then.call(&value, &[resolve.to_value(), reject.to_value()])?;
                Ok(())
            }),
            None => Future::new(scheduler, move |resolve, _| {
                resolve.call1(value)?;
                Ok(())
            }),
        }
    }

    /// Returns a future rejected with `reason`.
    pub fn reject(scheduler: &Scheduler, reason: Value) -> Future {
        Future::new(scheduler, move |_, reject| {
            reject.call1(reason)?;
            Ok(())
        })
    }

    /// Returns a pending future along with its settle functions.
    pub fn deferred(scheduler: &Scheduler) -> Deferred {
        let future = Future::pending(scheduler);
        let (resolve, reject) = future.settle_functions();
        Deferred {
            future,
            resolve,
            reject,
        }
    }

    /// Runs `f` synchronously and wraps its outcome in a future.
    ///
    /// `Ok(value)` behaves like [`Future::resolve`]; `Err(reason)` yields a
    /// rejected future.
    pub fn try_call<F>(scheduler: &Scheduler, f: F) -> Future
    where
        F: FnOnce() -> JsResult<Value>,
    {
        match f() {
            Ok(value) => Future::resolve(scheduler, value),
            Err(reason) => Future::reject(scheduler, reason),
        }
    }
}
