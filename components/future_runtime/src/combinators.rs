//! Fan-in combinators over arrays of futures.
//!
//! Every combinator takes a `Value::Array` whose elements are coerced with
//! [`Future::resolve`], and is built only on `then`. Any other input rejects
//! the returned future with a `TypeError`.

use crate::future::Future;
use crate::scheduler::Scheduler;
use core_types::{arg, Function, JsError, PlainObject, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn iterable(input: &Value) -> Result<Rc<Vec<Value>>, JsError> {
    match input {
        Value::Array(items) => Ok(Rc::clone(items)),
        _ => Err(JsError::type_error("argument is not iterable")),
    }
}

/// Per-combinator bookkeeping: a slot per input and a countdown.
struct Collector {
    slots: RefCell<Vec<Value>>,
    remaining: Cell<usize>,
}

impl Collector {
    fn new(len: usize) -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(vec![Value::Undefined; len]),
            remaining: Cell::new(len),
        })
    }

    /// Stores `value` at `index`; returns every slot once all are filled.
    fn record(&self, index: usize, value: Value) -> Option<Vec<Value>> {
        self.slots.borrow_mut()[index] = value;
        let remaining = self.remaining.get() - 1;
        self.remaining.set(remaining);
        (remaining == 0).then(|| self.slots.borrow().clone())
    }
}

fn outcome_record(status: &str, key: &str, value: Value) -> Value {
    PlainObject::new()
        .with("status", status)
        .with(key, value)
        .into_value()
}

impl Future {
    /// Fulfills with every input's value, in input order, once all inputs
    /// fulfill. Rejects with the first rejection.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use future_runtime::{EventLoop, Future};
    ///
    /// let event_loop = EventLoop::new();
    /// let s = event_loop.scheduler();
    /// let all = Future::all(
    ///     &s,
    ///     Value::array(vec![Value::Smi(1), Future::resolve(&s, Value::Smi(2)).to_value()]),
    /// );
    /// event_loop.run_until_done().unwrap();
    /// assert_eq!(all.result(), Some(Value::array(vec![Value::Smi(1), Value::Smi(2)])));
    /// ```
    pub fn all(scheduler: &Scheduler, input: Value) -> Future {
        Future::new(scheduler, |resolve, reject| {
            let items = iterable(&input)?;
            if items.is_empty() {
                resolve.call1(Value::array(Vec::new()))?;
                return Ok(());
            }

            let collector = Collector::new(items.len());
            for (index, item) in items.iter().enumerate() {
                let collector = collector.clone();
                let resolve = resolve.clone();
                let on_fulfilled = Function::new(move |args| {
                    if let Some(values) = collector.record(index, arg(args, 0)) {
                        resolve.call1(Value::array(values))?;
                    }
                    Ok(Value::Undefined)
                });
                Future::resolve(scheduler, item.clone()).then(Some(on_fulfilled), Some(reject.clone()));
            }
            Ok(())
        })
    }

    /// Settles like whichever input settles first.
    ///
    /// An empty array never settles.
    pub fn race(scheduler: &Scheduler, input: Value) -> Future {
        Future::new(scheduler, |resolve, reject| {
            for item in iterable(&input)?.iter() {
                Future::resolve(scheduler, item.clone()).then(Some(resolve.clone()), Some(reject.clone()));
            }
            Ok(())
        })
    }

    /// Fulfills, once every input has settled, with one outcome record per
    /// input: `{status: "fulfilled", value}` or `{status: "rejected", reason}`.
    pub fn all_settled(scheduler: &Scheduler, input: Value) -> Future {
        Future::new(scheduler, |resolve, _reject| {
            let items = iterable(&input)?;
            if items.is_empty() {
                resolve.call1(Value::array(Vec::new()))?;
                return Ok(());
            }

            let collector = Collector::new(items.len());
            for (index, item) in items.iter().enumerate() {
                let on_fulfilled = {
                    let collector = collector.clone();
                    let resolve = resolve.clone();
                    Function::new(move |args| {
                        let record = outcome_record("fulfilled", "value", arg(args, 0));
                        if let Some(records) = collector.record(index, record) {
                            resolve.call1(Value::array(records))?;
                        }
                        Ok(Value::Undefined)
                    })
                };
                let on_rejected = {
                    let collector = collector.clone();
                    let resolve = resolve.clone();
                    Function::new(move |args| {
                        let record = outcome_record("rejected", "reason", arg(args, 0));
                        if let Some(records) = collector.record(index, record) {
                            resolve.call1(Value::array(records))?;
                        }
                        Ok(Value::Undefined)
                    })
                };
                Future::resolve(scheduler, item.clone()).then(Some(on_fulfilled), Some(on_rejected));
            }
            Ok(())
        })
    }

    /// Fulfills with the first fulfillment. Rejects with an `AggregateError`
    /// listing every reason, in input order, once all inputs reject.
    ///
    /// An empty array rejects immediately with an empty `AggregateError`.
    pub fn any(scheduler: &Scheduler, input: Value) -> Future {
        Future::new(scheduler, |resolve, reject| {
            let items = iterable(&input)?;
            if items.is_empty() {
                return Err(JsError::aggregate(Vec::new(), "All promises were rejected").into());
            }

            let collector = Collector::new(items.len());
            for (index, item) in items.iter().enumerate() {
                let collector = collector.clone();
                let reject = reject.clone();
                let on_rejected = Function::new(move |args| {
                    if let Some(reasons) = collector.record(index, arg(args, 0)) {
                        reject.call1(JsError::aggregate(reasons, "All promises were rejected").into())?;
                    }
                    Ok(Value::Undefined)
                });
                Future::resolve(scheduler, item.clone()).then(Some(resolve.clone()), Some(on_rejected));
            }
            Ok(())
        })
    }
}
