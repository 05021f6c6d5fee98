//! Promises/A+ conformance scenarios
//!
//! Grouped by the clause of the Promises/A+ text each block exercises:
//! states (2.1), the `then` method (2.2) and the resolution procedure (2.3).

use core_types::{arg, Function, JsObject, PlainObject, Value};
use future_runtime::{Future, FutureState, Task};
use integration_tests::Adapter;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn counter() -> (Rc<Cell<u32>>, Function) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let f = Function::new(move |_| {
        c.set(c.get() + 1);
        Ok(Value::Undefined)
    });
    (count, f)
}

fn thenable_with<F>(then: F) -> Value
where
    F: Fn(Function, Function) -> core_types::JsResult<Value> + 'static,
{
    PlainObject::new()
        .with(
            "then",
            Function::new(move |args| {
                let on_resolve = Function::from_value(&arg(args, 0)).unwrap();
                let on_reject = Function::from_value(&arg(args, 1)).unwrap();
                then(on_resolve, on_reject)
            }),
        )
        .into_value()
}

mod states {
    use super::*;

    #[test]
    fn fulfilled_future_cannot_become_rejected() {
        let adapter = Adapter::new();
        let d = adapter.deferred();
        let (fulfilled, on_fulfilled) = counter();
        let (rejected, on_rejected) = counter();
        d.future.then(Some(on_fulfilled), Some(on_rejected));

        d.resolve.call1(Value::Undefined).unwrap();
        adapter.settle_all();
        d.reject.call1(Value::Undefined).unwrap();
        adapter.settle_all();

        assert_eq!(d.future.state(), FutureState::Fulfilled);
        assert_eq!((fulfilled.get(), rejected.get()), (1, 0));
    }

    #[test]
    fn rejected_future_cannot_become_fulfilled() {
        let adapter = Adapter::new();
        let d = adapter.deferred();
        let (fulfilled, on_fulfilled) = counter();
        let (rejected, on_rejected) = counter();
        d.future.then(Some(on_fulfilled), Some(on_rejected));

        d.reject.call1(Value::Undefined).unwrap();
        d.resolve.call1(Value::Undefined).unwrap();
        adapter.settle_all();

        assert_eq!(d.future.state(), FutureState::Rejected);
        assert_eq!((fulfilled.get(), rejected.get()), (0, 1));
    }

    #[test]
    fn settled_value_keeps_identity() {
        let adapter = Adapter::new();
        let obj = PlainObject::new().with("n", 1).into_value();
        let future = adapter.resolved(obj.clone());
        let seen = Rc::new(RefCell::new(Value::Undefined));
        let s = seen.clone();
        future.then(
            Some(Function::new(move |args| {
                *s.borrow_mut() = arg(args, 0);
                Ok(Value::Undefined)
            })),
            None,
        );
        adapter.settle_all();
        assert_eq!(*seen.borrow(), obj);
    }
}

mod then_method {
    use super::*;

    #[test]
    fn non_function_arguments_are_ignored_through_value_members() {
        let adapter = Adapter::new();
        let future = adapter.rejected(Value::from("r"));
        let then = future.to_value().as_object().unwrap().get("then").unwrap();
        let then = Function::from_value(&then).unwrap();
        let derived = then
            .call(&future.to_value(), &[Value::Smi(5), Value::Null])
            .unwrap();
        adapter.settle_all();

        let derived = Future::from_value(&derived).unwrap();
        assert_eq!(derived.state(), FutureState::Rejected);
        assert_eq!(derived.result(), Some(Value::from("r")));
    }

    #[test]
    fn handler_is_not_called_before_settlement() {
        let adapter = Adapter::new();
        let d = adapter.deferred();
        let (count, handler) = counter();
        d.future.then(Some(handler), None);

        let resolve = d.resolve.clone();
        adapter
            .event_loop()
            .set_timeout(50, Task::new(move || resolve.call1(Value::Smi(1))));

        adapter.event_loop().run_all_microtasks().unwrap();
        assert_eq!(count.get(), 0);

        adapter.event_loop().process_one_cycle().unwrap();
        assert_eq!(adapter.event_loop().now(), 50);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn handler_called_at_most_once_despite_repeated_settles() {
        let adapter = Adapter::new();
        let d = adapter.deferred();
        let (count, handler) = counter();
        d.future.then(Some(handler), None);
        for n in 0..5 {
            d.resolve.call1(Value::Smi(n)).unwrap();
        }
        adapter.settle_all();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn handlers_attached_later_still_fire_in_order() {
        let adapter = Adapter::new();
        let future = adapter.resolved(Value::Smi(1));
        adapter.settle_all();

        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let o = order.clone();
            future.then(
                Some(Function::new(move |_| {
                    o.borrow_mut().push(tag);
                    Ok(Value::Undefined)
                })),
                None,
            );
        }
        assert!(order.borrow().is_empty());
        adapter.settle_all();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn handler_runs_with_empty_stack_even_inside_another_handler() {
        let adapter = Adapter::new();
        let outer = adapter.resolved(Value::Undefined);
        let inner = adapter.resolved(Value::Undefined);
        adapter.settle_all();

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        outer.then(
            Some(Function::new(move |_| {
                let l2 = l.clone();
                inner.then(
                    Some(Function::new(move |_| {
                        l2.borrow_mut().push("inner");
                        Ok(Value::Undefined)
                    })),
                    None,
                );
                l.borrow_mut().push("outer done");
                Ok(Value::Undefined)
            })),
            None,
        );
        adapter.settle_all();
        assert_eq!(*log.borrow(), vec!["outer done", "inner"]);
    }

    #[test]
    fn rejection_skips_fulfillment_handlers_until_caught() {
        let adapter = Adapter::new();
        let (skipped, skip) = counter();
        let recovered = adapter
            .rejected(Value::from("oops"))
            .then(Some(skip.clone()), None)
            .then(Some(skip), None)
            .catch(Function::new(|args| {
                Ok(Value::from(format!("recovered from {}", arg(args, 0))))
            }));
        adapter.settle_all();
        assert_eq!(skipped.get(), 0);
        assert_eq!(recovered.result(), Some(Value::from("recovered from oops")));
    }
}

mod resolution_procedure {
    use super::*;

    fn resolve_via_handler(adapter: &Adapter, x: Value) -> Future {
        let derived = adapter
            .resolved(Value::Undefined)
            .then(Some(Function::new(move |_| Ok(x.clone()))), None);
        adapter.settle_all();
        derived
    }

    #[test]
    fn thenable_then_is_retrieved_exactly_once() {
        let adapter = Adapter::new();
        let reads = Rc::new(Cell::new(0));
        let x = {
            let reads = reads.clone();
            PlainObject::new()
                .with_getter(
                    "then",
                    Function::new(move |_| {
                        reads.set(reads.get() + 1);
                        Ok(Function::new(|args| {
                            Function::from_value(&arg(args, 0))
                                .unwrap()
                                .call1(Value::Smi(3))
                        })
                        .to_value())
                    }),
                )
                .into_value()
        };
        let derived = resolve_via_handler(&adapter, x);
        assert_eq!(reads.get(), 1);
        assert_eq!(derived.result(), Some(Value::Smi(3)));
    }

    #[test]
    fn first_of_resolve_reject_and_throw_wins() {
        let adapter = Adapter::new();
        let x = thenable_with(|on_resolve, on_reject| {
            on_reject.call1(Value::from("rejected first"))?;
            on_resolve.call1(Value::Smi(1))?;
            Err(Value::from("thrown last"))
        });
        let derived = resolve_via_handler(&adapter, x);
        assert_eq!(derived.state(), FutureState::Rejected);
        assert_eq!(derived.result(), Some(Value::from("rejected first")));
    }

    #[test]
    fn thenable_fulfilled_with_future_adopts_it() {
        let adapter = Adapter::new();
        let d = adapter.deferred();
        let inner = d.future.to_value();
        let x = thenable_with(move |on_resolve, _| on_resolve.call1(inner.clone()));
        let derived = resolve_via_handler(&adapter, x);
        assert_eq!(derived.state(), FutureState::Pending);

        d.resolve.call1(Value::from("eventually")).unwrap();
        adapter.settle_all();
        assert_eq!(derived.result(), Some(Value::from("eventually")));
    }

    #[test]
    fn cycle_through_handler_rejects_with_type_error() {
        let adapter = Adapter::new();
        let slot: Rc<RefCell<Option<Future>>> = Rc::new(RefCell::new(None));
        let handler = {
            let slot = slot.clone();
            Function::new(move |_| {
                Ok(slot
                    .borrow()
                    .as_ref()
                    .map(Future::to_value)
                    .unwrap_or(Value::Undefined))
            })
        };
        let derived = adapter.resolved(Value::Undefined).then(Some(handler), None);
        *slot.borrow_mut() = Some(derived.clone());
        adapter.settle_all();

        assert_eq!(derived.state(), FutureState::Rejected);
        let reason = derived.result().unwrap();
        assert_eq!(reason.to_string(), "TypeError: Chaining cycle detected for promise");
    }

    #[test]
    fn primitives_fulfill_directly() {
        let adapter = Adapter::new();
        for x in [
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            Value::Smi(0),
            Value::Double(1.5),
            Value::from(""),
        ] {
            let derived = resolve_via_handler(&adapter, x.clone());
            assert_eq!(derived.result(), Some(x));
        }
    }
}
