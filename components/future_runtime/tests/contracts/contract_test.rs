//! Contract tests for the future_runtime component
//!
//! These tests pin down the public surface: constructor signatures, the
//! state enum and the shape of the values futures produce.

use core_types::{Function, JsResult, Value};
use future_runtime::{
    Defer, Deferred, EventLoop, EventLoopConfig, Future, FutureState, MicroTask, RuntimeError,
    RuntimeResult, Scheduler, Task, TimerId,
};

mod event_loop_contract {
    use super::*;

    #[test]
    fn event_loop_new_returns_self() {
        let event_loop = EventLoop::new();
        let _: EventLoop = event_loop;
    }

    #[test]
    fn event_loop_enqueue_task_accepts_task() {
        let event_loop = EventLoop::new();
        let task = Task::new(|| Ok(Value::Undefined));
        event_loop.enqueue_task(task);
        assert!(!event_loop.is_task_queue_empty());
    }

    #[test]
    fn event_loop_enqueue_microtask_accepts_microtask() {
        let event_loop = EventLoop::new();
        event_loop.enqueue_microtask(MicroTask::new(|| {}));
        assert!(!event_loop.is_microtask_queue_empty());
    }

    #[test]
    fn event_loop_run_until_done_returns_runtime_result() {
        let event_loop = EventLoop::new();
        let result: RuntimeResult<()> = event_loop.run_until_done();
        assert!(result.is_ok());
    }

    #[test]
    fn event_loop_set_timeout_returns_distinct_ids() {
        let event_loop = EventLoop::new();
        let a: TimerId = event_loop.set_timeout(5, Task::new(|| Ok(Value::Undefined)));
        let b: TimerId = event_loop.set_timeout(5, Task::new(|| Ok(Value::Undefined)));
        assert_ne!(a, b);
    }

    #[test]
    fn event_loop_scheduler_is_a_defer_capability() {
        let event_loop = EventLoop::new();
        let scheduler: Scheduler = event_loop.scheduler();
        scheduler.defer(MicroTask::new(|| {}));
        assert!(!event_loop.is_microtask_queue_empty());
    }

    #[test]
    fn event_loop_config_defaults_to_unbounded() {
        assert_eq!(EventLoopConfig::default().job_budget(), None);
    }
}

mod future_contract {
    use super::*;

    fn scheduler() -> (EventLoop, Scheduler) {
        let event_loop = EventLoop::new();
        let scheduler = event_loop.scheduler();
        (event_loop, scheduler)
    }

    #[test]
    fn future_new_takes_executor_with_two_functions() {
        let (_el, s) = scheduler();
        let future = Future::new(&s, |resolve: Function, reject: Function| -> JsResult<()> {
            let _ = (resolve, reject);
            Ok(())
        });
        assert_eq!(future.state(), FutureState::Pending);
    }

    #[test]
    fn future_then_returns_future() {
        let (_el, s) = scheduler();
        let future = Future::resolve(&s, Value::Undefined);
        let chained: Future = future.then(None, None);
        assert!(!chained.ptr_eq(&future));
    }

    #[test]
    fn future_catch_and_finally_return_future() {
        let (_el, s) = scheduler();
        let future = Future::resolve(&s, Value::Undefined);
        let noop = Function::new(|_| Ok(Value::Undefined));
        let _: Future = future.catch(noop.clone());
        let _: Future = future.finally(noop);
    }

    #[test]
    fn future_result_is_none_while_pending() {
        let (_el, s) = scheduler();
        let d: Deferred = Future::deferred(&s);
        let result: Option<Value> = d.future.result();
        assert!(result.is_none());
    }

    #[test]
    fn future_to_value_is_an_object_typed_value() {
        let (_el, s) = scheduler();
        let value = Future::resolve(&s, Value::Undefined).to_value();
        assert_eq!(value.type_of(), "object");
        assert_eq!(value.to_string(), "[object Future]");
    }

    #[test]
    fn future_scheduler_is_the_one_it_was_built_with() {
        let (_el, s) = scheduler();
        let future = Future::resolve(&s, Value::Undefined);
        assert!(std::rc::Rc::ptr_eq(future.scheduler(), &s));
    }

    #[test]
    fn combinators_take_an_array_value() {
        let (_el, s) = scheduler();
        let input = Value::array(vec![]);
        let _: Future = Future::all(&s, input.clone());
        let _: Future = Future::race(&s, input.clone());
        let _: Future = Future::all_settled(&s, input.clone());
        let _: Future = Future::any(&s, input);
    }
}

mod future_state_contract {
    use super::*;

    #[test]
    fn future_state_has_pending_variant() {
        let state = FutureState::Pending;
        assert!(matches!(state, FutureState::Pending));
    }

    #[test]
    fn future_state_has_fulfilled_variant() {
        let state = FutureState::Fulfilled;
        assert!(matches!(state, FutureState::Fulfilled));
    }

    #[test]
    fn future_state_has_rejected_variant() {
        let state = FutureState::Rejected;
        assert!(matches!(state, FutureState::Rejected));
    }
}

mod runtime_error_contract {
    use super::*;

    #[test]
    fn uncaught_exception_displays_thrown_value() {
        let error = RuntimeError::UncaughtException(Value::from("boom"));
        assert_eq!(error.to_string(), "uncaught exception in task: boom");
    }

    #[test]
    fn budget_exhausted_displays_budget() {
        let error = RuntimeError::BudgetExhausted { budget: 10 };
        assert_eq!(error.to_string(), "event loop job budget of 10 exhausted");
    }
}
