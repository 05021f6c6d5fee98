//! Event loop implementation.
//!
//! This module provides the event loop that drives futures: it is the
//! [`Defer`] implementation futures schedule their deferred actions on, and
//! it hosts tasks and virtual-time timers for code that settles futures later.

use crate::error::{RuntimeError, RuntimeResult};
use crate::scheduler::{Defer, Scheduler};
use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId, TimerQueue};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Event loop configuration.
///
/// # Examples
///
/// ```
/// use future_runtime::EventLoopConfig;
///
/// let config = EventLoopConfig::default().with_job_budget(1_000);
/// assert_eq!(config.job_budget(), Some(1_000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLoopConfig {
    job_budget: Option<usize>,
}

impl EventLoopConfig {
    /// Creates the default configuration (no job budget).
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many jobs (tasks, timers and microtasks) a single
    /// `run_until_done` call may run before giving up.
    pub fn with_job_budget(mut self, budget: usize) -> Self {
        self.job_budget = Some(budget);
        self
    }

    /// Returns the configured job budget, if any.
    pub fn job_budget(&self) -> Option<usize> {
        self.job_budget
    }
}

#[derive(Debug, Default)]
struct LoopState {
    task_queue: RefCell<TaskQueue>,
    microtask_queue: RefCell<MicrotaskQueue>,
    timers: RefCell<TimerQueue>,
    clock: Cell<u64>,
    jobs_run: Cell<usize>,
    config: EventLoopConfig,
}

impl Defer for LoopState {
    fn defer(&self, job: MicroTask) {
        self.microtask_queue.borrow_mut().enqueue(job);
    }
}

/// The event loop.
///
/// Each iteration (turn) of the loop:
/// 1. Takes the oldest task from the task queue and executes it; if there is
///    none and no microtask is waiting, fires the earliest timer, advancing
///    the virtual clock to its due time
/// 2. Drains all microtasks, including ones queued while draining
/// 3. Repeats
///
/// `EventLoop` is a cheap handle: clones share the same queues, so tasks can
/// capture a clone to schedule more work.
///
/// # Examples
///
/// ```
/// use future_runtime::{EventLoop, Task};
/// use core_types::Value;
///
/// let event_loop = EventLoop::new();
///
/// event_loop.enqueue_task(Task::new(|| Ok(Value::Undefined)));
/// event_loop.run_until_done().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLoop {
    state: Rc<LoopState>,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues.
    pub fn new() -> Self {
        Self::with_config(EventLoopConfig::default())
    }

    /// Creates a new EventLoop with the given configuration.
    pub fn with_config(config: EventLoopConfig) -> Self {
        Self {
            state: Rc::new(LoopState {
                config,
                ..LoopState::default()
            }),
        }
    }

    /// Returns the [`Scheduler`] futures use to defer work onto this loop.
    pub fn scheduler(&self) -> Scheduler {
        self.state.clone()
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&self, task: Task) {
        self.state.task_queue.borrow_mut().enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.state.defer(microtask);
    }

    /// Runs `task` once the virtual clock has advanced by `delay_ms`.
    ///
    /// Timers with equal due times fire in registration order.
    pub fn set_timeout(&self, delay_ms: u64, task: Task) -> TimerId {
        let due = self.now().saturating_add(delay_ms);
        let id = self.state.timers.borrow_mut().schedule(due, task);
        tracing::trace!(?id, due, "timer scheduled");
        id
    }

    /// Returns the virtual clock, in milliseconds since the loop was created.
    pub fn now(&self) -> u64 {
        self.state.clock.get()
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.state.task_queue.borrow().is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.state.microtask_queue.borrow().is_empty()
    }

    /// Returns the number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.state.timers.borrow().len()
    }

    /// Returns true if there is nothing left to run.
    pub fn is_idle(&self) -> bool {
        self.is_task_queue_empty() && self.is_microtask_queue_empty() && self.pending_timers() == 0
    }

    /// Runs the event loop until all tasks, timers and microtasks are processed.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the loop is idle, or an error if a task threw or the
    /// configured job budget ran out.
    pub fn run_until_done(&self) -> RuntimeResult<()> {
        self.state.jobs_run.set(0);
        while !self.is_idle() {
            self.cycle()?;
        }
        Ok(())
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution will also be processed before
    /// this method returns.
    pub fn run_all_microtasks(&self) -> RuntimeResult<()> {
        self.state.jobs_run.set(0);
        self.drain_microtasks()
    }

    /// Processes one complete cycle: one task (or due timer) followed by all
    /// microtasks.
    pub fn process_one_cycle(&self) -> RuntimeResult<()> {
        self.state.jobs_run.set(0);
        self.cycle()
    }

    fn cycle(&self) -> RuntimeResult<()> {
        let task = self.state.task_queue.borrow_mut().dequeue();
        let task = match task {
            Some(task) => Some(task),
            None if self.is_microtask_queue_empty() => self.fire_next_timer(),
            None => None,
        };

        if let Some(task) = task {
            self.count_job()?;
            task.run().map_err(RuntimeError::UncaughtException)?;
        }

        self.drain_microtasks()
    }

    fn drain_microtasks(&self) -> RuntimeResult<()> {
        loop {
            // The queue borrow ends with this statement; the job may defer more work.
            let next = self.state.microtask_queue.borrow_mut().dequeue();
            match next {
                Some(microtask) => {
                    self.count_job()?;
                    microtask.run();
                }
                None => return Ok(()),
            }
        }
    }

    fn fire_next_timer(&self) -> Option<Task> {
        let (due, task) = self.state.timers.borrow_mut().pop_earliest()?;
        if due > self.state.clock.get() {
            self.state.clock.set(due);
        }
        tracing::trace!(now = due, "timer fired");
        Some(task)
    }

    fn count_job(&self) -> RuntimeResult<()> {
        let jobs = self.state.jobs_run.get() + 1;
        self.state.jobs_run.set(jobs);
        match self.state.config.job_budget() {
            Some(budget) if jobs > budget => {
                tracing::debug!(budget, "event loop job budget exhausted");
                Err(RuntimeError::BudgetExhausted { budget })
            }
            _ => Ok(()),
        }
    }
}
