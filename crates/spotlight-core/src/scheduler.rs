#![forbid(unsafe_code)]

//! The scheduling port.
//!
//! Every timer, poll, and animation frame the tour engine needs goes through
//! a [`Scheduler`] supplied by the host. The host's implementation is expected
//! to run tasks on its single UI thread; nothing here is `Send`.
//!
//! # Invariants
//!
//! 1. A task runs at most once.
//! 2. A cancelled task never runs; cancelling an unknown or already-run task is
//!    a no-op that returns `false`.
//! 3. Tasks due at the same instant run in scheduling order.
//!
//! With the `test-helpers` feature, [`ManualScheduler`] provides a virtual
//! clock that tests advance explicitly.

use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Identifier of a scheduled task, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One-shot, cancelable timers on the host's event loop.
pub trait Scheduler {
    /// Monotonic time since an arbitrary, fixed epoch.
    fn now(&self) -> Duration;

    /// Run `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancel a pending task. Returns `true` if it was still pending.
    fn cancel(&self, id: TaskId) -> bool;

    /// Run `task` on the next turn of the event loop.
    fn post(&self, task: Task) -> TaskId {
        self.schedule(Duration::ZERO, task)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use manual::ManualScheduler;

#[cfg(any(test, feature = "test-helpers"))]
mod manual {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::{Scheduler, Task, TaskId};

    #[derive(Default)]
    struct ManualState {
        now: Duration,
        next_id: u64,
        queue: BTreeMap<(Duration, u64), Task>,
        fired: u64,
    }

    /// Virtual-time scheduler for deterministic tests.
    ///
    /// Time only moves when [`advance`](Self::advance) is called. Tasks that
    /// fall due during an advance run in due-time order, with the clock set to
    /// each task's due time while it runs, so tasks that reschedule themselves
    /// observe consistent elapsed time.
    #[derive(Default)]
    pub struct ManualScheduler {
        state: RefCell<ManualState>,
    }

    impl std::fmt::Debug for ManualScheduler {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let state = self.state.borrow();
            f.debug_struct("ManualScheduler")
                .field("now", &state.now)
                .field("pending", &state.queue.len())
                .field("fired", &state.fired)
                .finish()
        }
    }

    impl ManualScheduler {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Advance virtual time by `dt`, running every task that falls due.
        pub fn advance(&self, dt: Duration) {
            let target = self.state.borrow().now.saturating_add(dt);
            self.advance_to(target);
        }

        /// Advance virtual time to `target` (no-op if already past it).
        pub fn advance_to(&self, target: Duration) {
            loop {
                let next = {
                    let mut state = self.state.borrow_mut();
                    let due = state
                        .queue
                        .keys()
                        .next()
                        .copied()
                        .filter(|(due, _)| *due <= target);
                    due.and_then(|key| {
                        let task = state.queue.remove(&key)?;
                        state.now = state.now.max(key.0);
                        state.fired += 1;
                        Some(task)
                    })
                };
                match next {
                    Some(task) => task(),
                    None => break,
                }
            }
            let mut state = self.state.borrow_mut();
            state.now = state.now.max(target);
        }

        /// Run tasks that are due right now without moving the clock.
        pub fn run_due(&self) {
            self.advance(Duration::ZERO);
        }

        /// Number of tasks still waiting to run.
        #[must_use]
        pub fn pending(&self) -> usize {
            self.state.borrow().queue.len()
        }

        /// Whether no task is waiting.
        #[must_use]
        pub fn is_idle(&self) -> bool {
            self.pending() == 0
        }

        /// Total number of tasks that have run.
        #[must_use]
        pub fn fired(&self) -> u64 {
            self.state.borrow().fired
        }
    }

    impl Scheduler for ManualScheduler {
        fn now(&self) -> Duration {
            self.state.borrow().now
        }

        fn schedule(&self, delay: Duration, task: Task) -> TaskId {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let due = state.now.saturating_add(delay);
            state.queue.insert((due, id), task);
            TaskId::new(id)
        }

        fn cancel(&self, id: TaskId) -> bool {
            let mut state = self.state.borrow_mut();
            let key = state.queue.keys().find(|(_, raw)| *raw == id.get()).copied();
            key.and_then(|key| state.queue.remove(&key)).is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |label: &'static str| -> Task {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(30), task("late"));
        scheduler.schedule(Duration::from_millis(10), task("early"));
        scheduler.schedule(Duration::from_millis(10), task("early-second"));

        scheduler.advance(Duration::from_millis(9));
        assert!(log.borrow().is_empty());

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(34));
        assert_eq!(scheduler.fired(), 3);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let id = scheduler.schedule(Duration::from_millis(5), task("cancelled"));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.advance(Duration::from_millis(10));
        assert!(log.borrow().is_empty());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn posted_tasks_run_without_advancing_time() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.post(task("posted"));
        scheduler.run_due();
        assert_eq!(*log.borrow(), vec!["posted"]);
        assert_eq!(scheduler.now(), Duration::ZERO);
    }

    #[test]
    fn rescheduling_task_sees_its_due_time() {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        fn tick(scheduler: Rc<ManualScheduler>, seen: Rc<RefCell<Vec<Duration>>>, left: u32) {
            seen.borrow_mut().push(scheduler.now());
            if left > 0 {
                let next = Rc::clone(&scheduler);
                scheduler.schedule(
                    Duration::from_millis(40),
                    Box::new(move || tick(next, seen, left - 1)),
                );
            }
        }

        let (s, v) = (Rc::clone(&scheduler), Rc::clone(&seen));
        scheduler.schedule(Duration::from_millis(40), Box::new(move || tick(s, v, 2)));
        scheduler.advance(Duration::from_millis(1000));

        let expected: Vec<Duration> = [40, 80, 120].map(Duration::from_millis).to_vec();
        assert_eq!(*seen.borrow(), expected);
    }
}
