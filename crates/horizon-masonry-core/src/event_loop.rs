//! Cooperative deferred-task event loop.
//!
//! The event loop owns a queue of one-shot tasks, each due at some point on
//! the loop's clock. Tasks are executed in due-time order; tasks due at the
//! same instant run in the order they were scheduled.
//!
//! The clock is virtual: it only moves when the host calls
//! [`EventLoop::advance`] or [`EventLoop::run_until_idle`]. A host that wants
//! wall-clock behaviour advances the loop by the real elapsed time on every
//! frame or tick; tests advance it by exact amounts.
//!
//! # Example
//!
//! ```
//! use horizon_masonry_core::EventLoop;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::new();
//! let fired = Arc::new(AtomicBool::new(false));
//!
//! let fired_clone = fired.clone();
//! event_loop.schedule(Duration::from_millis(20), move || {
//!     fired_clone.store(true, Ordering::SeqCst);
//! });
//!
//! event_loop.advance(Duration::from_millis(19));
//! assert!(!fired.load(Ordering::SeqCst));
//! event_loop.advance(Duration::from_millis(1));
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{LoopError, Result};

new_key_type! {
    /// A unique identifier for a deferred task.
    pub struct TaskId;
}

/// A boxed task closure.
type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// Internal task data.
struct TaskData {
    /// When this task becomes due, on the loop clock.
    due: Duration,
    /// The task closure to execute.
    task: BoxedTask,
}

/// An entry in the loop queue (min-heap by due time, then sequence).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TaskId,
    due: Duration,
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct LoopState {
    /// Current position of the virtual clock.
    now: Duration,
    /// All tasks that have not run or been cancelled.
    tasks: SlotMap<TaskId, TaskData>,
    /// Priority queue of pending executions. May hold stale entries for
    /// cancelled tasks; those are skipped when popped.
    queue: BinaryHeap<QueueEntry>,
    /// Tie-breaker so equal due times keep FIFO order.
    next_seq: u64,
}

impl LoopState {
    /// Pop the next live task due at or before `limit`.
    fn pop_due(&mut self, limit: Duration) -> Option<(TaskId, BoxedTask)> {
        while let Some(entry) = self.queue.peek().copied() {
            if entry.due > limit {
                return None;
            }
            self.queue.pop();

            let Some(data) = self.tasks.remove(entry.id) else {
                continue;
            };
            if data.due > self.now {
                self.now = data.due;
            }
            return Some((entry.id, data.task));
        }
        None
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.tasks.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

/// A cloneable handle to a deferred-task event loop.
///
/// All clones share the same queue and clock. Tasks run with the queue
/// unlocked, so a task may schedule or cancel other tasks.
#[derive(Clone)]
pub struct EventLoop {
    inner: Arc<Mutex<LoopState>>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("EventLoop")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl EventLoop {
    /// Create an event loop with its clock at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoopState {
                now: Duration::ZERO,
                tasks: SlotMap::with_key(),
                queue: BinaryHeap::new(),
                next_seq: 0,
            })),
        }
    }

    /// The current position of the loop clock.
    pub fn now(&self) -> Duration {
        self.inner.lock().now
    }

    /// Post a task that is due immediately.
    ///
    /// It runs on the next [`run_pending`](Self::run_pending) or `advance`,
    /// after every task already due.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(Duration::ZERO, task)
    }

    /// Schedule a one-shot task to run `delay` after the current clock.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.lock();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;

        let id = state.tasks.insert(TaskData {
            due,
            task: Box::new(task),
        });
        state.queue.push(QueueEntry { id, due, seq });
        tracing::trace!(target: "horizon_masonry_core::event_loop", ?id, ?due, "scheduled task");
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns an error if the task already ran, was cancelled, or never
    /// existed.
    pub fn cancel(&self, id: TaskId) -> Result<()> {
        if self.inner.lock().tasks.remove(id).is_some() {
            tracing::trace!(target: "horizon_masonry_core::event_loop", ?id, "cancelled task");
            Ok(())
        } else {
            Err(LoopError::UnknownTask.into())
        }
    }

    /// Check if a task is still waiting to run.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.lock().tasks.contains_key(id)
    }

    /// Get the number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    /// Get the duration until the next task is due, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        let mut state = self.inner.lock();
        state.discard_stale();
        let now = state.now;
        state
            .queue
            .peek()
            .map(|entry| entry.due.saturating_sub(now))
    }

    /// Move the clock forward by `by`, running every task that becomes due.
    ///
    /// Tasks scheduled by running tasks are also run if they fall due within
    /// the window. Returns the number of tasks executed.
    #[tracing::instrument(skip(self), target = "horizon_masonry_core::event_loop", level = "trace")]
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut executed = 0;

        loop {
            let next = self.inner.lock().pop_due(target);
            let Some((id, task)) = next else {
                break;
            };
            tracing::trace!(target: "horizon_masonry_core::event_loop", ?id, "executing task");
            task();
            executed += 1;
        }

        let mut state = self.inner.lock();
        if state.now < target {
            state.now = target;
        }
        executed
    }

    /// Run every task that is already due without moving the clock.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Run tasks, jumping the clock forward, until the queue is empty.
    ///
    /// Returns the number of tasks executed. A task that reschedules itself
    /// forever keeps this from returning.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while let Some(wait) = self.time_until_next() {
            executed += self.advance(wait);
        }
        executed
    }
}

static_assertions::assert_impl_all!(EventLoop: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> BoxedTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |name: &'static str| -> BoxedTask {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_tasks_run_in_due_order() {
        let event_loop = EventLoop::new();
        let (log, task) = recorder();

        event_loop.schedule(Duration::from_millis(30), task("c"));
        event_loop.schedule(Duration::from_millis(10), task("a"));
        event_loop.schedule(Duration::from_millis(20), task("b"));

        assert_eq!(event_loop.advance(Duration::from_millis(30)), 3);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(event_loop.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_equal_due_times_are_fifo() {
        let event_loop = EventLoop::new();
        let (log, task) = recorder();

        for name in ["1", "2", "3", "4", "5"] {
            event_loop.post(task(name));
        }

        event_loop.run_pending();
        assert_eq!(*log.lock(), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_advance_stops_at_window() {
        let event_loop = EventLoop::new();
        let (log, task) = recorder();

        event_loop.schedule(Duration::from_millis(5), task("early"));
        event_loop.schedule(Duration::from_millis(50), task("late"));

        event_loop.advance(Duration::from_millis(10));
        assert_eq!(*log.lock(), vec!["early"]);
        assert_eq!(event_loop.pending_count(), 1);
        assert_eq!(event_loop.time_until_next(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_cancel() {
        let event_loop = EventLoop::new();
        let (log, task) = recorder();

        let id = event_loop.schedule(Duration::from_millis(5), task("cancelled"));
        event_loop.schedule(Duration::from_millis(5), task("kept"));

        assert!(event_loop.is_pending(id));
        assert!(event_loop.cancel(id).is_ok());
        assert!(!event_loop.is_pending(id));
        assert_eq!(
            event_loop.cancel(id),
            Err(crate::CoreError::Loop(LoopError::UnknownTask))
        );

        event_loop.run_until_idle();
        assert_eq!(*log.lock(), vec!["kept"]);
    }

    #[test]
    fn test_task_can_schedule_more_work() {
        let event_loop = EventLoop::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let loop_clone = event_loop.clone();
        let log_clone = log.clone();
        event_loop.schedule(Duration::from_millis(10), move || {
            log_clone.lock().push(loop_clone.now());
            let log_inner = log_clone.clone();
            let loop_inner = loop_clone.clone();
            loop_clone.post(move || log_inner.lock().push(loop_inner.now()));
        });

        assert_eq!(event_loop.run_until_idle(), 2);
        assert_eq!(
            *log.lock(),
            vec![Duration::from_millis(10), Duration::from_millis(10)]
        );
    }

    #[test]
    fn test_clock_moves_to_task_due_time() {
        let event_loop = EventLoop::new();
        let seen = Arc::new(Mutex::new(None));

        let loop_clone = event_loop.clone();
        let seen_clone = seen.clone();
        event_loop.schedule(Duration::from_millis(7), move || {
            *seen_clone.lock() = Some(loop_clone.now());
        });

        event_loop.advance(Duration::from_millis(100));
        assert_eq!(*seen.lock(), Some(Duration::from_millis(7)));
        assert_eq!(event_loop.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_run_until_idle_on_empty_loop() {
        let event_loop = EventLoop::new();
        assert_eq!(event_loop.run_until_idle(), 0);
        assert_eq!(event_loop.time_until_next(), None);
    }
}
