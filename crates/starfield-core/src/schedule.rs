//! Host timer facility for guard windows
//!
//! The selection controller never sleeps or registers callbacks. It arms
//! tasks on a [`Scheduler`] and is told which ones fired when the host
//! advances time. Cancelled or fired handles never fire again.

use std::time::Duration;

/// Opaque handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    /// Arm a task that fires once `delay` has elapsed
    fn schedule(&mut self, delay: Duration) -> TaskHandle;

    /// Disarm a pending task. Returns false if it already fired or was
    /// cancelled.
    fn cancel(&mut self, handle: TaskHandle) -> bool;

    /// Advance the clock and return the tasks that came due, earliest first
    fn advance(&mut self, elapsed: Duration) -> Vec<TaskHandle>;

    fn is_pending(&self, handle: TaskHandle) -> bool;
}

/// Deadline queue advanced by the per-frame tick
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TaskHandle)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, delay: Duration) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.pending.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, h)| *h != handle);
        self.pending.len() != before
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<TaskHandle> {
        self.now += elapsed;
        let now = self.now;

        let mut due: Vec<(Duration, TaskHandle)> = Vec::new();
        self.pending.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });

        due.sort();
        due.into_iter().map(|(_, handle)| handle).collect()
    }

    fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|(_, h)| *h == handle)
    }
}
