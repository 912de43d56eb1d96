//! Mutex-guarded job queue shared by all workers of a pool.
//!
//! [`JobQueue`] is a plain `VecDeque` behind a single [`parking_lot::Mutex`].
//! Every push and pop happens under that lock; nothing else is guarded by it.
//! The pop end is chosen once at construction through [`QueueOrder`]:
//!
//! - [`QueueOrder::Fifo`] (default): oldest job first.
//! - [`QueueOrder::Lifo`]: newest job first, which keeps recently submitted
//!   captures warm in cache at the cost of fairness.
//!
//! Idle workers do not spin on the lock. After a short backoff they park on
//! the queue's condition variable with a timeout; every push wakes one of
//! them and [`JobQueue::close`] wakes all of them.

use crate::core::BoxedJob;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// End of the queue that pops are taken from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOrder {
    /// First in, first out
    #[default]
    Fifo,
    /// Last in, first out
    Lifo,
}

/// Errors that can occur during queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Queue is closed; the rejected job is handed back
    #[error("queue is closed")]
    Closed(BoxedJob),
}

/// Result type for queue operations
pub type QueueResult<T> = std::result::Result<T, QueueError>;

struct Slots {
    jobs: VecDeque<BoxedJob>,
    closed: bool,
}

/// Unbounded, lock-protected container of pending jobs.
pub struct JobQueue {
    slots: Mutex<Slots>,
    // Mirrors `Slots::closed` for lock-free polling; written under the lock
    closed: AtomicBool,
    available: Condvar,
    order: QueueOrder,
}

impl JobQueue {
    /// Creates an empty queue popping from the given end.
    pub fn new(order: QueueOrder) -> Self {
        Self {
            slots: Mutex::new(Slots {
                jobs: VecDeque::new(),
                closed: false,
            }),
            closed: AtomicBool::new(false),
            available: Condvar::new(),
            order,
        }
    }

    /// Creates an empty first-in, first-out queue.
    pub fn fifo() -> Self {
        Self::new(QueueOrder::Fifo)
    }

    /// Creates an empty last-in, first-out queue.
    pub fn lifo() -> Self {
        Self::new(QueueOrder::Lifo)
    }

    /// Pop order of this queue.
    pub fn order(&self) -> QueueOrder {
        self.order
    }

    /// Appends a job and wakes one parked worker.
    ///
    /// Never blocks beyond the internal lock. Fails only once the queue has
    /// been closed, returning the job to the caller.
    pub fn push(&self, job: BoxedJob) -> QueueResult<()> {
        {
            let mut slots = self.slots.lock();
            if slots.closed {
                return Err(QueueError::Closed(job));
            }
            slots.jobs.push_back(job);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Removes one job if any is queued.
    pub fn try_pop(&self) -> Option<BoxedJob> {
        let mut slots = self.slots.lock();
        self.take(&mut slots)
    }

    /// Removes one job, parking up to `timeout` while the queue is empty.
    ///
    /// Returns `None` on timeout, or immediately once the queue is closed and
    /// empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<BoxedJob> {
        let mut slots = self.slots.lock();
        if slots.jobs.is_empty() && !slots.closed {
            self.available.wait_for(&mut slots, timeout);
        }
        self.take(&mut slots)
    }

    fn take(&self, slots: &mut Slots) -> Option<BoxedJob> {
        match self.order {
            QueueOrder::Fifo => slots.jobs.pop_front(),
            QueueOrder::Lifo => slots.jobs.pop_back(),
        }
    }

    /// Point-in-time emptiness check. Racy against concurrent push/pop.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().jobs.is_empty()
    }

    /// Point-in-time number of queued jobs.
    pub fn len(&self) -> usize {
        self.slots.lock().jobs.len()
    }

    /// Stops accepting jobs and wakes every parked worker.
    ///
    /// Jobs already queued stay queued until [`clear`](Self::clear).
    pub fn close(&self) {
        {
            let mut slots = self.slots.lock();
            slots.closed = true;
            self.closed.store(true, Ordering::Release);
        }
        self.available.notify_all();
    }

    /// Whether [`close`](Self::close) has been called.
    ///
    /// Does not take the queue lock.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Discards every queued job and returns how many were dropped.
    ///
    /// The jobs are dropped after the lock is released.
    pub fn clear(&self) -> usize {
        let discarded = std::mem::take(&mut self.slots.lock().jobs);
        discarded.len()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::fifo()
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("JobQueue")
            .field("order", &self.order)
            .field("len", &slots.jobs.len())
            .field("closed", &slots.closed)
            .finish()
    }
}
