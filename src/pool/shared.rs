//! State shared between a pool handle and its workers

use crate::queue::JobQueue;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Everything a worker thread needs from its pool.
#[derive(Debug)]
pub(crate) struct PoolShared {
    pub(crate) queue: JobQueue,
    pub(crate) completion: Completion,
    live_workers: AtomicUsize,
}

impl PoolShared {
    pub(crate) fn new(queue: JobQueue) -> Self {
        Self {
            queue,
            completion: Completion::default(),
            live_workers: AtomicUsize::new(0),
        }
    }

    pub(crate) fn worker_started(&self) {
        self.live_workers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn worker_stopped(&self) {
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::Acquire)
    }
}

/// Point-in-time view of the completion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionSnapshot {
    /// Jobs accepted by `submit`
    pub submitted: u64,
    /// Jobs a worker finished running, successfully or not
    pub finished: u64,
    /// Jobs discarded from the queue by shutdown
    pub abandoned: u64,
}

impl CompletionSnapshot {
    /// Accepted jobs that are queued or running right now.
    pub fn outstanding(&self) -> u64 {
        self.submitted - self.finished - self.abandoned
    }
}

/// Submitted/finished counters with a condition variable signalled whenever
/// every accepted job is accounted for.
///
/// Guarded by its own lock so that completion bookkeeping never contends with
/// queue membership.
#[derive(Debug, Default)]
pub(crate) struct Completion {
    counts: Mutex<CompletionSnapshot>,
    settled: Condvar,
}

impl Completion {
    /// Record a job about to be queued. Must precede the push so a fast worker
    /// can never finish a job that was not yet counted.
    pub(crate) fn accept(&self) {
        self.counts.lock().submitted += 1;
    }

    /// Undo [`accept`](Self::accept) for a job the queue refused.
    pub(crate) fn withdraw(&self) {
        let mut counts = self.counts.lock();
        counts.submitted -= 1;
        self.notify_if_settled(&counts);
    }

    pub(crate) fn finish(&self) {
        let mut counts = self.counts.lock();
        counts.finished += 1;
        self.notify_if_settled(&counts);
    }

    pub(crate) fn abandon(&self, jobs: u64) {
        let mut counts = self.counts.lock();
        counts.abandoned += jobs;
        self.notify_if_settled(&counts);
    }

    fn notify_if_settled(&self, counts: &CompletionSnapshot) {
        if counts.outstanding() == 0 {
            self.settled.notify_all();
        }
    }

    /// Block until no accepted job is queued or running.
    pub(crate) fn wait(&self) -> CompletionSnapshot {
        let mut counts = self.counts.lock();
        while counts.outstanding() > 0 {
            self.settled.wait(&mut counts);
        }
        *counts
    }

    pub(crate) fn snapshot(&self) -> CompletionSnapshot {
        *self.counts.lock()
    }
}
