//! Statistics shared by battle jobs
//!
//! Each statistic carries its own synchronization, separate from the pool's
//! queue lock, so recording a result never contends with job dispatch.

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Largest value recorded so far, behind its own lock
#[derive(Debug, Default)]
pub struct RunningMax {
    value: Mutex<Option<u32>>,
}

impl RunningMax {
    /// Create an empty maximum
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate. Returns `true` if it became the new maximum.
    pub fn record(&self, candidate: u32) -> bool {
        let mut value = self.value.lock();
        match *value {
            Some(current) if current >= candidate => false,
            _ => {
                *value = Some(candidate);
                true
            }
        }
    }

    /// Current maximum, `None` before the first record
    pub fn get(&self) -> Option<u32> {
        *self.value.lock()
    }
}

/// Count of finished jobs out of a known total
#[derive(Debug)]
pub struct ProgressCounter {
    completed: CachePadded<AtomicU64>,
    total: u64,
}

impl ProgressCounter {
    /// Create a counter expecting `total` completions
    pub fn new(total: u64) -> Self {
        Self {
            completed: CachePadded::new(AtomicU64::new(0)),
            total,
        }
    }

    /// Count one completion
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Release);
    }

    /// Completions so far
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Expected completions
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whole percent complete, `0..=100`. An empty total counts as done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let completed = self.completed().min(self.total) as u128;
        (completed * 100 / self.total as u128) as u8
    }

    /// Whether every expected completion has been counted
    pub fn is_complete(&self) -> bool {
        self.completed() >= self.total
    }
}

/// Aggregate of a whole simulation run
#[derive(Debug)]
pub struct BattleStats {
    max_turns: RunningMax,
    progress: Arc<ProgressCounter>,
}

impl BattleStats {
    /// Create stats for a run of `battles` battles
    pub fn new(battles: u64) -> Self {
        Self {
            max_turns: RunningMax::new(),
            progress: Arc::new(ProgressCounter::new(battles)),
        }
    }

    /// Record one finished battle
    pub fn record(&self, paralysis_turns: u32) {
        self.max_turns.record(paralysis_turns);
        self.progress.increment();
    }

    /// Highest paralysis turns seen so far
    pub fn max_turns(&self) -> Option<u32> {
        self.max_turns.get()
    }

    /// Progress counter, shareable with a reporter thread
    pub fn progress(&self) -> &Arc<ProgressCounter> {
        &self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_running_max_keeps_largest() {
        let max = RunningMax::new();
        assert_eq!(max.get(), None);

        assert!(max.record(5));
        assert!(!max.record(3));
        assert!(!max.record(5));
        assert!(max.record(9));
        assert_eq!(max.get(), Some(9));
    }

    #[test]
    fn test_running_max_zero_is_recorded() {
        let max = RunningMax::new();
        assert!(max.record(0));
        assert_eq!(max.get(), Some(0));
    }

    #[test]
    fn test_running_max_concurrent() {
        let max = Arc::new(RunningMax::new());
        let mut handles = vec![];

        for t in 0..8u32 {
            let max = Arc::clone(&max);
            handles.push(thread::spawn(move || {
                for i in 0..1000u32 {
                    max.record((i * 7 + t * 13) % 5000);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("recorder panicked");
        }

        let expected = (0..8u32)
            .flat_map(|t| (0..1000u32).map(move |i| (i * 7 + t * 13) % 5000))
            .max();
        assert_eq!(max.get(), expected);
    }

    #[test]
    fn test_progress_percent() {
        let progress = ProgressCounter::new(200);
        assert_eq!(progress.percent(), 0);

        for _ in 0..3 {
            progress.increment();
        }
        assert_eq!(progress.percent(), 1);

        for _ in 0..197 {
            progress.increment();
        }
        assert_eq!(progress.percent(), 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_empty_total() {
        let progress = ProgressCounter::new(0);
        assert_eq!(progress.percent(), 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_huge_total_does_not_overflow() {
        let progress = ProgressCounter::new(u64::MAX);
        progress.increment();
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_battle_stats_record() {
        let stats = BattleStats::new(3);
        stats.record(4);
        stats.record(12);
        stats.record(7);

        assert_eq!(stats.max_turns(), Some(12));
        assert_eq!(stats.progress().completed(), 3);
        assert!(stats.progress().is_complete());
    }
}
