//! Per-worker pseudo-random generator
//!
//! Every worker thread owns one [`fastrand::Rng`]. It lives in thread-local
//! storage, is seeded once when the worker starts, and is never shared, so
//! job bodies can roll dice without any locking.

use std::cell::RefCell;

thread_local! {
    static WORKER_RNG: RefCell<fastrand::Rng> = RefCell::new(fastrand::Rng::new());
}

/// Reseed the calling thread's generator.
///
/// Workers call this once at spawn. A fixed seed makes the sequence of values
/// drawn on this thread reproducible.
pub fn seed_worker_rng(seed: u64) {
    WORKER_RNG.with(|rng| rng.borrow_mut().seed(seed));
}

/// Run `f` with the calling thread's generator.
///
/// On a pool worker this is the worker's private generator. Off the pool the
/// thread gets its own lazily-created, entropy-seeded generator.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f`.
pub fn with_worker_rng<R>(f: impl FnOnce(&mut fastrand::Rng) -> R) -> R {
    WORKER_RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Derive the seed for worker `worker_id` from a pool-wide base seed.
///
/// Mixes with the 64-bit golden ratio so neighbouring workers start far apart.
pub(crate) fn worker_seed(base: u64, worker_id: usize) -> u64 {
    base ^ (worker_id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
