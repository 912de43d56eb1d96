//! Basic worker pool usage
//!
//! Creates a pool, runs closures and battles on it, and prints statistics.
//!
//! Run with: cargo run --example basic_usage

use paralysis_pool::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Paralysis Pool - Basic Usage ===\n");

    let pool = ThreadPool::with_config(ThreadPoolConfig::new(4).with_rng_seed(2024))?;
    println!("1. Started pool with {} workers", pool.live_workers());

    println!("\n2. Submitting simple jobs:");
    for i in 0..5 {
        pool.execute(move || {
            println!("  Job {} executing on thread {:?}", i, thread::current().name());
            Ok(())
        })?;
    }
    pool.drain()?;

    println!("\n3. Running 100000 battles:");
    let stats = Arc::new(BattleStats::new(100_000));
    for _ in 0..100_000 {
        pool.submit(BattleJob::new(Arc::clone(&stats)))?;
    }
    pool.drain()?;
    println!(
        "   Highest Paralysis Turns: {}",
        stats.max_turns().unwrap_or(0)
    );

    println!("\n4. Per-worker statistics:");
    for (i, stat) in pool.get_stats().iter().enumerate() {
        println!(
            "   Worker {}: {} processed, {} failed, avg time: {:.2}μs",
            i,
            stat.get_jobs_processed(),
            stat.get_jobs_failed(),
            stat.get_average_processing_time_us()
        );
    }

    pool.shutdown()?;
    println!("\n5. Pool shut down, {} workers alive", pool.live_workers());
    Ok(())
}
