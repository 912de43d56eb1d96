//! Paralysis battle: the per-job computation
//!
//! A battle gives the attacker [`SAFE_TURNS`] status turns before it is forced
//! to self-destruct. Every turn a four-sided die is rolled; a
//! [`PARALYSIS_ROLL`] means paralysis triggered and the turn does not use up a
//! safe turn. The result of a battle is the number of paralysed turns.

use crate::core::{with_worker_rng, Job, Result};
use crate::simulation::aggregate::BattleStats;
use std::sync::Arc;

/// Status turns available before the forced self-destruct
pub const SAFE_TURNS: u32 = 55;

/// Faces on the paralysis die
pub const DIE_FACES: u32 = 4;

/// Die face that triggers paralysis
pub const PARALYSIS_ROLL: u32 = 4;

/// Roll the paralysis die, `1..=DIE_FACES`.
#[inline]
pub fn roll_die(rng: &mut fastrand::Rng) -> u32 {
    rng.u32(1..=DIE_FACES)
}

/// Count paralysed turns for a battle driven by `roll`.
///
/// Rolls until every safe turn is spent and returns how many extra turns
/// paralysis added.
pub fn count_paralysis_turns(mut roll: impl FnMut() -> u32) -> u32 {
    let mut safe_turns = SAFE_TURNS;
    let mut total_turns = 0u32;
    while safe_turns > 0 {
        if roll() != PARALYSIS_ROLL {
            safe_turns -= 1;
        }
        total_turns += 1;
    }
    total_turns - SAFE_TURNS
}

/// Run one battle with dice from `rng`.
pub fn simulate_battle(rng: &mut fastrand::Rng) -> u32 {
    count_paralysis_turns(|| roll_die(rng))
}

/// One battle, recorded into shared [`BattleStats`]
///
/// Rolls with the executing worker's private RNG.
#[derive(Debug, Clone)]
pub struct BattleJob {
    stats: Arc<BattleStats>,
}

impl BattleJob {
    /// Create a battle that reports into `stats`
    pub fn new(stats: Arc<BattleStats>) -> Self {
        Self { stats }
    }
}

impl Job for BattleJob {
    fn execute(&mut self) -> Result<()> {
        let turns = with_worker_rng(simulate_battle);
        self.stats.record(turns);
        Ok(())
    }

    fn job_type(&self) -> &str {
        "BattleJob"
    }
}
