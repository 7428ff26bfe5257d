//! Deadline table for the game's timed jobs

use std::collections::BTreeMap;

/// A timed job. Jobs due at the same moment run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Job {
    /// Advance the snakes
    Move,
    /// Add one plain food
    FoodRefill,
    /// Clone an obstacle near the snake
    ObstacleSpawn,
    /// Remove expired obstacles
    ObstacleSweep,
    /// End the active power-up
    PowerUpExpiry,
}

/// At most one pending deadline per job; re-arming replaces it
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    deadlines: BTreeMap<Job, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, job: Job, at_ms: u64) {
        self.deadlines.insert(job, at_ms);
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn deadline(&self, job: Job) -> Option<u64> {
        self.deadlines.get(&job).copied()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.values().min().copied()
    }

    /// Take the earliest job due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(Job, u64)> {
        let (job, at) = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .min_by_key(|(job, at)| (**at, **job))
            .map(|(job, at)| (*job, *at))?;
        self.deadlines.remove(&job);
        Some((job, at))
    }
}
