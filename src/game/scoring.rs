//! Score, speed and level formulas

use super::config::{INITIAL_SPEED_MS, LEVEL_SCORE_STEP, MIN_SPEED_MS, SPEED_INCREMENT_MS};

/// Points for eating something worth `base` at `level`
pub fn score(base: u32, level: u32, double_score: bool) -> u32 {
    let multiplier = if double_score { 2 } else { 1 };
    base * level * multiplier
}

/// Movement tick interval in ms; smaller is faster
pub fn speed(level: u32, slow_motion: bool) -> u64 {
    let shaved = u64::from(level.saturating_sub(1)) * SPEED_INCREMENT_MS;
    let base = INITIAL_SPEED_MS.saturating_sub(shaved).max(MIN_SPEED_MS);
    if slow_motion {
        base * 2
    } else {
        base
    }
}

/// Level after a tick that ended with `score`. At most one level per tick.
pub fn next_level(score: u32, level: u32) -> u32 {
    if score >= level * LEVEL_SCORE_STEP {
        level + 1
    } else {
        level
    }
}
