//! Spawn policy: where new food, power-ups and obstacles may appear

use std::collections::HashSet;

use rand::Rng;

use super::config::{GameConfig, GRID_SIZE, MAX_WAVE_OBSTACLES, SPAWN_ATTEMPTS};
use super::state::{Obstacle, Position};

fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
}

/// Sample the grid until a cell outside `exclude` turns up.
///
/// Returns `None` only when every cell is excluded.
pub fn random_free_position<R: Rng + ?Sized>(
    rng: &mut R,
    exclude: &HashSet<Position>,
) -> Option<Position> {
    let blocked = exclude.iter().filter(|p| p.is_in_bounds()).count();
    if blocked >= (GRID_SIZE * GRID_SIZE) as usize {
        return None;
    }

    loop {
        let pos = random_position(rng);
        if !exclude.contains(&pos) {
            return Some(pos);
        }
    }
}

/// Draw how long a new obstacle lives
pub fn draw_lifespan<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig) -> u64 {
    rng.gen_range(config.obstacle_lifespan_min_ms..=config.obstacle_lifespan_max_ms)
}

/// Place one obstacle at least `min_distance` (Manhattan) from `reference`.
///
/// Gives up after `SPAWN_ATTEMPTS` samples; the caller simply goes without.
pub fn spawn_obstacle_away_from<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GameConfig,
    reference: Position,
    min_distance: i32,
    exclude: &HashSet<Position>,
    now_ms: u64,
) -> Option<Obstacle> {
    for _ in 0..SPAWN_ATTEMPTS {
        let pos = random_position(rng);
        if pos.manhattan_distance(reference) >= min_distance && !exclude.contains(&pos) {
            let lifespan = draw_lifespan(rng, config);
            return Some(Obstacle::new(pos, now_ms, lifespan));
        }
    }
    None
}

/// Wave generator: `min(level / 3, 8)` obstacles on distinct free cells
pub fn generate_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GameConfig,
    level: u32,
    exclude: &HashSet<Position>,
    now_ms: u64,
) -> Vec<Obstacle> {
    let count = (level / 3).min(MAX_WAVE_OBSTACLES);
    let mut taken = exclude.clone();
    let mut obstacles = Vec::new();

    for _ in 0..count {
        let Some(pos) = random_free_position(rng, &taken) else {
            break;
        };
        taken.insert(pos);
        let lifespan = draw_lifespan(rng, config);
        obstacles.push(Obstacle::new(pos, now_ms, lifespan));
    }

    obstacles
}
