use serde::{Deserialize, Serialize};

/// Side length of the square playing field
pub const GRID_SIZE: i32 = 20;

/// Tick interval at level 1 (ms)
pub const INITIAL_SPEED_MS: u64 = 150;
/// Tick interval shaved off per level (ms)
pub const SPEED_INCREMENT_MS: u64 = 10;
/// Fastest possible tick interval (ms)
pub const MIN_SPEED_MS: u64 = 50;

/// A snake levels up when its score reaches `level * LEVEL_SCORE_STEP`
pub const LEVEL_SCORE_STEP: u32 = 100;

/// Base points for a plain food
pub const FOOD_POINTS: u32 = 10;
/// Base points for the special food
pub const SPECIAL_FOOD_POINTS: u32 = 50;

/// Minimum Manhattan distance between a snake head and a freshly cloned obstacle
pub const OBSTACLE_MIN_DISTANCE: i32 = 7;
/// Sampling budget for the away-from-head obstacle spawn
pub const SPAWN_ATTEMPTS: usize = 100;
/// Cap for the wave obstacle generator
pub const MAX_WAVE_OBSTACLES: u32 = 8;

/// Timer cadences and spawn probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// A new plain food appears this often (ms)
    pub food_interval_ms: u64,
    /// An obstacle is cloned near the snake this often (ms)
    pub obstacle_spawn_interval_ms: u64,
    /// Expired obstacles are swept this often (ms)
    pub obstacle_sweep_interval_ms: u64,
    /// How long an activated power-up lasts (ms)
    pub power_up_duration_ms: u64,
    /// Shortest obstacle lifespan (ms)
    pub obstacle_lifespan_min_ms: u64,
    /// Longest obstacle lifespan (ms)
    pub obstacle_lifespan_max_ms: u64,
    /// Chance that eating a plain food drops the special food
    pub special_food_chance: f64,
    /// Chance that eating a plain food drops a power-up
    pub power_up_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            food_interval_ms: 1000,
            obstacle_spawn_interval_ms: 3000,
            obstacle_sweep_interval_ms: 500,
            power_up_duration_ms: 20_000,
            obstacle_lifespan_min_ms: 4000,
            obstacle_lifespan_max_ms: 9000,
            special_food_chance: 0.2,
            power_up_chance: 0.15,
        }
    }
}

impl GameConfig {
    /// Config with every random drop switched off
    pub fn without_drops() -> Self {
        Self {
            special_food_chance: 0.0,
            power_up_chance: 0.0,
            ..Default::default()
        }
    }

    /// Check that every value is usable by the engine and scheduler
    pub fn validate(&self) -> Result<(), String> {
        let intervals = [
            ("food_interval_ms", self.food_interval_ms),
            ("obstacle_spawn_interval_ms", self.obstacle_spawn_interval_ms),
            ("obstacle_sweep_interval_ms", self.obstacle_sweep_interval_ms),
            ("power_up_duration_ms", self.power_up_duration_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(format!("{} must be positive, got 0", name));
            }
        }

        if self.obstacle_lifespan_min_ms > self.obstacle_lifespan_max_ms {
            return Err(format!(
                "obstacle lifespan range is inverted: {}..{}",
                self.obstacle_lifespan_min_ms, self.obstacle_lifespan_max_ms
            ));
        }

        let chances = [
            ("special_food_chance", self.special_food_chance),
            ("power_up_chance", self.power_up_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }

        Ok(())
    }
}
