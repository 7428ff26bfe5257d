use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::{Direction, PlayerId},
    config::{GameConfig, FOOD_POINTS, GRID_SIZE, OBSTACLE_MIN_DISTANCE, SPECIAL_FOOD_POINTS},
    scoring, spawn,
    state::{
        GameMode, GameState, GameStatus, Obstacle, PlayerSnake, Position, PowerUpType, Snake,
        SnakeColor,
    },
};

/// What a snake ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Left the grid
    Wall,
    /// Hit an obstacle
    Obstacle,
    /// Hit the other player's body
    Rival,
}

/// Information about a movement tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether any snake ate something this tick
    pub ate_food: bool,
    /// Whether any snake gained a level
    pub leveled_up: bool,
    /// Power-up activated this tick, if any
    pub power_up: Option<PowerUpType>,
    /// What ended a single-player game
    pub collision_type: Option<CollisionType>,
    /// Players that died this tick
    pub eliminated: Vec<PlayerId>,
}

/// Result of a movement tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Whether the game is over
    pub terminated: bool,
    /// Whether the movement interval changed
    pub speed_changed: bool,
    pub info: StepInfo,
}

/// Which pools a head landed on, judged against the pre-tick board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Pickups {
    pub food: bool,
    pub special: bool,
    pub power_up: bool,
}

impl Pickups {
    pub(super) fn at(
        head: Position,
        foods: &[Position],
        special_food: Option<Position>,
        power_ups: &[Position],
    ) -> Self {
        Self {
            food: foods.contains(&head),
            special: special_food == Some(head),
            power_up: power_ups.contains(&head),
        }
    }

    fn any(&self) -> bool {
        self.food || self.special || self.power_up
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Consumption {
    pub points: u32,
    pub ate: bool,
    pub power_up: Option<PowerUpType>,
}

pub(super) fn center() -> Position {
    Position::new(GRID_SIZE / 2, GRID_SIZE / 2)
}

/// Wall and obstacle check shared by both resolvers
pub(super) fn blocked_at(head: Position, obstacles: &[Obstacle]) -> Option<CollisionType> {
    if !head.is_in_bounds() {
        Some(CollisionType::Wall)
    } else if obstacles.iter().any(|o| o.position == head) {
        Some(CollisionType::Obstacle)
    } else {
        None
    }
}

/// Recompute the movement interval from level and slow motion
pub(super) fn refresh_speed(state: &mut GameState) -> bool {
    let level = match state.mode {
        GameMode::Single => state.level,
        GameMode::Multi => state.players.iter().map(|p| p.level).max().unwrap_or(1),
    };
    let speed = scoring::speed(level, state.has_power_up(PowerUpType::SlowMotion));
    let changed = speed != state.speed_ms;
    state.speed_ms = speed;
    changed
}

/// The game engine: every state transition goes through here
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine with a reproducible random sequence
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Idle state shown behind the menu
    pub fn new_game(&mut self) -> GameState {
        let mut state = GameState::new(Snake::new(center(), Direction::Right), GameStatus::Menu);
        self.place_food(&mut state);
        state
    }

    /// Fresh state for a new game; nothing carries over from a previous one
    pub fn start(&mut self, mode: GameMode, now_ms: u64) -> GameState {
        let mut state = match mode {
            GameMode::Single => GameState::new(
                Snake::new(center(), Direction::Right),
                GameStatus::Playing,
            ),
            GameMode::Multi => GameState::new_multi(
                vec![
                    PlayerSnake::new(
                        PlayerId::Player1,
                        Position::new(8, 10),
                        Direction::Right,
                        SnakeColor::Green,
                    ),
                    PlayerSnake::new(
                        PlayerId::Player2,
                        Position::new(12, 10),
                        Direction::Left,
                        SnakeColor::Pink,
                    ),
                ],
                GameStatus::Playing,
            ),
        };

        self.place_food(&mut state);
        let exclude = state.occupied_cells();
        state.obstacles =
            spawn::generate_obstacles(&mut self.rng, &self.config, state.level, &exclude, now_ms);

        info!("Started {:?} game", mode);
        state
    }

    fn place_food(&mut self, state: &mut GameState) -> Option<Position> {
        let pos = spawn::random_free_position(&mut self.rng, &state.occupied_cells())?;
        state.foods.push(pos);
        Some(pos)
    }

    /// Steer the single-player snake
    pub fn steer(&self, state: &mut GameState, direction: Direction) -> bool {
        if !state.is_playing() || state.mode != GameMode::Single {
            return false;
        }
        state.snake.steer(direction)
    }

    /// Steer one living snake of a two-player round
    pub fn steer_player(&self, state: &mut GameState, id: PlayerId, direction: Direction) -> bool {
        if !state.is_playing() || state.mode != GameMode::Multi {
            return false;
        }
        match state.player_mut(id) {
            Some(player) if player.is_alive => player.snake.steer(direction),
            _ => false,
        }
    }

    /// Flip between playing and paused; anything else is left alone
    pub fn toggle_pause(&self, state: &mut GameState) -> bool {
        state.status = match state.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            _ => return false,
        };
        info!("Game {:?}", state.status);
        true
    }

    pub fn go_to_menu(&self, state: &mut GameState) {
        state.status = GameStatus::Menu;
        state.power_up_active = None;
        state.power_up_timer_ms = 0;
        refresh_speed(state);
        info!("Back to menu");
    }

    pub(super) fn end_game(&self, state: &mut GameState) {
        state.status = GameStatus::GameOver;
        state.power_up_active = None;
        state.power_up_timer_ms = 0;
        info!("Game over with score {}", state.score);
    }

    /// Execute one movement tick
    pub fn step(&mut self, state: &mut GameState, now_ms: u64) -> StepResult {
        if !state.is_playing() {
            return StepResult {
                terminated: state.status == GameStatus::GameOver,
                ..Default::default()
            };
        }

        let speed_before = state.speed_ms;
        let mut result = match state.mode {
            GameMode::Single => self.step_single(state, now_ms),
            GameMode::Multi => self.step_multi(state, now_ms),
        };
        result.speed_changed = state.speed_ms != speed_before;
        result
    }

    /// Resolve what a head just landed on. The new head must already be on the body.
    pub(super) fn consume(
        &mut self,
        state: &mut GameState,
        head: Position,
        pickups: Pickups,
        level: u32,
    ) -> Consumption {
        let double_score = state.has_power_up(PowerUpType::DoubleScore);
        let mut consumption = Consumption {
            ate: pickups.any(),
            ..Default::default()
        };

        if pickups.food {
            if let Some(index) = state.foods.iter().position(|f| *f == head) {
                state.foods.remove(index);
            }
            consumption.points += scoring::score(FOOD_POINTS, level, double_score);
            self.maybe_drop_special_food(state);
            self.maybe_drop_power_up(state);
        }

        if pickups.special {
            consumption.points += scoring::score(SPECIAL_FOOD_POINTS, level, double_score);
            if state.special_food == Some(head) {
                state.special_food = None;
            }
        }

        if pickups.power_up {
            if let Some(index) = state.power_ups.iter().position(|p| *p == head) {
                state.power_ups.remove(index);
            }
            let kind = PowerUpType::ALL[self.rng.gen_range(0..PowerUpType::ALL.len())];
            self.activate_power_up(state, kind);
            consumption.power_up = Some(kind);
        }

        consumption
    }

    fn maybe_drop_special_food(&mut self, state: &mut GameState) {
        if state.special_food.is_some() || !self.rng.gen_bool(self.config.special_food_chance) {
            return;
        }
        state.special_food = spawn::random_free_position(&mut self.rng, &state.occupied_cells());
        debug!("Special food dropped at {:?}", state.special_food);
    }

    fn maybe_drop_power_up(&mut self, state: &mut GameState) {
        if !state.power_ups.is_empty() || !self.rng.gen_bool(self.config.power_up_chance) {
            return;
        }
        if let Some(pos) = spawn::random_free_position(&mut self.rng, &state.occupied_cells()) {
            state.power_ups.push(pos);
            debug!("Power-up dropped at {:?}", pos);
        }
    }

    /// Obstacle that comes with a level-up, kept clear of the new head
    pub(super) fn spawn_level_obstacle(
        &mut self,
        state: &mut GameState,
        head: Position,
        now_ms: u64,
    ) {
        let exclude = state.occupied_cells();
        match spawn::spawn_obstacle_away_from(
            &mut self.rng,
            &self.config,
            head,
            OBSTACLE_MIN_DISTANCE,
            &exclude,
            now_ms,
        ) {
            Some(obstacle) => state.obstacles.push(obstacle),
            None => debug!("No room for a level-up obstacle"),
        }
    }

    /// Replace whatever power-up is running with `kind` and restart its countdown
    pub fn activate_power_up(&self, state: &mut GameState, kind: PowerUpType) {
        state.power_up_active = Some(kind);
        state.power_up_timer_ms = self.config.power_up_duration_ms;
        refresh_speed(state);
        info!("Power-up activated: {}", kind.label());
    }

    pub fn expire_power_up(&self, state: &mut GameState) -> Option<PowerUpType> {
        let expired = state.power_up_active.take();
        state.power_up_timer_ms = 0;
        refresh_speed(state);
        if let Some(kind) = expired {
            info!("Power-up expired: {}", kind.label());
        }
        expired
    }

    /// Periodic food refill
    pub fn replenish_food(&mut self, state: &mut GameState) -> Option<Position> {
        if !state.is_playing() {
            return None;
        }
        let pos = self.place_food(state);
        debug!("Food refill at {:?}", pos);
        pos
    }

    /// Periodic obstacle clone near the active snake
    pub fn spawn_obstacle(&mut self, state: &mut GameState, now_ms: u64) -> Option<Position> {
        if !state.is_playing() {
            return None;
        }
        let reference = match state.mode {
            GameMode::Single => state.snake.body.front().copied(),
            GameMode::Multi => state.alive_players().next().map(|p| p.snake.head()),
        }
        .unwrap_or_else(center);

        let exclude = state.occupied_cells();
        let obstacle = spawn::spawn_obstacle_away_from(
            &mut self.rng,
            &self.config,
            reference,
            OBSTACLE_MIN_DISTANCE,
            &exclude,
            now_ms,
        );
        match obstacle {
            Some(obstacle) => {
                state.obstacles.push(obstacle);
                debug!(
                    "Obstacle at {:?} for {} ms",
                    obstacle.position, obstacle.lifespan_ms
                );
                Some(obstacle.position)
            }
            None => {
                debug!("Obstacle spawn skipped, no cell far enough from {:?}", reference);
                None
            }
        }
    }

    /// Drop obstacles that have outlived their lifespan
    pub fn sweep_obstacles(&self, state: &mut GameState, now_ms: u64) -> usize {
        if !state.is_playing() {
            return 0;
        }
        let before = state.obstacles.len();
        state.obstacles.retain(|o| !o.is_expired(now_ms));
        let removed = before - state.obstacles.len();
        if removed > 0 {
            debug!("Swept {} expired obstacles", removed);
        }
        removed
    }
}
