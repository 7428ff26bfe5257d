//! Session orchestration
//!
//! A [`Session`] exclusively owns the one [`GameState`] of a running game and
//! is the only place that decides when the engine's jobs run. Commands and
//! timer fires are applied one at a time, so no job ever sees another job's
//! half-finished update.

pub mod clock;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use scheduler::{Job, Scheduler};
pub use store::BestScoreStore;

use log::warn;
use rand::rngs::StdRng;
use rand::Rng;

use crate::game::{Command, GameEngine, GameMode, GameState, GameStatus};

pub struct Session<C: Clock = MonotonicClock, R: Rng = StdRng> {
    engine: GameEngine<R>,
    state: GameState,
    scheduler: Scheduler,
    clock: C,
    store: BestScoreStore,
}

impl<C: Clock, R: Rng> Session<C, R> {
    /// New session sitting at the menu
    pub fn new(mut engine: GameEngine<R>, clock: C, store: BestScoreStore) -> Self {
        let state = engine.new_game();
        Self {
            engine,
            state,
            scheduler: Scheduler::new(),
            clock,
            store,
        }
    }

    /// Read-only snapshot for renderers
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn best_score(&self) -> u32 {
        self.store.best()
    }

    /// Whether the new-record effect should be showing
    pub fn celebrating(&self) -> bool {
        self.state.status == GameStatus::GameOver && self.state.score >= self.store.best()
    }

    /// When the next timed job is due, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Apply an input. Jobs already due run first.
    pub fn dispatch(&mut self, command: Command) {
        let now = self.clock.now_ms();
        self.run_due(now);

        match command {
            Command::Steer(direction) => {
                self.engine.steer(&mut self.state, direction);
            }
            Command::SteerPlayer(id, direction) => {
                self.engine.steer_player(&mut self.state, id, direction);
            }
            Command::TogglePause => {
                if self.engine.toggle_pause(&mut self.state) {
                    if self.state.is_playing() {
                        self.arm_all(now);
                    } else {
                        self.suspend(now);
                    }
                }
            }
            Command::Start(mode) => {
                if self.between_games() {
                    self.start(mode, now);
                }
            }
            Command::Restart => {
                if self.between_games() {
                    self.start(self.state.mode, now);
                }
            }
            Command::Menu => {
                self.scheduler.cancel_all();
                self.engine.go_to_menu(&mut self.state);
            }
        }
    }

    /// Run every job that is due by now. Returns how many fired.
    pub fn update(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.run_due(now)
    }

    fn run_due(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some((job, at)) = self.scheduler.pop_due(now_ms) {
            self.fire(job, at);
            fired += 1;
        }
        self.sync_power_up_timer(now_ms);
        fired
    }

    fn fire(&mut self, job: Job, at: u64) {
        let config = self.engine.config().clone();
        match job {
            Job::Move => {
                let result = self.engine.step(&mut self.state, at);
                if result.terminated {
                    self.finish();
                    return;
                }
                self.scheduler.arm(Job::Move, at + self.state.speed_ms);
                if result.info.power_up.is_some() {
                    self.scheduler
                        .arm(Job::PowerUpExpiry, at + config.power_up_duration_ms);
                }
            }
            Job::FoodRefill => {
                self.engine.replenish_food(&mut self.state);
                self.scheduler
                    .arm(Job::FoodRefill, at + config.food_interval_ms);
            }
            Job::ObstacleSpawn => {
                self.engine.spawn_obstacle(&mut self.state, at);
                self.scheduler
                    .arm(Job::ObstacleSpawn, at + config.obstacle_spawn_interval_ms);
            }
            Job::ObstacleSweep => {
                self.engine.sweep_obstacles(&mut self.state, at);
                self.scheduler
                    .arm(Job::ObstacleSweep, at + config.obstacle_sweep_interval_ms);
            }
            Job::PowerUpExpiry => {
                let speed_before = self.state.speed_ms;
                self.engine.expire_power_up(&mut self.state);
                if self.state.speed_ms != speed_before {
                    self.scheduler.arm(Job::Move, at + self.state.speed_ms);
                }
            }
        }
    }

    /// New games may only begin from the menu or the game-over screen
    fn between_games(&self) -> bool {
        matches!(self.state.status, GameStatus::Menu | GameStatus::GameOver)
    }

    fn start(&mut self, mode: GameMode, now_ms: u64) {
        self.scheduler.cancel_all();
        self.state = self.engine.start(mode, now_ms);
        self.arm_all(now_ms);
    }

    /// Arm every timer from scratch, resuming a frozen power-up countdown
    fn arm_all(&mut self, now_ms: u64) {
        let config = self.engine.config().clone();
        self.scheduler.cancel_all();
        self.scheduler.arm(Job::Move, now_ms + self.state.speed_ms);
        self.scheduler
            .arm(Job::FoodRefill, now_ms + config.food_interval_ms);
        self.scheduler
            .arm(Job::ObstacleSpawn, now_ms + config.obstacle_spawn_interval_ms);
        self.scheduler
            .arm(Job::ObstacleSweep, now_ms + config.obstacle_sweep_interval_ms);
        if self.state.power_up_active.is_some() {
            self.scheduler
                .arm(Job::PowerUpExpiry, now_ms + self.state.power_up_timer_ms);
        }
    }

    fn suspend(&mut self, now_ms: u64) {
        self.sync_power_up_timer(now_ms);
        self.scheduler.cancel_all();
    }

    fn sync_power_up_timer(&mut self, now_ms: u64) {
        if let Some(deadline) = self.scheduler.deadline(Job::PowerUpExpiry) {
            self.state.power_up_timer_ms = deadline.saturating_sub(now_ms);
        }
    }

    fn finish(&mut self) {
        self.scheduler.cancel_all();
        if let Err(e) = self.store.submit(self.state.score) {
            warn!("Could not save best score: {:#}", e);
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
