//! Core simulation for the grid Snake game
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Timing is passed in explicitly and randomness comes from the engine's RNG, so
//! every transition can be driven deterministically from tests.

pub mod action;
pub mod config;
pub mod engine;
mod multi;
pub mod scoring;
mod single;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction, PlayerId};
pub use config::{GameConfig, GRID_SIZE};
pub use engine::{CollisionType, GameEngine, StepInfo, StepResult};
pub use state::{
    GameMode, GameState, GameStatus, Obstacle, PlayerSnake, Position, PowerUpType, Snake,
    SnakeColor,
};
