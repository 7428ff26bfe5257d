//! Arena Snake - a tick-driven grid Snake game
//!
//! This library provides:
//! - Core game logic for single-player and two-player rounds (game module)
//! - Timer scheduling, clocks and best-score persistence (session module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - The interactive terminal loop (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
pub mod session;
