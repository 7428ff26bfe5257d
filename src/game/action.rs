use serde::{Deserialize, Serialize};

use super::state::GameMode;

/// Direction a snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[cfg(test)]
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The direction pointing the other way
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Identity of a snake in a two-player round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerId::Player1 => "player1",
            PlayerId::Player2 => "player2",
        }
    }
}

/// Everything the outside world can ask the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Steer the single-player snake
    Steer(Direction),
    /// Steer one snake of a two-player round
    SteerPlayer(PlayerId, Direction),
    /// Pause while playing, resume while paused
    TogglePause,
    /// Discard the current game and start a fresh one
    Start(GameMode),
    /// Start again in the current mode (from menu or game over)
    Restart,
    /// Back to the menu screen
    Menu,
}
