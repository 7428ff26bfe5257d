use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction, GameMode, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Map a key press to a command. Steering keys depend on the mode being played.
    pub fn handle_key_event(&self, key: KeyEvent, mode: GameMode) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        if let Some(command) = Self::steering(key.code, mode) {
            return KeyAction::Command(command);
        }

        match key.code {
            KeyCode::Char(' ') => KeyAction::Command(Command::TogglePause),
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                KeyAction::Command(Command::Restart)
            }
            KeyCode::Char('1') => KeyAction::Command(Command::Start(GameMode::Single)),
            KeyCode::Char('2') => KeyAction::Command(Command::Start(GameMode::Multi)),
            KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('M') => {
                KeyAction::Command(Command::Menu)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }

    fn steering(code: KeyCode, mode: GameMode) -> Option<Command> {
        let (arrows, wasd) = (arrow_direction(code), wasd_direction(code));
        match mode {
            GameMode::Single => arrows.or(wasd).map(Command::Steer),
            GameMode::Multi => wasd
                .map(|d| Command::SteerPlayer(PlayerId::Player1, d))
                .or_else(|| arrows.map(|d| Command::SteerPlayer(PlayerId::Player2, d))),
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn arrow_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

fn wasd_direction(code: KeyCode) -> Option<Direction> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'w' => Some(Direction::Up),
        'a' => Some(Direction::Left),
        's' => Some(Direction::Down),
        'd' => Some(Direction::Right),
        _ => None,
    }
}
