use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::action::{Direction, PlayerId};
use super::config::{GRID_SIZE, INITIAL_SPEED_MS};

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Toroidal wraparound onto the grid
    pub fn wrapped(&self) -> Self {
        Self {
            x: self.x.rem_euclid(GRID_SIZE),
            y: self.y.rem_euclid(GRID_SIZE),
        }
    }

    pub fn is_in_bounds(&self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    pub fn manhattan_distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// A snake: body segments with the head at the front.
///
/// `direction` is the heading used by the last move; `next_direction` is the
/// heading the next move will take. Steering is judged against `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    pub body: VecDeque<Position>,
    pub direction: Direction,
    pub next_direction: Direction,
}

impl Snake {
    /// Create a one-segment snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            direction,
            next_direction: direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Request a new heading. Reversing onto the current heading is ignored.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    /// Commit the requested heading and return the cell the head moves to
    pub fn next_head(&mut self) -> Position {
        self.direction = self.next_direction;
        self.head().moved_in_direction(self.direction)
    }

    /// First half of a move: the new head joins the body
    pub fn grow(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Second half of a move when nothing was eaten
    pub fn trim_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakeColor {
    Green,
    Pink,
}

/// One contestant in a two-player round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnake {
    pub id: PlayerId,
    pub snake: Snake,
    pub score: u32,
    pub level: u32,
    pub is_alive: bool,
    pub color: SnakeColor,
}

impl PlayerSnake {
    pub fn new(id: PlayerId, head: Position, direction: Direction, color: SnakeColor) -> Self {
        Self {
            id,
            snake: Snake::new(head, direction),
            score: 0,
            level: 1,
            is_alive: true,
            color,
        }
    }
}

/// An obstacle with the lifespan it was given when it appeared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Position,
    pub created_at_ms: u64,
    pub lifespan_ms: u64,
}

impl Obstacle {
    pub fn new(position: Position, created_at_ms: u64, lifespan_ms: u64) -> Self {
        Self {
            position,
            created_at_ms,
            lifespan_ms,
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.lifespan_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpType {
    SlowMotion,
    Invincible,
    DoubleScore,
    PhaseThrough,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 4] = [
        PowerUpType::SlowMotion,
        PowerUpType::Invincible,
        PowerUpType::DoubleScore,
        PowerUpType::PhaseThrough,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpType::SlowMotion => "Slow motion",
            PowerUpType::Invincible => "Invincible",
            PowerUpType::DoubleScore => "Double score",
            PowerUpType::PhaseThrough => "Phase through",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub status: GameStatus,
    /// Single-player snake (empty body in two-player rounds)
    pub snake: Snake,
    /// Single-player score, or the last survivor's score once a round ends
    pub score: u32,
    pub level: u32,
    pub players: Vec<PlayerSnake>,
    pub foods: Vec<Position>,
    pub special_food: Option<Position>,
    pub power_ups: Vec<Position>,
    pub obstacles: Vec<Obstacle>,
    /// Current movement tick interval (ms)
    pub speed_ms: u64,
    pub power_up_active: Option<PowerUpType>,
    /// Remaining power-up time (ms)
    pub power_up_timer_ms: u64,
}

impl GameState {
    /// Blank single-player state in the given status
    pub fn new(snake: Snake, status: GameStatus) -> Self {
        Self {
            mode: GameMode::Single,
            status,
            snake,
            score: 0,
            level: 1,
            players: Vec::new(),
            foods: Vec::new(),
            special_food: None,
            power_ups: Vec::new(),
            obstacles: Vec::new(),
            speed_ms: INITIAL_SPEED_MS,
            power_up_active: None,
            power_up_timer_ms: 0,
        }
    }

    /// Blank two-player state in the given status
    pub fn new_multi(players: Vec<PlayerSnake>, status: GameStatus) -> Self {
        let idle = Snake {
            body: VecDeque::new(),
            direction: Direction::Right,
            next_direction: Direction::Right,
        };
        Self {
            mode: GameMode::Multi,
            players,
            ..Self::new(idle, status)
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn has_power_up(&self, kind: PowerUpType) -> bool {
        self.power_up_active == Some(kind)
    }

    pub fn has_obstacle_at(&self, pos: Position) -> bool {
        self.obstacles.iter().any(|o| o.position == pos)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnake> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerSnake> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &PlayerSnake> {
        self.players.iter().filter(|p| p.is_alive)
    }

    /// Every snake segment on the grid, whatever the mode
    pub fn snake_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.snake
            .body
            .iter()
            .chain(self.players.iter().flat_map(|p| p.snake.body.iter()))
            .copied()
    }

    /// Cells a new item must not be placed on
    pub fn occupied_cells(&self) -> HashSet<Position> {
        let mut cells: HashSet<Position> = self.snake_cells().collect();
        cells.extend(self.obstacles.iter().map(|o| o.position));
        cells.extend(self.power_ups.iter().copied());
        cells.extend(self.foods.iter().copied());
        cells.extend(self.special_food);
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(Position::new(-1, 5).wrapped(), Position::new(19, 5));
        assert_eq!(Position::new(20, 5).wrapped(), Position::new(0, 5));
        assert_eq!(Position::new(3, -1).wrapped(), Position::new(3, 19));
        assert_eq!(Position::new(3, 20).wrapped(), Position::new(3, 0));
        assert_eq!(Position::new(7, 7).wrapped(), Position::new(7, 7));
    }

    #[test]
    fn test_bounds_checking() {
        assert!(Position::new(0, 0).is_in_bounds());
        assert!(Position::new(19, 19).is_in_bounds());
        assert!(!Position::new(-1, 0).is_in_bounds());
        assert!(!Position::new(20, 0).is_in_bounds());
        assert!(!Position::new(0, 20).is_in_bounds());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(2, 3);
        assert_eq!(a.manhattan_distance(Position::new(5, 7)), 7);
        assert_eq!(Position::new(5, 7).manhattan_distance(a), 7);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn test_steer_rejects_reverse() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right);
        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.next_direction, Direction::Right);

        assert!(snake.steer(Direction::Up));
        // still judged against the heading of the last move
        assert!(!snake.steer(Direction::Left));
        assert!(snake.steer(Direction::Down));
        assert_eq!(snake.next_direction, Direction::Down);
        assert_eq!(snake.direction, Direction::Right);
    }

    #[test]
    fn test_two_phase_move() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right);
        let head = snake.next_head();
        snake.grow(head);
        assert_eq!(snake.len(), 2);
        snake.trim_tail();
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(6, 5));

        snake.trim_tail();
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_obstacle_expiry() {
        let obstacle = Obstacle::new(Position::new(1, 1), 1000, 4000);
        assert!(!obstacle.is_expired(1000));
        assert!(!obstacle.is_expired(5000));
        assert!(obstacle.is_expired(5001));
        assert!(!obstacle.is_expired(0));
    }

    #[test]
    fn test_occupied_cells() {
        let mut state = GameState::new(
            Snake::new(Position::new(10, 10), Direction::Right),
            GameStatus::Playing,
        );
        state.foods.push(Position::new(1, 1));
        state.special_food = Some(Position::new(2, 2));
        state.power_ups.push(Position::new(3, 3));
        state
            .obstacles
            .push(Obstacle::new(Position::new(4, 4), 0, 5000));

        let cells = state.occupied_cells();
        assert_eq!(cells.len(), 5);
        assert!(cells.contains(&Position::new(10, 10)));
        assert!(cells.contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_multi_state_has_no_single_snake() {
        let state = GameState::new_multi(
            vec![PlayerSnake::new(
                PlayerId::Player1,
                Position::new(8, 10),
                Direction::Right,
                SnakeColor::Green,
            )],
            GameStatus::Playing,
        );
        assert!(state.snake.is_empty());
        assert_eq!(state.snake_cells().count(), 1);
        assert!(state.player(PlayerId::Player2).is_none());
    }

    proptest! {
        #[test]
        fn steer_never_reverses(
            heading in any_direction(),
            requests in prop::collection::vec(any_direction(), 0..32),
        ) {
            let mut snake = Snake::new(Position::new(5, 5), heading);
            for requested in requests {
                let accepted = snake.steer(requested);
                prop_assert_eq!(accepted, requested != heading.opposite());
                prop_assert_eq!(snake.direction, heading);
                prop_assert_ne!(snake.next_direction, heading.opposite());
            }
        }

        #[test]
        fn committed_moves_never_reverse(
            requests in prop::collection::vec(any_direction(), 1..64),
        ) {
            let mut snake = Snake::new(Position::new(10, 10), Direction::Right);
            for requested in requests {
                let before = snake.direction;
                snake.steer(requested);
                snake.next_head();
                prop_assert_ne!(snake.direction, before.opposite());
            }
        }
    }
}
