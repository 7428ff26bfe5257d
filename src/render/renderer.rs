use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GameMode, GameState, GameStatus, Position, PowerUpType, SnakeColor, GRID_SIZE};

/// Width of one grid cell in terminal columns
const CELL_WIDTH: u16 = 2;
const PANEL_WIDTH: u16 = 34;
/// Frames per on/off phase of the new-record banner
const BANNER_BLINK_FRAMES: u64 = 8;

/// What occupies a grid cell, in drawing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Head(SnakeColor),
    Body(SnakeColor),
    Obstacle,
    SpecialFood,
    PowerUp,
    Food,
    Empty,
}

impl Cell {
    fn span(self) -> Span<'static> {
        match self {
            Cell::Head(color) => Span::styled(
                "■ ",
                Style::default()
                    .fg(snake_color(color))
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Body(color) => Span::styled("□ ", Style::default().fg(snake_color(color))),
            Cell::Obstacle => Span::styled("▓▓", Style::default().fg(Color::Gray)),
            Cell::SpecialFood => Span::styled(
                "★ ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::PowerUp => Span::styled(
                "◆ ",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Food => Span::styled(
                "O ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }
}

fn snake_color(color: SnakeColor) -> Color {
    match color {
        SnakeColor::Green => Color::Green,
        SnakeColor::Pink => Color::LightMagenta,
    }
}

fn power_up_color(kind: PowerUpType) -> Color {
    match kind {
        PowerUpType::SlowMotion => Color::Cyan,
        PowerUpType::Invincible => Color::Yellow,
        PowerUpType::DoubleScore => Color::Green,
        PowerUpType::PhaseThrough => Color::Magenta,
    }
}

/// Resolve what to draw at `pos`
pub fn cell_at(state: &GameState, pos: Position) -> Cell {
    match state.mode {
        GameMode::Single => {
            if state.snake.body.front() == Some(&pos) {
                return Cell::Head(SnakeColor::Green);
            }
            if state.snake.occupies(pos) {
                return Cell::Body(SnakeColor::Green);
            }
        }
        GameMode::Multi => {
            for player in state.alive_players() {
                if player.snake.head() == pos {
                    return Cell::Head(player.color);
                }
                if player.snake.occupies(pos) {
                    return Cell::Body(player.color);
                }
            }
        }
    }

    if state.has_obstacle_at(pos) {
        Cell::Obstacle
    } else if state.special_food == Some(pos) {
        Cell::SpecialFood
    } else if state.power_ups.contains(&pos) {
        Cell::PowerUp
    } else if state.foods.contains(&pos) {
        Cell::Food
    } else {
        Cell::Empty
    }
}

/// Read-only terminal view of a game
pub struct Renderer {
    frame_count: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        state: &GameState,
        best_score: u32,
        celebrating: bool,
    ) {
        self.frame_count = self.frame_count.wrapping_add(1);

        let grid_width = GRID_SIZE as u16 * CELL_WIDTH + 2;
        let grid_height = GRID_SIZE as u16 + 2;

        let [body, footer] = Layout::vertical([
            Constraint::Length(grid_height),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(frame.area());

        let [grid_area, panel_area] = Layout::horizontal([
            Constraint::Length(grid_width),
            Constraint::Length(PANEL_WIDTH),
        ])
        .flex(Flex::Center)
        .areas(body);

        frame.render_widget(self.render_grid(state), grid_area);
        frame.render_widget(self.render_panel(state, best_score), panel_area);
        frame.render_widget(self.render_controls(state.mode), footer);

        match state.status {
            GameStatus::Playing => {}
            GameStatus::Menu => {
                self.render_overlay(frame, grid_area, self.menu_lines(best_score))
            }
            GameStatus::Paused => self.render_overlay(frame, grid_area, self.pause_lines()),
            GameStatus::GameOver => {
                let lines = self.game_over_lines(state, best_score, celebrating);
                self.render_overlay(frame, grid_area, lines)
            }
        }
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'static> {
        let lines: Vec<Line> = (0..GRID_SIZE)
            .map(|y| {
                let spans: Vec<Span> = (0..GRID_SIZE)
                    .map(|x| cell_at(state, Position::new(x, y)).span())
                    .collect();
                Line::from(spans)
            })
            .collect();

        let border_color = match state.power_up_active {
            Some(kind) => power_up_color(kind),
            None => Color::White,
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(border_color))
                .title(" Snake "),
        )
    }

    fn render_panel(&self, state: &GameState, best_score: u32) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let stat = |name: &str, text: String| {
            Line::from(vec![
                Span::styled(format!("{name}: "), label),
                Span::styled(text, value),
            ])
        };

        let mut lines = Vec::new();
        match state.mode {
            GameMode::Single => {
                lines.push(stat("Score", state.score.to_string()));
                lines.push(stat("Level", state.level.to_string()));
                lines.push(stat("Length", state.snake.len().to_string()));
            }
            GameMode::Multi => {
                for player in &state.players {
                    let status = if player.is_alive { "" } else { " (out)" };
                    lines.push(Line::from(Span::styled(
                        format!("{}{}", player.id.label(), status),
                        Style::default()
                            .fg(snake_color(player.color))
                            .add_modifier(Modifier::BOLD),
                    )));
                    lines.push(stat("  Score", player.score.to_string()));
                    lines.push(stat("  Level", player.level.to_string()));
                    lines.push(stat("  Length", player.snake.len().to_string()));
                }
            }
        }

        lines.push(stat("Speed", format!("{} ms", state.speed_ms)));
        lines.push(stat("Best", best_score.to_string()));
        lines.push(Line::from(""));

        match state.power_up_active {
            Some(kind) => lines.push(Line::from(vec![
                Span::styled(
                    kind.label().to_string(),
                    Style::default()
                        .fg(power_up_color(kind))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {}s", state.power_up_timer_ms.div_ceil(1000))),
            ])),
            None => lines.push(Line::from(Span::styled(
                "No power-up",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Info "),
        )
    }

    fn render_controls(&self, mode: GameMode) -> Paragraph<'static> {
        let steer = match mode {
            GameMode::Single => vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
            ],
            GameMode::Multi => vec![
                Span::styled("WASD", Style::default().fg(Color::Green)),
                Span::raw(" P1 "),
                Span::styled("↑↓←→", Style::default().fg(Color::LightMagenta)),
                Span::raw(" P2 | "),
            ],
        };

        let mut spans = steer;
        spans.extend([
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::raw(" menu | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ]);

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }

    fn menu_lines(&self, best_score: u32) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "1",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  Single player"),
            ]),
            Line::from(vec![
                Span::styled(
                    "2",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  Two players"),
            ]),
            Line::from(""),
            Line::from(format!("Best score: {best_score}")),
        ]
    }

    fn pause_lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press Space to resume"),
        ]
    }

    fn game_over_lines(
        &self,
        state: &GameState,
        best_score: u32,
        celebrating: bool,
    ) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        if state.mode == GameMode::Multi {
            let top_score = state.players.iter().map(|p| p.score).max();
            let leaders: Vec<_> = state
                .players
                .iter()
                .filter(|p| Some(p.score) == top_score)
                .collect();
            let winner = match leaders.as_slice() {
                [only] => Some(*only),
                _ => None,
            };
            lines.push(match winner {
                Some(player) => Line::from(Span::styled(
                    format!("{} wins", player.id.label()),
                    Style::default().fg(snake_color(player.color)),
                )),
                None => Line::from("Draw"),
            });
        }

        lines.push(Line::from(vec![
            Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));

        if celebrating {
            let lit = (self.frame_count / BANNER_BLINK_FRAMES) % 2 == 0;
            let color = if lit { Color::Yellow } else { Color::LightRed };
            lines.push(Line::from(Span::styled(
                "★ NEW RECORD ★",
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(format!("Best: {best_score}")));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));
        lines
    }

    fn render_overlay(&self, frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
        let height = lines.len() as u16 + 2;
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(area.width.saturating_sub(6))])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Thick),
            ),
            popup,
        );
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Obstacle, PlayerId, PlayerSnake, Snake};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(state: &GameState, best: u32, celebrating: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        let mut renderer = Renderer::new();
        terminal
            .draw(|frame| renderer.render(frame, state, best, celebrating))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn playing_state() -> GameState {
        GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right),
            GameStatus::Playing,
        )
    }

    #[test]
    fn test_cell_priority() {
        let mut state = playing_state();
        state.snake.grow(Position::new(6, 5));
        state.foods.push(Position::new(1, 1));
        state.special_food = Some(Position::new(2, 2));
        state.power_ups.push(Position::new(3, 3));
        state.obstacles.push(Obstacle::new(Position::new(4, 4), 0, 5000));

        assert_eq!(cell_at(&state, Position::new(6, 5)), Cell::Head(SnakeColor::Green));
        assert_eq!(cell_at(&state, Position::new(5, 5)), Cell::Body(SnakeColor::Green));
        assert_eq!(cell_at(&state, Position::new(1, 1)), Cell::Food);
        assert_eq!(cell_at(&state, Position::new(2, 2)), Cell::SpecialFood);
        assert_eq!(cell_at(&state, Position::new(3, 3)), Cell::PowerUp);
        assert_eq!(cell_at(&state, Position::new(4, 4)), Cell::Obstacle);
        assert_eq!(cell_at(&state, Position::new(0, 0)), Cell::Empty);
    }

    #[test]
    fn test_dead_players_not_drawn() {
        let mut state = GameState::new_multi(
            vec![
                PlayerSnake::new(
                    PlayerId::Player1,
                    Position::new(2, 2),
                    Direction::Right,
                    SnakeColor::Green,
                ),
                PlayerSnake::new(
                    PlayerId::Player2,
                    Position::new(8, 8),
                    Direction::Left,
                    SnakeColor::Pink,
                ),
            ],
            GameStatus::Playing,
        );
        state.players[1].is_alive = false;

        assert_eq!(cell_at(&state, Position::new(2, 2)), Cell::Head(SnakeColor::Green));
        assert_eq!(cell_at(&state, Position::new(8, 8)), Cell::Empty);
    }

    #[test]
    fn test_menu_overlay() {
        let state = GameState::new(
            Snake::new(Position::new(10, 10), Direction::Right),
            GameStatus::Menu,
        );
        let screen = draw(&state, 420, false);
        assert!(screen.contains("Single player"));
        assert!(screen.contains("Best score: 420"));
    }

    #[test]
    fn test_pause_overlay() {
        let mut state = playing_state();
        state.status = GameStatus::Paused;
        assert!(draw(&state, 0, false).contains("PAUSED"));
    }

    #[test]
    fn test_game_over_banner() {
        let mut state = playing_state();
        state.status = GameStatus::GameOver;
        state.score = 300;

        let screen = draw(&state, 300, true);
        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("NEW RECORD"));

        let screen = draw(&state, 500, false);
        assert!(!screen.contains("NEW RECORD"));
        assert!(screen.contains("Best: 500"));
    }

    #[test]
    fn test_info_panel_shows_power_up() {
        let mut state = playing_state();
        state.power_up_active = Some(PowerUpType::DoubleScore);
        state.power_up_timer_ms = 12_300;

        let screen = draw(&state, 0, false);
        assert!(screen.contains(PowerUpType::DoubleScore.label()));
        assert!(screen.contains("13s"));
    }
}
