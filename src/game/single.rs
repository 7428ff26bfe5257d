//! Single-player tick resolver

use log::info;
use rand::Rng;

use super::engine::{blocked_at, refresh_speed, GameEngine, Pickups, StepInfo, StepResult};
use super::scoring;
use super::state::{GameState, PowerUpType};

impl<R: Rng> GameEngine<R> {
    pub(super) fn step_single(&mut self, state: &mut GameState, now_ms: u64) -> StepResult {
        let phase_through = state.has_power_up(PowerUpType::PhaseThrough);
        let invincible = state.has_power_up(PowerUpType::Invincible);

        let mut head = state.snake.next_head();
        if phase_through {
            head = head.wrapped();
        }

        // the snake may cross its own body
        if !invincible {
            if let Some(collision) = blocked_at(head, &state.obstacles) {
                info!("Snake hit {:?} at {:?}", collision, head);
                self.end_game(state);
                return StepResult {
                    terminated: true,
                    speed_changed: false,
                    info: StepInfo {
                        collision_type: Some(collision),
                        ..Default::default()
                    },
                };
            }
        }

        let pickups = Pickups::at(head, &state.foods, state.special_food, &state.power_ups);
        let level = state.level;
        state.snake.grow(head);
        let consumption = self.consume(state, head, pickups, level);
        state.score += consumption.points;
        if !consumption.ate {
            state.snake.trim_tail();
        }

        let mut info = StepInfo {
            ate_food: consumption.ate,
            power_up: consumption.power_up,
            ..Default::default()
        };

        let next_level = scoring::next_level(state.score, state.level);
        if next_level != state.level {
            state.level = next_level;
            info!("Reached level {} with score {}", next_level, state.score);
            self.spawn_level_obstacle(state, head, now_ms);
            refresh_speed(state);
            info.leveled_up = true;
        }

        StepResult {
            terminated: false,
            speed_changed: false,
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::action::Direction;
    use crate::game::config::GameConfig;
    use crate::game::engine::tests::{single_state, test_engine};
    use crate::game::engine::{CollisionType, GameEngine};
    use crate::game::state::{GameMode, GameStatus, Obstacle, Position, PowerUpType};

    #[test]
    fn test_basic_movement() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);

        let result = engine.step(&mut state, 0);

        assert!(!result.terminated);
        assert!(!result.info.ate_food);
        assert_eq!(state.snake.head(), Position::new(6, 5));
        assert_eq!(state.snake.len(), 1);
    }

    #[test]
    fn test_latest_legal_steer_wins() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);

        engine.steer(&mut state, Direction::Up);
        engine.steer(&mut state, Direction::Down);
        engine.steer(&mut state, Direction::Left);
        engine.step(&mut state, 0);

        assert_eq!(state.snake.head(), Position::new(5, 6));
        assert_eq!(state.snake.direction, Direction::Down);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.foods = vec![Position::new(6, 5), Position::new(0, 0)];

        let result = engine.step(&mut state, 0);

        assert!(result.info.ate_food);
        assert_eq!(state.score, 10);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.foods, vec![Position::new(0, 0)]);

        // next tick eats nothing and keeps the length
        engine.step(&mut state, 150);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.snake.head(), Position::new(7, 5));
    }

    #[test]
    fn test_special_food_consumption() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.level = 2;
        state.special_food = Some(Position::new(6, 5));

        engine.step(&mut state, 0);

        assert_eq!(state.score, 100);
        assert_eq!(state.special_food, None);
        assert_eq!(state.snake.len(), 2);
    }

    #[test]
    fn test_double_score() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.power_up_active = Some(PowerUpType::DoubleScore);
        state.foods = vec![Position::new(6, 5)];

        engine.step(&mut state, 0);
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_power_up_pickup() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.power_ups = vec![Position::new(6, 5)];

        let result = engine.step(&mut state, 0);

        assert!(result.info.ate_food);
        assert!(state.power_ups.is_empty());
        assert_eq!(state.power_up_active, result.info.power_up);
        assert!(state.power_up_active.is_some());
        assert_eq!(state.power_up_timer_ms, 20_000);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(0, 5), Direction::Left);
        let body_before = state.snake.body.clone();

        let result = engine.step(&mut state, 0);

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
        assert_eq!(state.snake.body, body_before);
    }

    #[test]
    fn test_obstacle_collision() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.snake.grow(Position::new(6, 5));
        state.snake.steer(Direction::Up);
        state.obstacles.push(Obstacle::new(Position::new(6, 4), 0, 5000));
        let body_before = state.snake.body.clone();

        let result = engine.step(&mut state, 0);

        assert!(result.terminated);
        assert_eq!(result.info.collision_type, Some(CollisionType::Obstacle));
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.snake.body, body_before);
    }

    #[test]
    fn test_head_passes_through_own_body() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        for x in (2..5).rev() {
            state.snake.body.push_back(Position::new(x, 5));
        }
        // turn back on itself across two ticks
        engine.steer(&mut state, Direction::Down);
        engine.step(&mut state, 0);
        engine.steer(&mut state, Direction::Left);
        engine.step(&mut state, 150);
        engine.steer(&mut state, Direction::Up);
        let result = engine.step(&mut state, 300);

        assert!(!result.terminated);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.snake.head(), Position::new(4, 5));
    }

    #[test]
    fn test_phase_through_wraps() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(19, 3), Direction::Right);
        state.power_up_active = Some(PowerUpType::PhaseThrough);

        let result = engine.step(&mut state, 0);

        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Position::new(0, 3));
    }

    #[test]
    fn test_phase_through_still_blocked_by_obstacle() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(0, 3), Direction::Left);
        state.power_up_active = Some(PowerUpType::PhaseThrough);
        state.obstacles.push(Obstacle::new(Position::new(19, 3), 0, 5000));

        let result = engine.step(&mut state, 0);
        assert_eq!(result.info.collision_type, Some(CollisionType::Obstacle));
    }

    #[test]
    fn test_invincible_leaves_grid_then_revalidates() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(19, 3), Direction::Right);
        state.power_up_active = Some(PowerUpType::Invincible);

        let result = engine.step(&mut state, 0);
        assert!(!result.terminated);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.snake.head(), Position::new(20, 3));
        assert_eq!(state.snake.len(), 1);

        engine.expire_power_up(&mut state);
        let result = engine.step(&mut state, 150);
        assert!(result.terminated);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
    }

    #[test]
    fn test_invincible_ignores_obstacles() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.power_up_active = Some(PowerUpType::Invincible);
        state.obstacles.push(Obstacle::new(Position::new(6, 5), 0, 5000));

        let result = engine.step(&mut state, 0);
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Position::new(6, 5));
    }

    #[test]
    fn test_level_up_from_ten_foods() {
        let mut engine = GameEngine::seeded(GameConfig::without_drops(), 7);
        let mut state = engine.start(GameMode::Single, 0);
        state.foods.clear();

        for tick in 0..10u64 {
            let next = state.snake.head().moved_in_direction(state.snake.direction);
            // stay on the grid: move down the rows once the right edge is close
            let next = if next.x >= 19 {
                engine.steer(&mut state, Direction::Down);
                state.snake.head().moved_in_direction(Direction::Down)
            } else {
                next
            };
            assert_eq!(state.level, 1);
            state.foods.push(next);
            let result = engine.step(&mut state, tick * 150);
            assert!(result.info.ate_food);
            assert_eq!(state.score, 10 * (tick as u32 + 1));
        }

        assert_eq!(state.score, 100);
        assert_eq!(state.level, 2);
        assert_eq!(state.speed_ms, 140);
        assert_eq!(state.snake.len(), 11);
        assert_eq!(state.obstacles.len(), 1);
        let head = state.snake.head();
        assert!(state.obstacles[0].position.manhattan_distance(head) >= 7);
        assert!(!state.snake.occupies(state.obstacles[0].position));
    }

    #[test]
    fn test_level_up_reports_speed_change() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.score = 95;
        state.foods.push(Position::new(6, 5));

        let result = engine.step(&mut state, 0);
        assert!(result.info.leveled_up);
        assert!(result.speed_changed);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_slow_motion_level_up_speed() {
        let mut engine = test_engine();
        let mut state = single_state(Position::new(5, 5), Direction::Right);
        state.power_up_active = Some(PowerUpType::SlowMotion);
        state.score = 90;
        state.foods.push(Position::new(6, 5));

        engine.step(&mut state, 0);
        assert_eq!(state.speed_ms, 280);
    }
}
