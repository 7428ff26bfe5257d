//! Two-player tick resolver.
//!
//! Both snakes move against the same pre-tick snapshot: collisions with the
//! rival use its body from before this tick, and pickups are judged against
//! the pools as they stood before either snake moved.

use log::info;
use rand::Rng;

use super::action::PlayerId;
use super::engine::{
    blocked_at, refresh_speed, CollisionType, GameEngine, Pickups, StepInfo, StepResult,
};
use super::scoring;
use super::state::{GameState, PlayerSnake, Position, PowerUpType};

fn rival_at(head: Position, id: PlayerId, before: &[PlayerSnake]) -> bool {
    before
        .iter()
        .any(|other| other.id != id && other.is_alive && other.snake.occupies(head))
}

impl<R: Rng> GameEngine<R> {
    pub(super) fn step_multi(&mut self, state: &mut GameState, now_ms: u64) -> StepResult {
        let invincible = state.has_power_up(PowerUpType::Invincible);
        let before = state.players.clone();
        let foods = state.foods.clone();
        let special_food = state.special_food;
        let power_ups = state.power_ups.clone();

        let mut info = StepInfo::default();
        let mut moves = Vec::new();

        for (index, player) in state.players.iter_mut().enumerate() {
            if !player.is_alive {
                continue;
            }
            let head = player.snake.next_head();
            let collision = if invincible {
                None
            } else {
                blocked_at(head, &state.obstacles).or_else(|| {
                    rival_at(head, player.id, &before).then_some(CollisionType::Rival)
                })
            };

            match collision {
                Some(collision) => {
                    player.is_alive = false;
                    info!("{} hit {:?} at {:?}", player.id.label(), collision, head);
                    info.eliminated.push(player.id);
                }
                None => moves.push((index, head)),
            }
        }

        for (index, head) in moves {
            let pickups = Pickups::at(head, &foods, special_food, &power_ups);
            let level = state.players[index].level;
            state.players[index].snake.grow(head);
            let consumption = self.consume(state, head, pickups, level);

            let player = &mut state.players[index];
            player.score += consumption.points;
            if !consumption.ate {
                player.snake.trim_tail();
            }
            info.ate_food |= consumption.ate;
            if consumption.power_up.is_some() {
                info.power_up = consumption.power_up;
            }

            let next_level = scoring::next_level(player.score, player.level);
            if next_level != player.level {
                player.level = next_level;
                info!("{} reached level {}", player.id.label(), next_level);
                self.spawn_level_obstacle(state, head, now_ms);
                info.leveled_up = true;
            }
        }
        refresh_speed(state);

        // fallen snakes leave their bodies behind as food
        for id in &info.eliminated {
            if let Some(fallen) = before.iter().find(|p| p.id == *id) {
                for segment in &fallen.snake.body {
                    if !state.foods.contains(segment) {
                        state.foods.push(*segment);
                    }
                }
            }
        }

        let terminated = state.alive_players().next().is_none();
        if terminated {
            state.score = state.players.iter().map(|p| p.score).max().unwrap_or(0);
            self.end_game(state);
        }

        StepResult {
            terminated,
            speed_changed: false,
            info,
        }
    }
}
