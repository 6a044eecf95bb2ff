// the snake moves from tail to head: every tick a new head is appended at the
// back of the body and, unless prey was eaten, the tail is dropped from the front
use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::events::{EventChannel, Notification};
use crate::geometry::{self, BoundingBox, Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Active,
    Over,
}

/// The single target on the board, replaced whenever it is eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prey {
    pub center: Position,
    pub bounds: BoundingBox,
}

impl Prey {
    pub fn new(center: Position, half_extent: i32) -> Self {
        Self {
            center,
            bounds: BoundingBox::around(center, half_extent),
        }
    }
}

/// What a call to [`GameState::advance`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Plain move, length unchanged
    Moved,
    /// Prey eaten, the snake grew by one segment
    Ate,
    /// Wall or self collision, the game is now over
    Collided,
    /// The game was already over, nothing changed
    Ignored,
}

#[derive(Debug)]
pub struct GameState {
    width: i32,
    height: i32,
    stride: i32,
    eat_threshold: i32,
    prey_margin: i32,
    prey_half_extent: i32,
    body: VecDeque<Position>, // tail at the front, head at the back
    direction: Direction,
    prey: Option<Prey>,
    score: u32,
    status: GameStatus,
    rng: StdRng,
    events: EventChannel,
}

impl GameState {
    /// Builds a fresh session and places its first prey, so observers
    /// already registered on `events` receive the initial `PreyCreated`.
    pub fn new(config: &GameConfig, events: EventChannel) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut state = GameState {
            width: config.width,
            height: config.height,
            stride: config.stride,
            eat_threshold: config.eat_threshold,
            prey_margin: config.prey_margin,
            prey_half_extent: config.prey_half_extent,
            body: config.initial_body.iter().copied().collect(),
            direction: config.initial_direction,
            prey: None,
            score: 0,
            status: GameStatus::Active,
            rng,
            events,
        };
        state.create_prey();
        Ok(state)
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn head(&self) -> Position {
        // body is never empty: validated at construction and only grows
        // or keeps its length afterwards
        self.body[self.body.len() - 1]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn prey(&self) -> Option<Prey> {
        self.prey
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }

    pub fn events_mut(&mut self) -> &mut EventChannel {
        &mut self.events
    }

    /// Replaces the current direction unless `requested` would reverse the
    /// snake. Returns whether the direction was taken.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if self.direction.is_opposite(requested) {
            trace!(current = ?self.direction, ?requested, "reversal ignored");
            return false;
        }
        if self.direction != requested {
            debug!(from = ?self.direction, to = ?requested, "direction changed");
        }
        self.direction = requested;
        true
    }

    /// One simulation step.
    ///
    /// The new head is appended even when it collides, so the last `Moved`
    /// shows the fatal cell. `GameOver` is posted after that `Moved`.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.is_over() {
            return AdvanceOutcome::Ignored;
        }

        let new_head = geometry::step(self.head(), self.direction, self.stride);

        let hit_wall = !geometry::is_within_bounds(new_head, self.width, self.height);
        let bit_itself = self.body.contains(&new_head);
        if hit_wall || bit_itself {
            info!(head = %new_head, hit_wall, bit_itself, score = self.score, "game over");
            self.status = GameStatus::Over;
        }

        self.body.push_back(new_head);

        let ate = self
            .prey
            .is_some_and(|prey| geometry::is_near(new_head, prey.center, self.eat_threshold));
        if ate {
            self.score += 1;
            self.events.post(Notification::ScoreChanged { score: self.score });
            self.create_prey();
        } else {
            self.body.pop_front();
        }

        self.events.post(Notification::Moved {
            body: self.body.iter().copied().collect(),
        });

        if self.is_over() {
            self.events.post(Notification::GameOver);
            AdvanceOutcome::Collided
        } else if ate {
            AdvanceOutcome::Ate
        } else {
            AdvanceOutcome::Moved
        }
    }

    /// Samples a new prey center away from the walls and announces it.
    pub fn create_prey(&mut self) {
        let x = self
            .rng
            .random_range(self.prey_margin..=self.width - self.prey_margin);
        let y = self
            .rng
            .random_range(self.prey_margin..=self.height - self.prey_margin);
        let prey = Prey::new(Position::new(x, y), self.prey_half_extent);
        debug!(center = %prey.center, "prey created");
        self.prey = Some(prey);
        self.events.post(Notification::PreyCreated {
            bounds: prey.bounds,
        });
    }

    #[cfg(test)]
    pub(crate) fn place_prey(&mut self, center: Position) {
        self.prey = Some(Prey::new(center, self.prey_half_extent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DispatchMode;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<Notification>>>;

    fn recording_state(config: &GameConfig) -> (GameState, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut events = EventChannel::new(DispatchMode::Immediate);
        let sink = Arc::clone(&log);
        events.register(move |notification: &Notification| {
            sink.lock().unwrap().push(notification.clone());
        });
        let state = GameState::new(config, events).unwrap();
        (state, log)
    }

    fn snake(body: &[(i32, i32)], direction: Direction) -> GameConfig {
        GameConfig::default()
            .with_seed(42)
            .with_initial_body(body.iter().map(|&p| Position::from(p)).collect(), direction)
    }

    fn game_overs(log: &Log) -> usize {
        log.lock()
            .unwrap()
            .iter()
            .filter(|n| **n == Notification::GameOver)
            .count()
    }

    #[test]
    fn test_new_game() {
        let (state, log) = recording_state(&GameConfig::default().with_seed(1));
        assert_eq!(state.body().len(), 5);
        assert_eq!(state.head(), Position::new(455, 55));
        assert_eq!(state.direction(), Direction::Left);
        assert_eq!(state.score(), 0);
        assert_eq!(state.status(), GameStatus::Active);

        let prey = state.prey().expect("first prey is created on construction");
        assert_eq!(
            *log.lock().unwrap(),
            vec![Notification::PreyCreated {
                bounds: prey.bounds
            }]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = snake(&[], Direction::Left);
        let result = GameState::new(&config, EventChannel::default());
        assert!(matches!(result, Err(ConfigError::EmptyBody)));
    }

    #[test]
    fn test_reversal_is_ignored() {
        for current in Direction::ALL {
            let (mut state, _) = recording_state(&snake(&[(250, 150)], current));
            assert!(!state.set_direction(current.opposite()));
            assert_eq!(state.direction(), current);
        }
    }

    #[test]
    fn test_non_opposite_directions_are_taken() {
        for current in Direction::ALL {
            for requested in Direction::ALL {
                if requested == current || requested == current.opposite() {
                    continue;
                }
                let (mut state, _) = recording_state(&snake(&[(250, 150)], current));
                assert!(state.set_direction(requested));
                assert_eq!(state.direction(), requested);
            }
        }

        let (mut state, _) = recording_state(&GameConfig::default().with_seed(1));
        assert!(state.set_direction(Direction::Up));
        assert_eq!(state.direction(), Direction::Up);
        // perpendicular twice within one tick, the latest wins
        assert!(state.set_direction(Direction::Right));
        assert_eq!(state.direction(), Direction::Right);
        assert!(state.set_direction(Direction::Right));
        assert_eq!(state.direction(), Direction::Right);
    }

    #[test]
    fn test_plain_move_drops_tail() {
        let config = snake(&[(30, 50), (40, 50), (50, 50)], Direction::Right);
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(100, 100));
        log.lock().unwrap().clear();

        assert_eq!(state.advance(), AdvanceOutcome::Moved);

        assert_eq!(
            state.body().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(40, 50), Position::new(50, 50), Position::new(60, 50)]
        );
        assert_eq!(state.score(), 0);
        assert_eq!(state.prey().map(|p| p.center), Some(Position::new(100, 100)));
        assert_eq!(
            *log.lock().unwrap(),
            vec![Notification::Moved {
                body: vec![
                    Position::new(40, 50),
                    Position::new(50, 50),
                    Position::new(60, 50)
                ]
            }]
        );
    }

    #[test]
    fn test_eating_grows_and_replaces_prey() {
        let config = snake(&[(84, 104), (94, 104)], Direction::Right);
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(100, 100));
        log.lock().unwrap().clear();

        assert_eq!(state.advance(), AdvanceOutcome::Ate);

        assert_eq!(state.head(), Position::new(104, 104));
        assert_eq!(state.body().len(), 3);
        assert_eq!(state.body().front(), Some(&Position::new(84, 104)));
        assert_eq!(state.score(), 1);

        let prey = state.prey().unwrap();
        assert_eq!(
            prey.bounds.as_tuple(),
            (
                prey.center.x - 5,
                prey.center.y - 5,
                prey.center.x + 5,
                prey.center.y + 5
            )
        );
        let log = log.lock().unwrap();
        assert_eq!(log[0], Notification::ScoreChanged { score: 1 });
        assert_eq!(
            log[1],
            Notification::PreyCreated {
                bounds: prey.bounds
            }
        );
        assert!(matches!(&log[2], Notification::Moved { body } if body.len() == 3));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_length_is_constant_or_grows_by_one() {
        let (mut state, _) = recording_state(&GameConfig::default().with_seed(5));
        while !state.is_over() {
            let before = state.body().len();
            match state.advance() {
                AdvanceOutcome::Ate => assert_eq!(state.body().len(), before + 1),
                AdvanceOutcome::Moved => assert_eq!(state.body().len(), before),
                AdvanceOutcome::Collided => {
                    assert!(state.body().len() == before || state.body().len() == before + 1)
                }
                AdvanceOutcome::Ignored => unreachable!("game was active"),
            }
        }
    }

    #[test]
    fn test_left_wall_collision() {
        let config = snake(&[(10, 55), (0, 55)], Direction::Left);
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(250, 150));

        assert_eq!(state.advance(), AdvanceOutcome::Collided);
        assert_eq!(state.status(), GameStatus::Over);
        // the fatal head is kept for the final frame
        assert_eq!(state.head(), Position::new(-10, 55));
        assert_eq!(game_overs(&log), 1);
        assert_eq!(log.lock().unwrap().last(), Some(&Notification::GameOver));
    }

    #[test]
    fn test_right_and_bottom_walls() {
        let config = snake(&[(490, 100), (500, 100)], Direction::Right);
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(250, 150));
        assert_eq!(state.advance(), AdvanceOutcome::Collided);
        assert_eq!(state.head(), Position::new(510, 100));
        assert_eq!(game_overs(&log), 1);

        let config = snake(&[(200, 290), (200, 300)], Direction::Down);
        let (mut state, _) = recording_state(&config);
        state.place_prey(Position::new(250, 150));
        assert_eq!(state.advance(), AdvanceOutcome::Collided);
        assert_eq!(state.head(), Position::new(200, 310));
    }

    #[test]
    fn test_edge_itself_is_inside() {
        let config = snake(&[(480, 100), (490, 100)], Direction::Right);
        let (mut state, _) = recording_state(&config);
        state.place_prey(Position::new(250, 150));
        assert_eq!(state.advance(), AdvanceOutcome::Moved);
        assert_eq!(state.head(), Position::new(500, 100));
        assert!(!state.is_over());
    }

    #[test]
    fn test_self_collision() {
        // a hook whose next step lands on its own second segment
        let config = snake(
            &[(50, 50), (60, 50), (70, 50), (70, 60), (60, 60)],
            Direction::Up,
        );
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(250, 150));

        assert_eq!(state.advance(), AdvanceOutcome::Collided);
        assert!(state.is_over());
        assert_eq!(state.head(), Position::new(60, 50));
        assert_eq!(game_overs(&log), 1);
    }

    #[test]
    fn test_advance_after_game_over_is_ignored() {
        let config = snake(&[(10, 55), (0, 55)], Direction::Left);
        let (mut state, log) = recording_state(&config);
        state.place_prey(Position::new(250, 150));
        state.advance();
        let body = state.body().clone();
        let posted = log.lock().unwrap().len();

        assert_eq!(state.advance(), AdvanceOutcome::Ignored);
        assert_eq!(state.body(), &body);
        assert_eq!(log.lock().unwrap().len(), posted);
        assert_eq!(game_overs(&log), 1);
    }

    #[test]
    fn test_prey_stays_inside_margin() {
        for seed in 0..200 {
            let config = GameConfig::new(500, 300).with_seed(seed);
            let mut state = GameState::new(&config, EventChannel::default()).unwrap();
            for _ in 0..50 {
                state.create_prey();
                let center = state.prey().unwrap().center;
                assert!((15..=485).contains(&center.x), "x out of range: {center}");
                assert!((15..=285).contains(&center.y), "y out of range: {center}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_prey() {
        let config = GameConfig::default().with_seed(99);
        let a = GameState::new(&config, EventChannel::default()).unwrap();
        let b = GameState::new(&config, EventChannel::default()).unwrap();
        assert_eq!(a.prey(), b.prey());
    }
}
