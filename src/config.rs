use std::time::Duration;

use crate::error::ConfigError;
use crate::events::DispatchMode;
use crate::geometry::{self, Direction, Position};

/// Largest accepted width or height, keeps every coordinate and the
/// terminal grid well inside `i32` and memory limits
pub const MAX_SIDE: i32 = 2000;

const STARTING_LENGTH: i32 = 5;
const STARTING_ROW: i32 = 55;

/// Five segments along one row, tail 5 pixels short of the right wall and
/// the head `4 * stride` further left. For a 500x300 area with a stride of
/// 10 this is (495, 55) .. (455, 55).
pub fn starting_body(width: i32, height: i32, stride: i32) -> Vec<Position> {
    let tail_x = width.saturating_sub(5);
    let y = STARTING_ROW.min(height);
    (0..STARTING_LENGTH)
        .map(|i| Position::new(tail_x.saturating_sub(i.saturating_mul(stride)), y))
        .collect()
}

/// Construction-time parameters shared by the game state, the simulation
/// loop and the terminal view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Width of the play area in pixels
    pub width: i32,
    /// Height of the play area in pixels
    pub height: i32,
    /// Time between two simulation ticks
    pub tick_period: Duration,
    /// Distance the head travels per tick
    pub stride: i32,
    /// Per-axis distance under which the head eats the prey
    pub eat_threshold: i32,
    /// Minimum distance between a prey center and the walls
    pub prey_margin: i32,
    /// Half the side of the prey's bounding box
    pub prey_half_extent: i32,
    /// Initial body, tail first and head last
    pub initial_body: Vec<Position>,
    pub initial_direction: Direction,
    pub dispatch_mode: DispatchMode,
    /// Fixed seed for prey placement, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 300,
            tick_period: Duration::from_millis(150),
            stride: 10,
            eat_threshold: 10,
            prey_margin: 15,
            prey_half_extent: 5,
            initial_body: starting_body(500, 300, 10),
            initial_direction: Direction::Left,
            dispatch_mode: DispatchMode::Immediate,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Default parameters on a `width` x `height` area, with the starting
    /// body laid out to fit it
    pub fn new(width: i32, height: i32) -> Self {
        let defaults = Self::default();
        Self {
            width,
            height,
            initial_body: starting_body(width, height, defaults.stride),
            ..defaults
        }
    }

    /// Changes the stride and lays the starting body out again with it
    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self.initial_body = starting_body(self.width, self.height, stride);
        self
    }

    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dispatch_mode(mut self, dispatch_mode: DispatchMode) -> Self {
        self.dispatch_mode = dispatch_mode;
        self
    }

    pub fn with_initial_body(mut self, body: Vec<Position>, direction: Direction) -> Self {
        self.initial_body = body;
        self.initial_direction = direction;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // checked first, everything below does arithmetic on the sides
        if !(1..=MAX_SIDE).contains(&self.width) || !(1..=MAX_SIDE).contains(&self.height) {
            return Err(ConfigError::InvalidArea {
                width: self.width,
                height: self.height,
                max: MAX_SIDE,
            });
        }
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        let shorter_side = self.width.min(self.height);
        if self.stride <= 0 || self.stride > shorter_side {
            return Err(ConfigError::InvalidStride(self.stride));
        }
        if self.eat_threshold <= 0 {
            return Err(ConfigError::InvalidThreshold(self.eat_threshold));
        }
        if !(0..=shorter_side).contains(&self.prey_margin)
            || !(0..=shorter_side).contains(&self.prey_half_extent)
        {
            return Err(ConfigError::InvalidPreyGeometry {
                margin: self.prey_margin,
                half_extent: self.prey_half_extent,
            });
        }
        // prey centers are drawn from [margin, size - margin] on both axes
        if self.width - self.prey_margin < self.prey_margin
            || self.height - self.prey_margin < self.prey_margin
        {
            return Err(ConfigError::AreaTooSmall {
                width: self.width,
                height: self.height,
                margin: self.prey_margin,
            });
        }
        if self.initial_body.is_empty() {
            return Err(ConfigError::EmptyBody);
        }
        if let Some(segment) = self
            .initial_body
            .iter()
            .find(|segment| !geometry::is_within_bounds(**segment, self.width, self.height))
        {
            return Err(ConfigError::BodyOutOfBounds {
                x: segment.x,
                y: segment.y,
            });
        }
        Ok(())
    }
}
