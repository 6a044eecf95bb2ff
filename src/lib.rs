//! Real-time snake: a fixed-tick simulation over a pixel-space play area,
//! observers notified of every state change, and a terminal front end.

pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod geometry;
pub mod simulation;
pub mod terminal;

pub use config::GameConfig;
pub use error::{ConfigError, GameError};
pub use events::{ChannelObserver, DispatchMode, EventChannel, Notification, Observer, ObserverId};
pub use game::{AdvanceOutcome, GameState, GameStatus, Prey};
pub use geometry::{BoundingBox, Direction, Position};
pub use simulation::{SharedGame, SimulationHandle, SimulationLoop};
