use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, trace, warn};

use crate::error::GameError;
use crate::game::{AdvanceOutcome, GameState, GameStatus};
use crate::geometry::Direction;

/// A game state behind one lock. Input, ticks and the notifications posted
/// while ticking are all serialized through it.
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<GameState>>,
}

impl SharedGame {
    pub fn new(state: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameState>, GameError> {
        self.inner.lock().map_err(|_| {
            warn!("game state lock poisoned");
            GameError::Poisoned
        })
    }

    pub fn set_direction(&self, direction: Direction) -> Result<bool, GameError> {
        Ok(self.lock()?.set_direction(direction))
    }

    /// Advances one tick and hands out anything the channel buffered.
    pub fn advance(&self) -> Result<AdvanceOutcome, GameError> {
        let mut state = self.lock()?;
        let outcome = state.advance();
        state.events_mut().drain();
        Ok(outcome)
    }

    pub fn status(&self) -> Result<GameStatus, GameError> {
        Ok(self.lock()?.status())
    }

    pub fn score(&self) -> Result<u32, GameError> {
        Ok(self.lock()?.score())
    }

    /// Runs `f` with the state locked.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> Result<T, GameError> {
        Ok(f(&mut *self.lock()?))
    }
}

/// Fixed-period driver: sleep, then step, until the game is over.
/// Missed ticks are not caught up.
#[derive(Debug)]
pub struct SimulationLoop {
    game: SharedGame,
    period: Duration,
}

impl SimulationLoop {
    pub fn new(game: SharedGame, period: Duration) -> Self {
        Self { game, period }
    }

    /// Blocks until the game is over and returns how many ticks advanced it.
    pub fn run(&self) -> Result<u64, GameError> {
        info!(period_ms = self.period.as_millis() as u64, "simulation started");
        let mut ticks = 0;
        loop {
            thread::sleep(self.period);
            if self.game.status()? == GameStatus::Over {
                break;
            }
            let outcome = self.game.advance()?;
            ticks += 1;
            trace!(tick = ticks, ?outcome, "tick");
            if outcome == AdvanceOutcome::Collided {
                break;
            }
        }
        info!(ticks, "simulation stopped");
        Ok(ticks)
    }

    pub fn spawn(self) -> io::Result<SimulationHandle> {
        let handle = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || self.run())?;
        Ok(SimulationHandle { handle })
    }
}

pub struct SimulationHandle {
    handle: JoinHandle<Result<u64, GameError>>,
}

impl SimulationHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the loop to stop on its own. A panic on the simulation
    /// thread is reported as a poisoned game.
    pub fn join(self) -> Result<u64, GameError> {
        self.handle.join().map_err(|_| GameError::Poisoned)?
    }
}
