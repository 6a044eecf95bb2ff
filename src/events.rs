//! State-change notifications and the channel that broadcasts them.
//!
//! Observers are called synchronously, one after the other, in the order they
//! registered. In [`DispatchMode::Deferred`] posts are queued and only handed
//! out when [`EventChannel::drain`] runs, which the simulation loop does once
//! per tick.

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::Sender;

use tracing::{trace, warn};

use crate::geometry::{BoundingBox, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The snake moved, `body` is ordered tail first and head last
    Moved { body: Vec<Position> },
    ScoreChanged { score: u32 },
    PreyCreated { bounds: BoundingBox },
    GameOver,
}

/// Receiver of notifications. Handlers run while the game state is locked,
/// so they must return quickly.
pub trait Observer: Send {
    fn notify(&mut self, notification: &Notification);
}

impl<F> Observer for F
where
    F: FnMut(&Notification) + Send,
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

/// Identity handed out on registration, used to unregister later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Deliver on every post
    #[default]
    Immediate,
    /// Queue posts until the next drain
    Deferred,
}

pub struct EventChannel {
    mode: DispatchMode,
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
    pending: VecDeque<Notification>,
}

impl EventChannel {
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            mode,
            next_id: 0,
            observers: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn register<O>(&mut self, observer: O) -> ObserverId
    where
        O: Observer + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not registered
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        before != self.observers.len()
    }

    pub fn post(&mut self, notification: Notification) {
        match self.mode {
            DispatchMode::Immediate => self.deliver(&notification),
            DispatchMode::Deferred => self.pending.push_back(notification),
        }
    }

    /// Delivers every queued notification in the order it was posted and
    /// returns how many were delivered.
    pub fn drain(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(notification) = self.pending.pop_front() {
            self.deliver(&notification);
            delivered += 1;
        }
        delivered
    }

    fn deliver(&mut self, notification: &Notification) {
        trace!(?notification, observers = self.observers.len(), "posting");
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(notification);
        }
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new(DispatchMode::default())
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("mode", &self.mode)
            .field("observers", &self.observers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Forwards notifications to another thread. Sending never blocks, and a
/// receiver that went away is only reported once.
pub struct ChannelObserver {
    tx: Sender<Notification>,
    disconnected: bool,
}

impl ChannelObserver {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }
}

impl Observer for ChannelObserver {
    fn notify(&mut self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() && !self.disconnected {
            warn!("notification receiver dropped, further notifications are discarded");
            self.disconnected = true;
        }
    }
}
