use std::collections::BTreeMap;

use tracing::debug;

use crate::collaborators::{Presenter, Spawner};
use crate::grid::MatchesCleared;
use crate::layout::WorldPoint;
use crate::position::GridPosition;
use crate::session::FinishSummary;

/// Everything the engine reports to the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Selected(GridPosition),
    Dragged {
        origin: GridPosition,
        pointer: WorldPoint,
    },
    /// A release over an unusable cell; the tile goes back to `origin`.
    Returned {
        origin: GridPosition,
    },
    Swapped {
        origin: GridPosition,
        target: GridPosition,
    },
    SwapReverted {
        origin: GridPosition,
        target: GridPosition,
    },
    MatchesCleared(MatchesCleared),
    SessionStarted {
        balance: i64,
    },
    ScoreChanged(i64),
    FinishSequenceStarted,
    SpawnRequested(GridPosition),
    TilePlaced(GridPosition),
    SessionFinished(FinishSummary),
}

pub trait Observer {
    fn notify(&mut self, event: &EngineEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Fans events out to subscribers in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    observers: BTreeMap<SubscriptionId, Box<dyn Observer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        debug!("Observer {id:?} subscribed");
        id
    }

    /// Returns the observer so the caller can inspect it, or `None` for an
    /// unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn Observer>> {
        self.observers.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, event: &EngineEvent) {
        for observer in self.observers.values_mut() {
            observer.notify(event);
        }
    }
}

/// Forwards score and summary events to a [`Presenter`].
#[derive(Debug, Default)]
pub struct PresenterLink<P>(pub P);

impl<P: Presenter> Observer for PresenterLink<P> {
    fn notify(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::ScoreChanged(balance) | EngineEvent::SessionStarted { balance } => {
                self.0.update_score(*balance);
            }
            EngineEvent::SessionFinished(summary) => self.0.show_finish_summary(summary),
            _ => {}
        }
    }
}

/// Hands the finish sequence to a [`Spawner`]. Regular spawns go through
/// `Engine::request_spawn`, which calls the spawner directly.
#[derive(Debug, Default)]
pub struct SpawnerLink<S>(pub S);

impl<S: Spawner> Observer for SpawnerLink<S> {
    fn notify(&mut self, event: &EngineEvent) {
        if *event == EngineEvent::FinishSequenceStarted {
            self.0.replace_with_final();
        }
    }
}
