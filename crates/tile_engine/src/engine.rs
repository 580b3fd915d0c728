use core::time::Duration;

use fastrand::Rng;
use queues::{IsQueue, Queue};
use tracing::{debug, info, warn};

use crate::collaborators::{CurrencyStore, Spawner};
use crate::config::EngineConfig;
use crate::effects::{Difficulty, Effect, EffectBox};
use crate::error::{GridError, SessionError};
use crate::events::{EngineEvent, EventBus};
use crate::grid::{MatchesCleared, TileGrid};
use crate::layout::{CellLayout, WorldPoint};
use crate::position::GridPosition;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::session::{EffectOutcome, FinishSummary, MatchProgress, SessionController};
use crate::swap::{GestureStep, Resolution, SwapInteraction, SwapPhase};
use crate::tile::{Tile, TileColor};

/// Work the engine resumes once its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    ResolveSwap,
}

/// Owns the grid, the gesture, the session and the pending continuations,
/// and queues every observable change as an [`EngineEvent`].
pub struct Engine {
    config: EngineConfig,
    rng: Rng,
    grid: TileGrid,
    layout: CellLayout,
    swap: SwapInteraction,
    session: SessionController,
    scheduler: Scheduler<Continuation>,
    pending_resolve: Option<TaskHandle>,
    outbox: Queue<EngineEvent>,
}

impl Engine {
    /// An engine with an empty grid; call [`Engine::populate`] to fill it.
    pub fn new(config: EngineConfig, rng: Rng) -> Result<Self, GridError> {
        let grid = TileGrid::new(config.width, config.height)?;
        if config.palette.is_empty() {
            return Err(GridError::EmptyPalette);
        }
        let layout = CellLayout::new(config.width, config.height, config.cell_size)
            .with_center(config.center);
        Ok(Self {
            session: SessionController::new(config.finish_threshold),
            config,
            rng,
            grid,
            layout,
            swap: SwapInteraction::default(),
            scheduler: Scheduler::new(),
            pending_resolve: None,
            outbox: Queue::new(),
        })
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub const fn layout(&self) -> &CellLayout {
        &self.layout
    }

    pub const fn session(&self) -> &SessionController {
        &self.session
    }

    pub const fn swap_phase(&self) -> SwapPhase {
        self.swap.phase()
    }

    pub fn pending_continuations(&self) -> usize {
        self.scheduler.pending()
    }

    fn emit(&mut self, event: EngineEvent) {
        if let Err(err) = self.outbox.add(event) {
            warn!("Dropped engine event: {err}");
        }
    }

    pub fn pop_event(&mut self) -> Option<EngineEvent> {
        self.outbox.remove().ok()
    }

    /// Publishes every queued event to `bus`, oldest first. Returns how many
    /// were sent.
    pub fn dispatch(&mut self, bus: &mut EventBus) -> usize {
        let mut sent = 0;
        while let Some(event) = self.pop_event() {
            bus.publish(&event);
            sent += 1;
        }
        sent
    }

    /// Refills the whole grid with a fresh match-free layout.
    pub fn populate(&mut self) -> Result<(), GridError> {
        self.grid.populate(&self.config.palette, &mut self.rng)
    }

    pub fn start_session(
        &mut self,
        entry_cost: i64,
        store: &mut impl CurrencyStore,
    ) -> Result<(), SessionError> {
        self.session.start(entry_cost, store)?;
        self.emit(EngineEvent::SessionStarted {
            balance: self.session.balance(),
        });
        Ok(())
    }

    pub fn start_with_difficulty(
        &mut self,
        difficulty: Difficulty,
        store: &mut impl CurrencyStore,
    ) -> Result<(), SessionError> {
        self.start_session(difficulty.entry_cost(), store)
    }

    pub fn pointer_down(&mut self, point: WorldPoint) -> GestureStep {
        let cell = self.layout.cell_at(point);
        let step = self.swap.select(&self.grid, cell);
        if let GestureStep::Selected(origin) = step {
            self.emit(EngineEvent::Selected(origin));
        }
        step
    }

    pub fn pointer_move(&mut self, point: WorldPoint) -> GestureStep {
        let step = self.swap.drag(point);
        if let GestureStep::Dragged { origin, pointer } = step {
            self.emit(EngineEvent::Dragged { origin, pointer });
        }
        step
    }

    /// Ends the gesture. A valid swap is applied now and resolved after the
    /// settle delay.
    pub fn pointer_up(&mut self, point: WorldPoint) -> GestureStep {
        let target = self.layout.cell_at(point);
        let step = self.swap.release(&mut self.grid, target);
        match step {
            GestureStep::Swapped { origin, target } => {
                let handle = self
                    .scheduler
                    .schedule(self.config.settle_delay, Continuation::ResolveSwap);
                self.pending_resolve = Some(handle);
                self.emit(EngineEvent::Swapped { origin, target });
            }
            GestureStep::Returned { origin, .. } => self.emit(EngineEvent::Returned { origin }),
            GestureStep::Ignored | GestureStep::Selected(_) | GestureStep::Dragged { .. } => {}
        }
        step
    }

    /// Moves the engine clock and runs every continuation that came due.
    pub fn advance(&mut self, delta: Duration) {
        for continuation in self.scheduler.advance(delta) {
            match continuation {
                Continuation::ResolveSwap => self.resolve_swap(),
            }
        }
    }

    fn resolve_swap(&mut self) {
        self.pending_resolve = None;
        match self.swap.resolve(&mut self.grid) {
            Resolution::Committed(cleared) => self.record_matches(cleared),
            Resolution::Reverted { origin, target } => {
                self.emit(EngineEvent::SwapReverted { origin, target });
            }
            Resolution::Stale => debug!("Swap continuation fired with nothing to resolve"),
        }
    }

    fn record_matches(&mut self, cleared: MatchesCleared) {
        self.emit(EngineEvent::MatchesCleared(cleared));
        match self.session.on_match_completed() {
            MatchProgress::FinishSequenceStarted => self.emit(EngineEvent::FinishSequenceStarted),
            MatchProgress::Counted(count) => debug!("Match count is now {count}"),
            MatchProgress::Ignored => {}
        }
    }

    /// One find/remove pass, for tiles introduced from outside a gesture.
    pub fn resolve_matches(&mut self) -> Option<MatchesCleared> {
        let matched = self.grid.find_matches();
        let cleared = self.grid.remove_matches(&matched)?;
        self.record_matches(cleared.clone());
        Some(cleared)
    }

    pub fn place_tile(&mut self, cell: GridPosition, color: TileColor) -> Result<(), GridError> {
        self.grid.place(cell, Tile::new(color))?;
        self.emit(EngineEvent::TilePlaced(cell));
        Ok(())
    }

    /// Asks `spawner` for a new piece at the lowest free cell. Returns the
    /// cell, or `None` when the grid is full.
    pub fn request_spawn(&mut self, spawner: &mut impl Spawner) -> Option<GridPosition> {
        let Some(cell) = self.grid.find_lowest_free_cell() else {
            debug!("No free cell to spawn into");
            return None;
        };
        spawner.spawn_at(cell);
        self.emit(EngineEvent::SpawnRequested(cell));
        Some(cell)
    }

    pub fn apply_effect(&mut self, effect: Effect) -> EffectOutcome {
        let outcome = self.session.apply_effect(effect);
        self.report_score(outcome);
        outcome
    }

    pub fn hit_box(&mut self, target: &EffectBox) -> EffectOutcome {
        let outcome = self.session.hit_box(target);
        self.report_score(outcome);
        outcome
    }

    fn report_score(&mut self, outcome: EffectOutcome) {
        if let EffectOutcome::Applied { after, .. } = outcome {
            self.emit(EngineEvent::ScoreChanged(after));
        }
    }

    pub fn trigger_game_end(&mut self, store: &mut impl CurrencyStore) -> Option<FinishSummary> {
        let summary = self.session.trigger_game_end(store)?;
        self.emit(EngineEvent::SessionFinished(summary));
        Some(summary)
    }

    /// Drops any gesture and continuation in flight, empties the grid and
    /// ends the session without a payout.
    pub fn reset(&mut self) {
        if let Some(handle) = self.pending_resolve.take() {
            let cancelled = self.scheduler.cancel(handle);
            debug!("Pending swap resolution cancelled: {cancelled}");
        }
        let defused = self.scheduler.cancel_all();
        self.swap.reset();
        self.grid.clear();
        self.session.reset();
        self.outbox = Queue::new();
        info!("Engine reset, {defused} continuations cancelled");
    }
}
