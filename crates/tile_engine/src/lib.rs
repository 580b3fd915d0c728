//! Tile grid match engine and play-session controller.
//!
//! The [`Engine`] ties a [`TileGrid`] to a drag-to-swap gesture and a
//! [`SessionController`], and reports what happened through [`EngineEvent`]s.
//! Nothing here depends on a renderer; the game drives it with world-space
//! pointer positions and clock ticks.

pub mod collaborators;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod layout;
pub mod position;
pub mod scheduler;
pub mod session;
pub mod swap;
pub mod tile;

pub use collaborators::{CurrencyStore, Presenter, Spawner, Wallet};
pub use config::EngineConfig;
pub use effects::{Difficulty, Effect, EffectBox, EffectKind};
pub use engine::{Continuation, Engine};
pub use error::{GridError, SessionError};
pub use events::{EngineEvent, EventBus, Observer, PresenterLink, SpawnerLink, SubscriptionId};
pub use grid::{CellState, MatchSet, MatchesCleared, TileGrid};
pub use layout::{CellLayout, WorldPoint};
pub use position::GridPosition;
pub use scheduler::{Scheduler, TaskHandle};
pub use session::{EffectOutcome, FinishSummary, MatchProgress, SessionController, SessionState};
pub use swap::{GestureStep, Resolution, SwapInteraction, SwapPhase};
pub use tile::{Tile, TileColor};

pub mod prelude {
    pub use crate::{
        CurrencyStore, Difficulty, Effect, EffectBox, EffectKind, EffectOutcome, Engine,
        EngineConfig, EngineEvent, GridPosition, SessionError, TileColor, Wallet, WorldPoint,
    };
}
