use core::time::Duration;

use crate::layout::WorldPoint;
use crate::session::DEFAULT_FINISH_THRESHOLD;
use crate::tile::TileColor;

/// Tunables for an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    /// Side of one cell in world units.
    pub cell_size: f32,
    /// World position of the grid's middle.
    pub center: WorldPoint,
    pub palette: Vec<TileColor>,
    /// Completed matches needed to start the finish sequence.
    pub finish_threshold: u32,
    /// Wait between an optimistic swap and its commit or revert.
    pub settle_delay: Duration,
    /// How long a tile takes to slide to a new cell.
    pub return_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cell_size: 1.0,
            center: WorldPoint::default(),
            palette: TileColor::palette(),
            finish_threshold: DEFAULT_FINISH_THRESHOLD,
            settle_delay: Duration::from_millis(250),
            return_delay: Duration::from_millis(200),
        }
    }
}
