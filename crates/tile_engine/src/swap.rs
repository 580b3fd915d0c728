use tracing::debug;

use crate::error::GridError;
use crate::grid::{MatchesCleared, TileGrid};
use crate::layout::WorldPoint;
use crate::position::GridPosition;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SwapPhase {
    #[default]
    Idle,
    Selected {
        origin: GridPosition,
    },
    Dragging {
        origin: GridPosition,
        pointer: WorldPoint,
    },
    Resolving {
        origin: GridPosition,
        target: GridPosition,
    },
}

/// What a single pointer event did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureStep {
    Ignored,
    Selected(GridPosition),
    Dragged {
        origin: GridPosition,
        pointer: WorldPoint,
    },
    /// The release point was unusable; the tile goes back to `origin` and the
    /// grid is untouched.
    Returned {
        origin: GridPosition,
        reason: GridError,
    },
    /// The swap is applied and waits for its resolution.
    Swapped {
        origin: GridPosition,
        target: GridPosition,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Committed(MatchesCleared),
    Reverted {
        origin: GridPosition,
        target: GridPosition,
    },
    /// Nothing was waiting to resolve.
    Stale,
}

/// Turns select / drag / release events into validated grid swaps.
///
/// Only `Idle` accepts a new selection, which keeps gestures strictly
/// serialized while a swap is resolving.
#[derive(Debug, Clone, Default)]
pub struct SwapInteraction {
    phase: SwapPhase,
}

impl SwapInteraction {
    pub const fn phase(&self) -> SwapPhase {
        self.phase
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, SwapPhase::Idle)
    }

    pub const fn origin(&self) -> Option<GridPosition> {
        match self.phase {
            SwapPhase::Idle => None,
            SwapPhase::Selected { origin }
            | SwapPhase::Dragging { origin, .. }
            | SwapPhase::Resolving { origin, .. } => Some(origin),
        }
    }

    pub fn reset(&mut self) {
        self.phase = SwapPhase::Idle;
    }

    pub fn select(&mut self, grid: &TileGrid, cell: GridPosition) -> GestureStep {
        if !self.is_idle() {
            debug!("Ignoring selection at {cell}, gesture in progress");
            return GestureStep::Ignored;
        }
        if grid.tile(cell).is_none() {
            return GestureStep::Ignored;
        }
        debug!("Selected tile at {cell}");
        self.phase = SwapPhase::Selected { origin: cell };
        GestureStep::Selected(cell)
    }

    pub fn drag(&mut self, pointer: WorldPoint) -> GestureStep {
        match self.phase {
            SwapPhase::Selected { origin } | SwapPhase::Dragging { origin, .. } => {
                self.phase = SwapPhase::Dragging { origin, pointer };
                GestureStep::Dragged { origin, pointer }
            }
            SwapPhase::Idle | SwapPhase::Resolving { .. } => GestureStep::Ignored,
        }
    }

    /// Ends the drag over `target`. Valid targets are swapped right away; the
    /// caller resolves them once the move has settled.
    pub fn release(&mut self, grid: &mut TileGrid, target: GridPosition) -> GestureStep {
        let origin = match self.phase {
            SwapPhase::Selected { origin } | SwapPhase::Dragging { origin, .. } => origin,
            SwapPhase::Idle | SwapPhase::Resolving { .. } => return GestureStep::Ignored,
        };

        let checked = if grid.contains(target) {
            grid.try_swap(origin, target)
        } else {
            Err(GridError::OutOfBounds(target))
        };

        match checked {
            Ok(()) => {
                self.phase = SwapPhase::Resolving { origin, target };
                GestureStep::Swapped { origin, target }
            }
            Err(reason) => {
                debug!("Returning tile to {origin}: {reason}");
                self.phase = SwapPhase::Idle;
                GestureStep::Returned { origin, reason }
            }
        }
    }

    /// Keeps the pending swap if it produced a match, otherwise swaps back.
    /// Always ends in `Idle`.
    pub fn resolve(&mut self, grid: &mut TileGrid) -> Resolution {
        let SwapPhase::Resolving { origin, target } = self.phase else {
            return Resolution::Stale;
        };
        self.phase = SwapPhase::Idle;

        let matched = grid.find_matches();
        if let Some(cleared) = grid.remove_matches(&matched) {
            return Resolution::Committed(cleared);
        }

        if let Err(err) = grid.try_swap(origin, target) {
            // Both cells were validated on release and the grid never resizes.
            debug!("Undo of {origin} <-> {target} failed: {err}");
        }
        debug!("No match after swapping {origin} and {target}, reverted");
        Resolution::Reverted { origin, target }
    }
}
