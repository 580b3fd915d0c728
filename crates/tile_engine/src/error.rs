use thiserror::Error;

use crate::position::GridPosition;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("Position {0} is outside the grid")]
    OutOfBounds(GridPosition),

    #[error("Positions {0} and {1} are not adjacent")]
    NotAdjacent(GridPosition, GridPosition),

    #[error("Cell {0} is already occupied")]
    Occupied(GridPosition),

    #[error("Cannot populate a grid from an empty palette")]
    EmptyPalette,

    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Insufficient funds: entry costs {required} coins, {available} available")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("A session is already running")]
    AlreadyStarted,
}
