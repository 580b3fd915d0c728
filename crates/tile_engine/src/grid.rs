use core::fmt::{self, Display, Formatter};

use tracing::debug;

use crate::error::GridError;
use crate::position::GridPosition;
use crate::tile::{Tile, TileColor};

mod matching;
mod spawning;

pub use matching::{MatchSet, MatchesCleared};

/// What a read of an in-bounds cell finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Free,
    Occupied(Tile),
}

impl CellState {
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Fixed-size grid of optional tiles, stored row-major with row 0 at the
/// bottom.
///
/// Reads outside the grid answer "absent"; writes outside the grid are
/// rejected with [`GridError::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    /// An empty grid with every cell free.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        })
    }

    /// Builds a grid from rows listed bottom row first. Short rows leave the
    /// remaining cells free.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, GridError>
    where
        R: AsRef<[Option<TileColor>]>,
    {
        let height = rows.len() as u32;
        let width = rows
            .iter()
            .map(|row| row.as_ref().len())
            .max()
            .unwrap_or_default() as u32;
        let mut grid = Self::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, color) in row.as_ref().iter().enumerate() {
                if let Some(color) = color {
                    grid.place(GridPosition::new(x as i32, y as i32), Tile::new(*color))?;
                }
            }
        }
        Ok(grid)
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    const fn index(&self, pos: GridPosition) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// The tile at `pos`, or `None` when the cell is free or out of bounds.
    pub fn tile(&self, pos: GridPosition) -> Option<&Tile> {
        self.index(pos)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
    }

    pub fn color_at(&self, pos: GridPosition) -> Option<TileColor> {
        self.tile(pos).map(|tile| tile.color)
    }

    /// `None` for out-of-bounds positions.
    pub fn cell_state(&self, pos: GridPosition) -> Option<CellState> {
        let cell = self.index(pos).and_then(|index| self.cells.get(index))?;
        Some(cell.map_or(CellState::Free, CellState::Occupied))
    }

    fn cell_mut(&mut self, pos: GridPosition) -> Result<&mut Option<Tile>, GridError> {
        self.index(pos)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(GridError::OutOfBounds(pos))
    }

    /// Puts a tile into a free cell.
    pub fn place(&mut self, pos: GridPosition, tile: Tile) -> Result<(), GridError> {
        let cell = self.cell_mut(pos)?;
        if cell.is_some() {
            return Err(GridError::Occupied(pos));
        }
        *cell = Some(tile);
        Ok(())
    }

    /// Empties a cell, returning what it held.
    pub fn take(&mut self, pos: GridPosition) -> Result<Option<Tile>, GridError> {
        Ok(self.cell_mut(pos)?.take())
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub const fn is_adjacent(a: GridPosition, b: GridPosition) -> bool {
        a.is_adjacent(b)
    }

    /// Exchanges the contents of two adjacent cells, free cells included.
    ///
    /// Calling it twice with the same pair restores the previous grid.
    pub fn try_swap(&mut self, a: GridPosition, b: GridPosition) -> Result<(), GridError> {
        let first = self.index(a).ok_or(GridError::OutOfBounds(a))?;
        let second = self.index(b).ok_or(GridError::OutOfBounds(b))?;
        if !a.is_adjacent(b) {
            return Err(GridError::NotAdjacent(a, b));
        }
        self.cells.swap(first, second);
        debug!("Swapped cells {a} and {b}");
        Ok(())
    }

    /// The first free cell scanning rows bottom-up, each row left to right.
    pub fn find_lowest_free_cell(&self) -> Option<GridPosition> {
        self.positions()
            .find(|pos| self.cell_state(*pos).is_some_and(CellState::is_free))
    }

    /// Every in-bounds position, bottom row first.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPosition::new(x, y)))
    }

    /// Occupied cells with their tiles, bottom row first.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, Tile)> + '_ {
        self.positions()
            .filter_map(|pos| self.tile(pos).map(|tile| (pos, *tile)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

impl Display for TileGrid {
    /// Top row first, one letter per tile and `.` for free cells.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in (0..self.height as i32).rev() {
            for x in 0..self.width as i32 {
                let symbol = match self.color_at(GridPosition::new(x, y)) {
                    Some(TileColor::Red) => 'R',
                    Some(TileColor::Green) => 'G',
                    Some(TileColor::Blue) => 'B',
                    Some(TileColor::Yellow) => 'Y',
                    None => '.',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileColor::{Blue, Green, Red, Yellow};

    fn sample() -> TileGrid {
        TileGrid::from_rows(&[
            vec![Some(Red), Some(Green), Some(Blue)],
            vec![Some(Yellow), None, Some(Red)],
        ])
        .expect("valid grid")
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert_eq!(
            TileGrid::new(0, 3),
            Err(GridError::ZeroSized {
                width: 0,
                height: 3
            }),
            "zero width"
        );
    }

    #[test]
    fn out_of_bounds_reads_are_absent() {
        let grid = sample();
        for pos in [
            GridPosition::new(-1, 0),
            GridPosition::new(0, -1),
            GridPosition::new(3, 0),
            GridPosition::new(0, 2),
        ] {
            assert_eq!(grid.tile(pos), None, "{pos} has no tile");
            assert_eq!(grid.cell_state(pos), None, "{pos} has no state");
        }
        assert_eq!(
            grid.cell_state(GridPosition::new(1, 1)),
            Some(CellState::Free),
            "in-bounds empty cell"
        );
    }

    #[test]
    fn out_of_bounds_writes_are_rejected() {
        let mut grid = sample();
        let before = grid.clone();
        let outside = GridPosition::new(5, 5);
        assert_eq!(
            grid.place(outside, Tile::new(Red)),
            Err(GridError::OutOfBounds(outside)),
            "place outside"
        );
        assert_eq!(
            grid.take(outside),
            Err(GridError::OutOfBounds(outside)),
            "take outside"
        );
        assert_eq!(grid, before, "rejected writes leave the grid untouched");
    }

    #[test]
    fn place_refuses_occupied_cells() {
        let mut grid = sample();
        let pos = GridPosition::new(0, 0);
        assert_eq!(
            grid.place(pos, Tile::new(Blue)),
            Err(GridError::Occupied(pos)),
            "occupied"
        );
        assert!(
            grid.place(GridPosition::new(1, 1), Tile::new(Blue)).is_ok(),
            "free cell accepts a tile"
        );
    }

    #[test]
    fn swapping_twice_restores_the_grid() {
        let mut grid = sample();
        let before = grid.clone();
        let (a, b) = (GridPosition::new(1, 0), GridPosition::new(1, 1));
        grid.try_swap(a, b).expect("adjacent swap");
        assert_eq!(grid.tile(b), Some(&Tile::new(Green)), "tile moved up");
        assert_eq!(grid.tile(a), None, "free cell moved down");
        grid.try_swap(a, b).expect("adjacent swap");
        assert_eq!(grid, before, "second swap is an exact inverse");
    }

    #[test]
    fn swap_validates_bounds_then_adjacency() {
        let mut grid = sample();
        let origin = GridPosition::new(0, 0);
        assert_eq!(
            grid.try_swap(origin, GridPosition::new(-1, 0)),
            Err(GridError::OutOfBounds(GridPosition::new(-1, 0))),
            "outside"
        );
        assert_eq!(
            grid.try_swap(origin, GridPosition::new(1, 1)),
            Err(GridError::NotAdjacent(origin, GridPosition::new(1, 1))),
            "diagonal"
        );
        assert_eq!(
            grid.try_swap(origin, origin),
            Err(GridError::NotAdjacent(origin, origin)),
            "same cell"
        );
    }

    #[test]
    fn lowest_free_cell_scans_bottom_row_first() {
        let mut grid = TileGrid::from_rows(&[
            vec![Some(Red), Some(Green), None],
            vec![None, Some(Blue), Some(Red)],
        ])
        .expect("valid grid");
        assert_eq!(
            grid.find_lowest_free_cell(),
            Some(GridPosition::new(2, 0)),
            "bottom row wins over lower columns"
        );
        grid.place(GridPosition::new(2, 0), Tile::new(Yellow))
            .expect("free cell");
        assert_eq!(
            grid.find_lowest_free_cell(),
            Some(GridPosition::new(0, 1)),
            "next row up"
        );
        grid.place(GridPosition::new(0, 1), Tile::new(Yellow))
            .expect("free cell");
        assert!(grid.is_full(), "every cell occupied");
        assert_eq!(grid.find_lowest_free_cell(), None, "full grid");
    }

    #[test]
    fn display_draws_the_top_row_first() {
        assert_eq!(sample().to_string(), "Y.R\nRGB\n", "rendered grid");
    }
}
