use fastrand::Rng;
use tracing::debug;

use super::TileGrid;
use crate::error::GridError;
use crate::position::GridPosition;
use crate::tile::{Tile, TileColor};

impl TileGrid {
    /// A full grid whose colors avoid runs of three against the two cells to
    /// the left and the two cells below.
    pub fn populated(
        width: u32,
        height: u32,
        palette: &[TileColor],
        rng: &mut Rng,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height)?;
        grid.populate(palette, rng)?;
        Ok(grid)
    }

    /// Refills every cell, columns left to right and each column bottom-up.
    ///
    /// Only two cells back are checked, so longer patterns can still line up
    /// by chance.
    pub fn populate(&mut self, palette: &[TileColor], rng: &mut Rng) -> Result<(), GridError> {
        if palette.is_empty() {
            return Err(GridError::EmptyPalette);
        }
        self.clear();
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let pos = GridPosition::new(x, y);
                let color = self.pick_color(pos, palette, rng);
                self.place(pos, Tile::new(color))?;
            }
        }
        debug!("Populated {}x{} grid", self.width, self.height);
        Ok(())
    }

    fn pick_color(&self, pos: GridPosition, palette: &[TileColor], rng: &mut Rng) -> TileColor {
        let mut candidates = palette.to_vec();
        for (first, second) in [
            (pos.offset(-1, 0), pos.offset(-2, 0)),
            (pos.offset(0, -1), pos.offset(0, -2)),
        ] {
            let (a, b) = (self.color_at(first), self.color_at(second));
            if let Some(repeated) = a.filter(|_| a == b) {
                candidates.retain(|color| *color != repeated);
            }
        }

        let pool = if candidates.is_empty() {
            debug!("No safe color left at {pos}, picking from the full palette");
            palette
        } else {
            candidates.as_slice()
        };
        // Callers guarantee a non-empty palette, Red only covers the impossible case.
        rng.choice(pool.iter().copied()).unwrap_or(TileColor::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileColor::{Blue, Green, Red};

    fn has_two_back_run(grid: &TileGrid) -> Option<GridPosition> {
        grid.positions().find(|pos| {
            let Some(color) = grid.color_at(*pos) else {
                return false;
            };
            let left = [pos.offset(-1, 0), pos.offset(-2, 0)];
            let below = [pos.offset(0, -1), pos.offset(0, -2)];
            [left, below]
                .iter()
                .any(|pair| pair.iter().all(|p| grid.color_at(*p) == Some(color)))
        })
    }

    #[test]
    fn populated_grids_are_full_without_two_back_runs() {
        let mut rng = Rng::with_seed(7);
        for _ in 0..200 {
            let grid = TileGrid::populated(6, 6, &TileColor::palette(), &mut rng)
                .expect("valid dimensions");
            assert!(grid.is_full(), "every cell is populated");
            assert_eq!(
                has_two_back_run(&grid),
                None,
                "no run of three at population time:\n{grid}"
            );
        }
    }

    #[test]
    fn four_color_grids_start_without_matches() {
        let mut rng = Rng::with_seed(99);
        for _ in 0..200 {
            let grid = TileGrid::populated(5, 5, &TileColor::palette(), &mut rng)
                .expect("valid dimensions");
            assert!(grid.find_matches().is_empty(), "no initial match:\n{grid}");
        }
    }

    #[test]
    fn exhausted_candidates_fall_back_to_the_palette() {
        let mut rng = Rng::with_seed(1);
        let grid = TileGrid::populated(4, 1, &[Red], &mut rng).expect("valid dimensions");
        assert!(grid.is_full(), "fallback still fills the row");
        assert_eq!(
            grid.find_matches().len(),
            4,
            "a single-color palette has to accept the match"
        );
    }

    #[test]
    fn three_color_palettes_respect_both_axes() {
        let mut rng = Rng::with_seed(3);
        let grid =
            TileGrid::populated(8, 8, &[Red, Blue, Green], &mut rng).expect("valid dimensions");
        assert_eq!(has_two_back_run(&grid), None, "no run of three:\n{grid}");
    }

    #[test]
    fn empty_palettes_are_rejected() {
        let mut rng = Rng::with_seed(0);
        assert_eq!(
            TileGrid::populated(3, 3, &[], &mut rng),
            Err(GridError::EmptyPalette),
            "empty palette"
        );
    }
}
