use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::TileGrid;
use crate::position::GridPosition;
use crate::tile::TileColor;

pub const MIN_RUN_LENGTH: usize = 3;

/// Deduplicated set of matched positions, ordered by column then row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet(BTreeSet<GridPosition>);

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.0.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<GridPosition> for MatchSet {
    fn from_iter<T: IntoIterator<Item = GridPosition>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Emitted once per group of simultaneously removed tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchesCleared {
    pub positions: Vec<GridPosition>,
}

impl MatchesCleared {
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Default)]
struct Streak {
    color: Option<TileColor>,
    members: Vec<GridPosition>,
}

impl Streak {
    fn push(&mut self, pos: GridPosition, color: Option<TileColor>, found: &mut BTreeSet<GridPosition>) {
        if color.is_some() && color == self.color {
            self.members.push(pos);
            return;
        }
        self.flush(found);
        self.color = color;
        if color.is_some() {
            self.members.push(pos);
        }
    }

    fn flush(&mut self, found: &mut BTreeSet<GridPosition>) {
        if self.members.len() >= MIN_RUN_LENGTH {
            if let (Some(first), Some(color)) = (self.members.first(), self.color) {
                debug!(
                    "Run of {} {color} tiles starting at {first}",
                    self.members.len()
                );
            }
            found.extend(self.members.drain(..));
        }
        self.members.clear();
    }
}

impl TileGrid {
    /// Every occupied cell that belongs to a horizontal or vertical run of at
    /// least three same-colored tiles.
    pub fn find_matches(&self) -> MatchSet {
        let (width, height) = (self.width as i32, self.height as i32);
        let mut found = BTreeSet::new();

        for y in 0..height {
            self.scan_line((0..width).map(|x| GridPosition::new(x, y)), &mut found);
        }
        for x in 0..width {
            self.scan_line((0..height).map(|y| GridPosition::new(x, y)), &mut found);
        }

        MatchSet(found)
    }

    fn scan_line(
        &self,
        line: impl Iterator<Item = GridPosition>,
        found: &mut BTreeSet<GridPosition>,
    ) {
        let mut streak = Streak::default();
        for pos in line {
            streak.push(pos, self.color_at(pos), found);
        }
        streak.flush(found);
    }

    /// Clears the cells of a match set. Returns `None` when nothing was
    /// removed, else a single notification covering the whole group.
    pub fn remove_matches(&mut self, matched: &MatchSet) -> Option<MatchesCleared> {
        if matched.is_empty() {
            return None;
        }

        let mut positions = Vec::with_capacity(matched.len());
        for pos in matched.iter() {
            match self.take(pos) {
                Ok(Some(_)) => positions.push(pos),
                Ok(None) => debug!("Matched cell {pos} was already free"),
                Err(err) => warn!("Skipping matched cell: {err}"),
            }
        }

        if positions.is_empty() {
            debug!("Match set held no tiles to remove");
            return None;
        }
        debug!("Removed {} matched tiles", positions.len());
        Some(MatchesCleared { positions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileColor::{Blue, Green, Red, Yellow};

    fn row(colors: &[TileColor]) -> TileGrid {
        let cells: Vec<Option<TileColor>> = colors.iter().copied().map(Some).collect();
        TileGrid::from_rows(&[cells]).expect("valid row")
    }

    fn positions(cells: &[(i32, i32)]) -> MatchSet {
        cells.iter().copied().map(GridPosition::from).collect()
    }

    #[test]
    fn run_at_row_start_is_found() {
        let grid = row(&[Red, Red, Red, Blue]);
        assert_eq!(
            grid.find_matches(),
            positions(&[(0, 0), (1, 0), (2, 0)]),
            "first three cells"
        );
    }

    #[test]
    fn broken_run_is_not_a_match() {
        let grid = row(&[Red, Red, Blue, Red]);
        assert!(grid.find_matches().is_empty(), "no run of three");
    }

    #[test]
    fn run_reaching_the_last_cell_is_kept_whole() {
        let grid = row(&[Red, Red, Red, Red]);
        assert_eq!(grid.find_matches().len(), 4, "all four cells");

        let grid = row(&[Blue, Green, Green, Green]);
        assert_eq!(
            grid.find_matches(),
            positions(&[(1, 0), (2, 0), (3, 0)]),
            "run ending on the boundary"
        );
    }

    #[test]
    fn free_cells_break_runs() {
        let grid = TileGrid::from_rows(&[vec![Some(Red), Some(Red), None, Some(Red), Some(Red)]])
            .expect("valid row");
        assert!(grid.find_matches().is_empty(), "gap splits the run");
    }

    #[test]
    fn crossing_runs_share_cells_once() {
        let grid = TileGrid::from_rows(&[
            vec![Some(Blue), Some(Red), Some(Yellow)],
            vec![Some(Red), Some(Red), Some(Red)],
            vec![Some(Green), Some(Red), Some(Blue)],
        ])
        .expect("valid grid");
        let matches = grid.find_matches();
        assert_eq!(matches.len(), 5, "plus shape counts the center once");
        assert!(matches.contains(GridPosition::new(1, 1)), "center");
        assert!(matches.contains(GridPosition::new(1, 2)), "top arm");
    }

    #[test]
    fn vertical_runs_are_found() {
        let grid = TileGrid::from_rows(&[
            vec![Some(Yellow), Some(Blue)],
            vec![Some(Yellow), Some(Red)],
            vec![Some(Yellow), Some(Blue)],
        ])
        .expect("valid grid");
        assert_eq!(
            grid.find_matches(),
            positions(&[(0, 0), (0, 1), (0, 2)]),
            "left column"
        );
    }

    #[test]
    fn removing_matches_empties_cells_and_keeps_dimensions() {
        let mut grid = row(&[Green, Red, Red, Red, Blue]);
        let matched = grid.find_matches();
        let cleared = grid.remove_matches(&matched).expect("non-empty match set");
        assert_eq!(cleared.count(), 3, "one notification for the group");
        assert_eq!((grid.width(), grid.height()), (5, 1), "dimensions unchanged");
        for pos in matched.iter() {
            assert_eq!(grid.tile(pos), None, "{pos} emptied");
        }
        assert_eq!(grid.occupied_count(), 2, "unmatched tiles remain");
    }

    #[test]
    fn removing_nothing_is_a_no_op() {
        let mut grid = row(&[Green, Red, Blue]);
        let before = grid.clone();
        assert_eq!(grid.remove_matches(&MatchSet::default()), None, "no group");
        assert_eq!(grid, before, "grid untouched");
    }

    #[test]
    fn stale_positions_are_tolerated() {
        let mut grid = row(&[Green, Red, Blue]);
        let matched = positions(&[(0, 0), (7, 7)]);
        let cleared = grid.remove_matches(&matched).expect("non-empty match set");
        assert_eq!(cleared.positions, vec![GridPosition::new(0, 0)], "only real cells");
    }

    #[test]
    fn a_set_of_only_stale_cells_clears_nothing() {
        let mut grid = TileGrid::from_rows(&[vec![None, Some(Red), None]]).expect("valid row");
        let before = grid.clone();
        let matched = positions(&[(0, 0), (2, 0), (9, 9)]);
        assert_eq!(grid.remove_matches(&matched), None, "no group to report");
        assert_eq!(grid, before, "grid untouched");
    }
}
