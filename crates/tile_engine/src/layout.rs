use crate::position::GridPosition;

/// A point in world space, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for WorldPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Maps world points to cells of a grid centered on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
    pub center: WorldPoint,
}

impl CellLayout {
    pub const fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            center: WorldPoint::new(0.0, 0.0),
        }
    }

    #[must_use]
    pub const fn with_center(mut self, center: WorldPoint) -> Self {
        self.center = center;
        self
    }

    fn half_extent(&self) -> WorldPoint {
        WorldPoint::new(
            self.width as f32 * self.cell_size / 2.0,
            self.height as f32 * self.cell_size / 2.0,
        )
    }

    /// The cell under `point`. The result may lie outside the grid; callers
    /// check bounds against the grid.
    pub fn cell_at(&self, point: WorldPoint) -> GridPosition {
        let half = self.half_extent();
        let local_x = point.x - self.center.x + half.x;
        let local_y = point.y - self.center.y + half.y;
        GridPosition::new(
            (local_x / self.cell_size).floor() as i32,
            (local_y / self.cell_size).floor() as i32,
        )
    }

    /// World position of the middle of a cell.
    pub fn cell_center(&self, pos: GridPosition) -> WorldPoint {
        let half = self.half_extent();
        WorldPoint::new(
            (pos.x as f32 + 0.5).mul_add(self.cell_size, self.center.x - half.x),
            (pos.y as f32 + 0.5).mul_add(self.cell_size, self.center.y - half.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centers_map_back_to_their_cell() {
        let layout = CellLayout::new(5, 4, 64.0).with_center(WorldPoint::new(10.0, -30.0));
        for x in 0..5 {
            for y in 0..4 {
                let pos = GridPosition::new(x, y);
                assert_eq!(layout.cell_at(layout.cell_center(pos)), pos, "round trip {pos}");
            }
        }
    }

    #[test]
    fn origin_cell_sits_bottom_left() {
        let layout = CellLayout::new(2, 2, 1.0);
        assert_eq!(
            layout.cell_center(GridPosition::new(0, 0)),
            WorldPoint::new(-0.5, -0.5),
            "bottom-left center"
        );
        assert_eq!(
            layout.cell_at(WorldPoint::new(0.9, 0.1)),
            GridPosition::new(1, 1),
            "top-right quadrant"
        );
    }

    #[test]
    fn points_off_the_grid_resolve_outside() {
        let layout = CellLayout::new(3, 3, 1.0);
        assert_eq!(
            layout.cell_at(WorldPoint::new(-1.6, 0.0)),
            GridPosition::new(-1, 1),
            "left of the grid"
        );
        assert_eq!(
            layout.cell_at(WorldPoint::new(0.0, 1.6)),
            GridPosition::new(1, 3),
            "above the grid"
        );
    }
}
