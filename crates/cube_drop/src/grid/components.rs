use bevy::prelude::*;
use bevy::utils::HashMap;
use tile_engine::{CellLayout, GridPosition, TileColor, WorldPoint};

pub const TILE_FILL: f32 = 0.9; // share of the cell a cube covers
pub const SELECTED_SCALE: f32 = 1.12;
pub const DRAG_Z: f32 = 2.0;

#[derive(Component)]
pub struct CubeSprite;

/// Cube sprites by the cell they currently stand for.
#[derive(Resource, Default)]
pub struct VisibleBoard(pub HashMap<GridPosition, Entity>);

#[derive(Component)]
pub struct MoveTo {
    pub target: Vec2,
    pub speed: f32,
}

pub fn cube_color(color: TileColor) -> Color {
    match color {
        TileColor::Red => Color::srgb(0.9, 0.25, 0.25),
        TileColor::Green => Color::srgb(0.3, 0.8, 0.35),
        TileColor::Blue => Color::srgb(0.25, 0.45, 0.95),
        TileColor::Yellow => Color::srgb(0.95, 0.85, 0.25),
    }
}

pub fn cell_world(layout: &CellLayout, cell: GridPosition) -> Vec2 {
    let WorldPoint { x, y } = layout.cell_center(cell);
    Vec2::new(x, y)
}

pub fn world_point(position: Vec2) -> WorldPoint {
    WorldPoint::new(position.x, position.y)
}
