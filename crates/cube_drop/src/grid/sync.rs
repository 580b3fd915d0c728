use bevy::prelude::*;
use tile_engine::{CellLayout, EngineEvent, GridPosition, TileColor};

use super::components::{
    CubeSprite, DRAG_Z, MoveTo, SELECTED_SCALE, TILE_FILL, VisibleBoard, cell_world, cube_color,
};
use crate::game::{Board, BoardEvent};

fn spawn_cube(
    commands: &mut Commands,
    layout: &CellLayout,
    cell: GridPosition,
    color: TileColor,
) -> Entity {
    commands
        .spawn((
            CubeSprite,
            Sprite::from_color(cube_color(color), Vec2::splat(layout.cell_size * TILE_FILL)),
            Transform::from_translation(cell_world(layout, cell).extend(1.0)),
        ))
        .id()
}

pub fn spawn_cubes(mut commands: Commands, board: Res<Board>, mut visible: ResMut<VisibleBoard>) {
    let layout = *board.layout();
    visible.0.clear();
    for (cell, tile) in board.grid().iter() {
        let entity = spawn_cube(&mut commands, &layout, cell, tile.color);
        visible.0.insert(cell, entity);
    }
}

fn send_home(
    commands: &mut Commands,
    cubes: &mut Query<&mut Transform, With<CubeSprite>>,
    entity: Entity,
    target: Vec2,
    speed: f32,
) {
    if let Ok(mut transform) = cubes.get_mut(entity) {
        transform.scale = Vec3::ONE;
    }
    commands.entity(entity).insert(MoveTo { target, speed });
}

/// Mirrors engine events onto the cube sprites.
pub fn react_to_board(
    mut commands: Commands,
    mut events: EventReader<BoardEvent>,
    board: Res<Board>,
    mut visible: ResMut<VisibleBoard>,
    mut cubes: Query<&mut Transform, With<CubeSprite>>,
) {
    let layout = *board.layout();
    let move_secs = board.config().return_delay.as_secs_f32().max(f32::EPSILON);
    let speed = layout.cell_size / move_secs;

    for BoardEvent(event) in events.read() {
        match event {
            EngineEvent::Selected(cell) => {
                if let Some(mut transform) =
                    visible.0.get(cell).and_then(|entity| cubes.get_mut(*entity).ok())
                {
                    transform.scale = Vec3::splat(SELECTED_SCALE);
                }
            }
            EngineEvent::Dragged { origin, pointer } => {
                if let Some(mut transform) =
                    visible.0.get(origin).and_then(|entity| cubes.get_mut(*entity).ok())
                {
                    transform.translation = Vec3::new(pointer.x, pointer.y, DRAG_Z);
                }
            }
            EngineEvent::Returned { origin } => {
                if let Some(entity) = visible.0.get(origin).copied() {
                    send_home(&mut commands, &mut cubes, entity, cell_world(&layout, *origin), speed);
                }
            }
            EngineEvent::Swapped { origin, target }
            | EngineEvent::SwapReverted { origin, target } => {
                let from_origin = visible.0.remove(origin);
                let from_target = visible.0.remove(target);
                for (cell, entity) in [(*target, from_origin), (*origin, from_target)] {
                    if let Some(entity) = entity {
                        visible.0.insert(cell, entity);
                        send_home(&mut commands, &mut cubes, entity, cell_world(&layout, cell), speed);
                    }
                }
            }
            EngineEvent::MatchesCleared(cleared) => {
                for cell in &cleared.positions {
                    if let Some(entity) = visible.0.remove(cell) {
                        commands.entity(entity).despawn_recursive();
                    }
                }
            }
            EngineEvent::TilePlaced(cell) => {
                if let Some(tile) = board.grid().tile(*cell) {
                    let entity = spawn_cube(&mut commands, &layout, *cell, tile.color);
                    visible.0.insert(*cell, entity);
                }
            }
            _ => {}
        }
    }
}

pub fn move_cubes(
    mut commands: Commands,
    time: Res<Time>,
    mut moves: Query<(Entity, &mut Transform, &MoveTo)>,
) {
    for (entity, mut transform, move_to) in &mut moves {
        let remaining = move_to.target - transform.translation.truncate();
        let step = move_to.speed * time.delta_secs();
        if remaining.length() <= step {
            transform.translation = move_to.target.extend(1.0);
            commands.entity(entity).remove::<MoveTo>();
        } else {
            transform.translation += (remaining.normalize() * step).extend(0.0);
        }
    }
}

pub fn despawn_cubes(
    mut commands: Commands,
    cubes: Query<Entity, With<CubeSprite>>,
    mut visible: ResMut<VisibleBoard>,
) {
    for entity in &cubes {
        commands.entity(entity).despawn_recursive();
    }
    visible.0.clear();
}
