use bevy::prelude::*;

use super::components::world_point;
use crate::game::Board;
use crate::input::{
    just_pressed_world_position, just_released_world_position, pressed_world_position,
};

/// Feeds press, drag and release positions into the engine's swap gesture.
pub fn handle_input(
    mut board: ResMut<Board>,
    windows: Query<&Window>,
    buttons: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
) {
    if let Some(position) = just_pressed_world_position(&buttons, &touch_input, &windows, &camera_q)
    {
        board.pointer_down(world_point(position));
    } else if let Some(position) =
        just_released_world_position(&buttons, &touch_input, &windows, &camera_q)
    {
        board.pointer_up(world_point(position));
    } else if let Some(position) =
        pressed_world_position(&buttons, &touch_input, &windows, &camera_q)
    {
        board.pointer_move(world_point(position));
    }
}
