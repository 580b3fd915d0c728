use bevy::prelude::*;

fn to_world(camera: &Query<(&Camera, &GlobalTransform)>, screen: Vec2) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;
    camera
        .viewport_to_world(camera_transform, screen)
        .map(|ray| ray.origin.truncate())
        .ok()
}

fn cursor(windows: &Query<&Window>) -> Option<Vec2> {
    windows.get_single().ok()?.cursor_position()
}

pub fn just_pressed_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let screen = if button_input.just_pressed(MouseButton::Left) {
        cursor(windows)?
    } else {
        touch_input.iter_just_pressed().next()?.position()
    };
    to_world(camera, screen)
}

/// Where the pointer is while the button or finger stays down.
pub fn pressed_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let screen = if button_input.pressed(MouseButton::Left) {
        cursor(windows)?
    } else {
        touch_input.iter().next()?.position()
    };
    to_world(camera, screen)
}

pub fn just_released_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let screen = if button_input.just_released(MouseButton::Left) {
        cursor(windows)?
    } else {
        touch_input.iter_just_released().next()?.position()
    };
    to_world(camera, screen)
}
