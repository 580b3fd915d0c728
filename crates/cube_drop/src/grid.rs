use bevy::prelude::*;

mod components;
mod input;
mod sync;

pub use components::*;
use input::handle_input;
use sync::{despawn_cubes, move_cubes, react_to_board, spawn_cubes};

use crate::game::{GameState, PlaySet};

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisibleBoard>()
            .add_systems(OnEnter(GameState::Playing), spawn_cubes)
            .add_systems(Update, handle_input.in_set(PlaySet::Input))
            .add_systems(
                Update,
                (react_to_board, move_cubes).chain().in_set(PlaySet::React),
            )
            .add_systems(OnExit(GameState::Playing), despawn_cubes);
    }
}
