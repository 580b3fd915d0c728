use bevy::prelude::*;

mod app;
mod ball;
mod game;
mod grid;
mod input;
mod screen;

use ball::BallPlugin;
use game::GamePlugin;
use grid::GridPlugin;
use screen::ScreenPlugin;

pub fn run() {
    app::default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(GamePlugin)
        .add_plugins(GridPlugin)
        .add_plugins(BallPlugin)
        .add_plugins(ScreenPlugin)
        .init_state::<game::GameState>()
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
