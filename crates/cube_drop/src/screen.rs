use bevy::color::palettes::css::{GOLD, GREEN, ORANGE_RED, YELLOW};
use bevy::prelude::*;
use strum::IntoEnumIterator;
use tile_engine::{Difficulty, Wallet};

use crate::game::{
    Board, GameState, PlayerWallet, SelectedDifficulty, SessionHud, begin_session,
};
use crate::input::just_pressed_world_position;

/// Welcome, HUD, no-funds and finish summary screens.
pub struct ScreenPlugin;

#[derive(Component)]
struct WelcomeScreen;

/// Lists the difficulties; rewritten when the choice or the wallet changes.
#[derive(Component)]
struct DifficultyMenu;

#[derive(Component)]
struct WalletLine;

#[derive(Component)]
struct Hud;

#[derive(Component)]
struct NoFundsScreen;

#[derive(Component)]
struct FinishedScreen;

const DIFFICULTY_KEYS: [KeyCode; 3] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Welcome), spawn_welcome_screen)
            .add_systems(
                Update,
                (
                    choose_difficulty,
                    update_difficulty_menu,
                    update_wallet_line,
                    handle_welcome_input,
                )
                    .chain()
                    .run_if(in_state(GameState::Welcome)),
            )
            .add_systems(OnExit(GameState::Welcome), despawn_screen::<WelcomeScreen>)
            .add_systems(OnEnter(GameState::Playing), spawn_hud)
            .add_systems(Update, update_hud.run_if(in_state(GameState::Playing)))
            .add_systems(OnExit(GameState::Playing), despawn_screen::<Hud>)
            .add_systems(OnEnter(GameState::NoFunds), spawn_no_funds_screen)
            .add_systems(OnExit(GameState::NoFunds), despawn_screen::<NoFundsScreen>)
            .add_systems(OnEnter(GameState::Finished), spawn_finished_screen)
            .add_systems(
                Update,
                handle_finished_input.run_if(in_state(GameState::Finished)),
            )
            .add_systems(
                OnExit(GameState::Finished),
                despawn_screen::<FinishedScreen>,
            );
    }
}

fn difficulty_menu_text(selected: Difficulty, wallet: &Wallet) -> String {
    Difficulty::iter()
        .enumerate()
        .map(|(index, difficulty)| {
            let marker = if difficulty == selected { ">" } else { " " };
            let price = if wallet.is_unlocked(difficulty) {
                format!("{} coins", difficulty.entry_cost())
            } else {
                format!("locked, {} stars", difficulty.unlock_cost())
            };
            format!("{marker} {}. {difficulty} ({price})", index + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn wallet_text(wallet: &Wallet) -> String {
    format!("Coins: {}   Stars: {}", wallet.coins, wallet.stars)
}

fn spawn_welcome_screen(
    mut commands: Commands,
    wallet: Res<PlayerWallet>,
    difficulty: Res<SelectedDifficulty>,
) {
    let base_text_font = TextFont {
        font_size: 28.0,
        ..default()
    };

    commands
        .spawn((WelcomeScreen, Transform::default(), Visibility::default()))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new("Cube Drop"),
                base_text_font.clone().with_font_size(52.0),
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, 200.0, 0.0)),
            ));

            parent.spawn((
                WalletLine,
                Text2d::new(wallet_text(&wallet)),
                base_text_font.clone(),
                TextLayout::new_with_justify(JustifyText::Center),
                TextColor(Color::Srgba(GOLD)),
                Transform::from_translation(Vec3::new(0.0, 130.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new("Swap cubes to clear a path\nfor the ball"),
                base_text_font.clone().with_font_size(22.0),
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, 60.0, 0.0)),
            ));

            parent.spawn((
                DifficultyMenu,
                Text2d::new(difficulty_menu_text(difficulty.0, &wallet)),
                base_text_font.clone().with_font_size(22.0),
                TextLayout::new_with_justify(JustifyText::Left),
                Transform::from_translation(Vec3::new(0.0, -30.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new("Press 1-3 to pick\nClick or tap to start"),
                base_text_font.with_font_size(24.0),
                TextLayout::new_with_justify(JustifyText::Center),
                TextColor(Color::Srgba(YELLOW)),
                Transform::from_translation(Vec3::new(0.0, -140.0, 0.0)),
            ));
        });
}

/// Picking a locked difficulty buys it with stars when the wallet has enough.
fn choose_difficulty(
    keys: Res<ButtonInput<KeyCode>>,
    mut wallet: ResMut<PlayerWallet>,
    mut selected: ResMut<SelectedDifficulty>,
) {
    for (key, difficulty) in DIFFICULTY_KEYS.iter().zip(Difficulty::iter()) {
        if !keys.just_pressed(*key) || selected.0 == difficulty {
            continue;
        }
        if wallet.unlock(difficulty) {
            selected.0 = difficulty;
            info!("Difficulty set to {difficulty}");
        } else {
            info!(
                "{difficulty} needs {} stars to unlock",
                difficulty.unlock_cost()
            );
        }
    }
}

fn update_difficulty_menu(
    selected: Res<SelectedDifficulty>,
    wallet: Res<PlayerWallet>,
    mut query: Query<&mut Text2d, With<DifficultyMenu>>,
) {
    if !selected.is_changed() && !wallet.is_changed() {
        return;
    }
    if let Ok(mut text) = query.get_single_mut() {
        text.0 = difficulty_menu_text(selected.0, &wallet);
    }
}

fn update_wallet_line(
    wallet: Res<PlayerWallet>,
    mut query: Query<&mut Text2d, With<WalletLine>>,
) {
    if !wallet.is_changed() {
        return;
    }
    if let Ok(mut text) = query.get_single_mut() {
        text.0 = wallet_text(&wallet);
    }
}

fn handle_welcome_input(
    windows: Query<&Window>,
    buttons: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    board: Option<ResMut<Board>>,
    mut wallet: ResMut<PlayerWallet>,
    difficulty: Res<SelectedDifficulty>,
    mut hud: ResMut<SessionHud>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if just_pressed_world_position(&buttons, &touch_input, &windows, &camera_q).is_none() {
        return;
    }
    let Some(mut board) = board else {
        warn!("Board not ready yet");
        return;
    };
    next_state.set(begin_session(
        &mut board,
        &mut wallet,
        difficulty.0,
        &mut hud,
    ));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Hud,
        Text2d::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextLayout::new_with_justify(JustifyText::Left),
        Transform::from_translation(Vec3::new(0.0, 280.0, 5.0)),
    ));
}

fn update_hud(
    hud: Res<SessionHud>,
    board: Res<Board>,
    mut query: Query<&mut Text2d, With<Hud>>,
) {
    if let Ok(mut text) = query.get_single_mut() {
        text.0 = format!(
            "Balance: {}   Matches: {}",
            hud.balance,
            board.session().match_count()
        );
    }
}

fn spawn_no_funds_screen(mut commands: Commands, difficulty: Res<SelectedDifficulty>) {
    commands.spawn((
        NoFundsScreen,
        Text2d::new(format!(
            "Not enough coins\n{} needs {}",
            difficulty.0,
            difficulty.0.entry_cost()
        )),
        TextFont {
            font_size: 30.0,
            ..default()
        },
        TextLayout::new_with_justify(JustifyText::Center),
        TextColor(Color::Srgba(ORANGE_RED)),
        Transform::default(),
    ));
}

fn spawn_finished_screen(mut commands: Commands, hud: Res<SessionHud>) {
    let base_text_font = TextFont {
        font_size: 30.0,
        ..default()
    };
    let lines = hud.summary.map_or_else(
        || "Session over".to_string(),
        |summary| {
            format!(
                "Final balance: {}\nStarted with: {}\nCoins earned: {}",
                summary.final_balance, summary.initial_balance, summary.earned_coins
            )
        },
    );
    let stars = hud.summary.map_or(0, |summary| summary.stars.min(3)) as usize;

    commands
        .spawn((FinishedScreen, Transform::default(), Visibility::default()))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new("Finished!"),
                base_text_font.clone().with_font_size(52.0),
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, 150.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new(format!("{}{}", "*".repeat(stars), "-".repeat(3 - stars))),
                base_text_font.clone().with_font_size(48.0),
                TextLayout::new_with_justify(JustifyText::Center),
                TextColor(Color::Srgba(GOLD)),
                Transform::from_translation(Vec3::new(0.0, 80.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new(lines),
                base_text_font.clone(),
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, -10.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new("Click or tap to continue"),
                base_text_font.with_font_size(24.0),
                TextLayout::new_with_justify(JustifyText::Center),
                TextColor(Color::Srgba(GREEN)),
                Transform::from_translation(Vec3::new(0.0, -120.0, 0.0)),
            ));
        });
}

fn handle_finished_input(
    windows: Query<&Window>,
    buttons: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if just_pressed_world_position(&buttons, &touch_input, &windows, &camera_q).is_some() {
        next_state.set(GameState::Welcome);
    }
}

fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
