use core::time::Duration;

use bevy::color::palettes::css::{GOLD, LIME, ORANGE_RED, WHITE};
use bevy::prelude::*;
use tile_engine::{
    Effect, EffectKind, EffectOutcome, EngineEvent, GridPosition, Observer, Spawner, SpawnerLink,
};

use crate::game::{Board, BoardEvent, GameState, LevelConfig, PlaySet, PlayerWallet, config};
use crate::grid::{cell_world, world_point};

pub struct BallPlugin;

#[derive(Component)]
pub struct Ball {
    pub radius: f32,
    pub color: Color,
    pub is_final: bool,
    /// Falls through cubes instead of resting on them.
    pub released: bool,
}

impl Ball {
    fn regular() -> Self {
        Self {
            radius: config::BALL_RADIUS,
            color: Color::Srgba(WHITE),
            is_final: false,
            released: false,
        }
    }
}

/// Whether a ball that was `released` before `event` falls through cubes
/// after it. Any cleared match lets the ball in play drop to the boxes.
fn released_after(released: bool, event: &EngineEvent) -> bool {
    released || matches!(event, EngineEvent::MatchesCleared(_))
}

/// Height after falling `distance`. A held ball stops at `rest`.
fn next_height(y: f32, distance: f32, rest: Option<f32>, released: bool) -> f32 {
    let fallen = y - distance;
    match rest {
        Some(rest) if !released => fallen.max(rest),
        _ => fallen,
    }
}

/// A scoring box under one grid column.
#[derive(Component)]
pub struct EffectTarget {
    pub effect_box: tile_engine::EffectBox,
    /// Set once the final ball has gone through.
    pub passed: bool,
}

#[derive(Component)]
pub struct FinishLine;

#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    initial_position: Vec2,
}

/// Collects what the engine asks the ball side to spawn this frame.
#[derive(Default)]
struct BallRequests {
    cells: Vec<GridPosition>,
    final_ball: bool,
}

impl Spawner for BallRequests {
    fn spawn_at(&mut self, cell: GridPosition) {
        self.cells.push(cell);
    }

    fn replace_with_final(&mut self) {
        self.final_ball = true;
    }
}

impl Plugin for BallPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_play_field)
            .add_systems(Update, drop_balls.in_set(PlaySet::Simulate))
            .add_systems(
                Update,
                (
                    release_balls,
                    arm_final_ball,
                    render_balls,
                    animate_floating_scores,
                )
                    .chain()
                    .in_set(PlaySet::React),
            )
            .add_systems(OnExit(GameState::Playing), cleanup_play_field);
    }
}

fn effect_label(effect: Effect) -> String {
    let sign = match effect.kind {
        EffectKind::Add => "+",
        EffectKind::Subtract => "-",
        EffectKind::Multiply => "x",
        EffectKind::Divide => "/",
    };
    format!("{sign}{}", effect.value)
}

/// Above the middle column, resting on the top row.
fn spawn_point(board: &Board) -> Vec2 {
    let grid = board.grid();
    let top = GridPosition::new(grid.width() as i32 / 2, grid.height() as i32);
    cell_world(board.layout(), top)
}

fn spawn_ball(commands: &mut Commands, position: Vec2, ball: Ball) {
    commands.spawn((ball, Transform::from_translation(position.extend(3.0))));
}

fn spawn_play_field(mut commands: Commands, board: Res<Board>, config: Res<LevelConfig>) {
    let layout = board.layout();
    let box_size = Vec2::new(config::BOX_SIZE.0, config::BOX_SIZE.1);

    for (column, effect_box) in config.boxes.iter().take(board.grid().width() as usize).enumerate() {
        let x = cell_world(layout, GridPosition::new(column as i32, 0)).x;
        commands
            .spawn((
                EffectTarget {
                    effect_box: *effect_box,
                    passed: false,
                },
                Sprite::from_color(Color::srgb(0.35, 0.35, 0.45), box_size),
                Transform::from_xyz(x, config.box_row_y(), 0.0),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text2d::new(effect_label(effect_box.effect)),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Transform::from_xyz(0.0, 0.0, 1.0),
                ));
            });
    }

    let line_width = board.grid().width() as f32 * layout.cell_size;
    commands.spawn((
        FinishLine,
        Sprite::from_color(Color::Srgba(GOLD), Vec2::new(line_width, 6.0)),
        Transform::from_xyz(config.grid_center.x, config.finish_line_y(), 0.0),
        Visibility::Hidden,
    ));

    spawn_ball(&mut commands, spawn_point(&board), Ball::regular());
}

/// Where a ball at `position` stops: the middle of its cell when the cell
/// below holds a cube. A cube moved onto the ball pushes it up first.
fn resting_place(board: &Board, position: Vec2) -> (Vec2, Option<f32>) {
    let layout = board.layout();
    let grid = board.grid();
    let start = layout.cell_at(world_point(position));
    if start.x < 0 || start.x >= grid.width() as i32 || start.y < 0 {
        return (position, None);
    }

    let mut cell = start;
    while grid.tile(cell).is_some() {
        cell = cell.offset(0, 1);
    }
    let position = if cell == start {
        position
    } else {
        cell_world(layout, cell)
    };

    let rest = grid
        .tile(cell.offset(0, -1))
        .map(|_| cell_world(layout, cell).y);
    (position, rest)
}

fn spawn_floating_score(commands: &mut Commands, position: Vec2, text: String, color: Srgba) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_translation(position.extend(4.0)),
        FloatingScore {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            initial_position: position,
        },
    ));
}

fn drop_balls(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<LevelConfig>,
    mut board: ResMut<Board>,
    mut wallet: ResMut<PlayerWallet>,
    mut balls: Query<(Entity, &mut Transform, &Ball)>,
    mut boxes: Query<(&Transform, &mut EffectTarget), Without<Ball>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut requests = BallRequests::default();

    for (entity, mut transform, ball) in &mut balls {
        let (position, rest) = if ball.released {
            (transform.translation.truncate(), None)
        } else {
            resting_place(&board, transform.translation.truncate())
        };
        let y = next_height(
            position.y,
            config::BALL_FALL_SPEED * time.delta_secs(),
            rest,
            ball.released,
        );
        transform.translation = Vec3::new(position.x, y, transform.translation.z);

        if ball.is_final && y <= config.finish_line_y() {
            commands.entity(entity).despawn_recursive();
            if let Some(summary) = board.trigger_game_end(&mut wallet.0) {
                info!("Final ball crossed the finish line: {summary:?}");
            }
            next_state.set(GameState::Finished);
            continue;
        }
        if y > config.box_row_y() {
            continue;
        }

        let reach = config::BOX_SIZE.0 / 2.0 + ball.radius;
        let hit = boxes
            .iter_mut()
            .find(|(box_transform, _)| (box_transform.translation.x - position.x).abs() < reach);
        if let Some((_, mut target)) = hit {
            if ball.is_final {
                if target.passed {
                    continue;
                }
                target.passed = true;
            }
            let outcome = board.hit_box(&target.effect_box);
            if let EffectOutcome::Applied { before, after } = outcome {
                let (text, color) = if after >= before {
                    (format!("+{}", after - before), LIME)
                } else {
                    (format!("{}", after - before), ORANGE_RED)
                };
                spawn_floating_score(&mut commands, Vec2::new(position.x, y), text, color);
            }
        }

        if !ball.is_final {
            commands.entity(entity).despawn_recursive();
            if board.request_spawn(&mut requests).is_none() {
                warn!("No free cell for a new ball, dropping it from the top");
                spawn_ball(&mut commands, spawn_point(&board), Ball::regular());
            }
        }
    }

    let layout = *board.layout();
    for cell in requests.cells {
        spawn_ball(&mut commands, cell_world(&layout, cell), Ball::regular());
    }
}

fn release_balls(mut events: EventReader<BoardEvent>, mut balls: Query<&mut Ball>) {
    for BoardEvent(event) in events.read() {
        for mut ball in &mut balls {
            if released_after(ball.released, event) && !ball.released {
                ball.released = true;
                debug!("Ball released by a cleared match");
            }
        }
    }
}

/// Swaps the ball in play for the final ball and shows the finish line once
/// the engine starts the finish sequence.
fn arm_final_ball(
    mut commands: Commands,
    mut events: EventReader<BoardEvent>,
    board: Res<Board>,
    mut balls: Query<&mut Ball>,
    mut finish_line: Query<&mut Visibility, With<FinishLine>>,
) {
    let mut link = SpawnerLink(BallRequests::default());
    for BoardEvent(event) in events.read() {
        link.notify(event);
    }
    if !link.0.final_ball {
        return;
    }

    let mut replaced = false;
    for mut ball in &mut balls {
        ball.is_final = true;
        ball.released = true;
        ball.color = Color::Srgba(GOLD);
        replaced = true;
    }
    if !replaced {
        spawn_ball(
            &mut commands,
            spawn_point(&board),
            Ball {
                color: Color::Srgba(GOLD),
                is_final: true,
                released: true,
                ..Ball::regular()
            },
        );
    }
    if let Ok(mut visibility) = finish_line.get_single_mut() {
        *visibility = Visibility::Visible;
    }
    info!("Final ball in play");
}

fn render_balls(query: Query<(&Transform, &Ball)>, mut gizmos: Gizmos) {
    for (transform, ball) in &query {
        gizmos.circle_2d(transform.translation.truncate(), ball.radius, ball.color);
    }
}

fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        // Drift up and shrink away
        transform.translation.y = 50.0f32.mul_add(progress, floating_score.initial_position.y);
        transform.scale = Vec3::splat(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}

fn cleanup_play_field(
    mut commands: Commands,
    query: Query<
        Entity,
        Or<(
            With<Ball>,
            With<EffectTarget>,
            With<FinishLine>,
            With<FloatingScore>,
        )>,
    >,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
