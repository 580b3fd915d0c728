use bevy::prelude::*;
use tile_engine::prelude::*;
use tile_engine::{FinishSummary, Observer, Presenter, PresenterLink};

pub struct GamePlugin;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    Welcome,
    Playing,
    Finished,
    /// Entry cost not covered; falls back to `Welcome` after a short notice.
    NoFunds,
}

pub mod config {
    use core::time::Duration;

    pub const STARTING_COINS: i64 = 200;
    pub const NO_FUNDS_NOTICE: Duration = Duration::from_secs(2);
    pub const BALL_RADIUS: f32 = 14.0;
    pub const BALL_FALL_SPEED: f32 = 320.0; // pixels per second
    pub const BOX_SIZE: (f32, f32) = (52.0, 28.0);
    pub const BOX_GAP: f32 = 56.0; // between the grid and the box row
    pub const FINISH_GAP: f32 = 70.0; // between the box row and the finish line
}

#[derive(Resource)]
pub struct LevelConfig {
    pub grid_size: (u32, u32), // (columns, rows)
    pub cell_size: f32,
    pub grid_center: Vec2,
    /// One box under each column, left to right.
    pub boxes: Vec<EffectBox>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            grid_size: (5, 5),
            cell_size: 56.0,
            grid_center: Vec2::new(0.0, 60.0),
            boxes: vec![
                EffectBox::new(Effect::add(25.0)),
                EffectBox::new(Effect::multiply(1.5)),
                EffectBox::new(Effect::subtract(40.0)),
                EffectBox::new(Effect::divide(2.0)),
                EffectBox::new(Effect::multiply(2.0)),
            ],
        }
    }
}

impl LevelConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let (width, height) = self.grid_size;
        EngineConfig {
            width,
            height,
            cell_size: self.cell_size,
            center: WorldPoint::new(self.grid_center.x, self.grid_center.y),
            ..EngineConfig::default()
        }
    }

    pub fn grid_bottom(&self) -> f32 {
        self.grid_center.y - self.grid_size.1 as f32 * self.cell_size / 2.0
    }

    pub fn box_row_y(&self) -> f32 {
        self.grid_bottom() - config::BOX_GAP
    }

    pub fn finish_line_y(&self) -> f32 {
        self.box_row_y() - config::FINISH_GAP
    }
}

/// The tile engine driving the current session.
#[derive(Resource, Deref, DerefMut)]
pub struct Board(pub Engine);

#[derive(Resource, Deref, DerefMut)]
pub struct PlayerWallet(pub Wallet);

impl Default for PlayerWallet {
    fn default() -> Self {
        Self(Wallet::with_coins(config::STARTING_COINS))
    }
}

#[derive(Resource, Default, Deref, DerefMut)]
pub struct SelectedDifficulty(pub Difficulty);

/// Engine output, re-sent every frame as Bevy events.
#[derive(Event, Clone, Debug)]
pub struct BoardEvent(pub EngineEvent);

/// What the HUD and summary screens show.
#[derive(Resource, Default)]
pub struct SessionHud {
    pub balance: i64,
    pub summary: Option<FinishSummary>,
}

impl Presenter for SessionHud {
    fn update_score(&mut self, balance: i64) {
        self.balance = balance;
    }

    fn show_finish_summary(&mut self, summary: &FinishSummary) {
        self.summary = Some(*summary);
    }
}

#[derive(Resource)]
struct NoFundsTimer(Timer);

/// Frame order while playing: pointer input, then the clock and the ball,
/// then engine output is turned into Bevy events that the sprites react to.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaySet {
    Input,
    Simulate,
    Pump,
    React,
}

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelConfig>()
            .init_resource::<PlayerWallet>()
            .init_resource::<SelectedDifficulty>()
            .init_resource::<SessionHud>()
            .add_event::<BoardEvent>()
            .configure_sets(
                Update,
                (
                    PlaySet::Input,
                    PlaySet::Simulate,
                    PlaySet::Pump,
                    PlaySet::React,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, setup_board)
            .add_systems(Update, advance_board.in_set(PlaySet::Simulate))
            .add_systems(Update, pump_board_events.in_set(PlaySet::Pump))
            .add_systems(Update, present_board_events.in_set(PlaySet::React))
            .add_systems(OnEnter(GameState::NoFunds), start_no_funds_timer)
            .add_systems(
                Update,
                leave_no_funds.run_if(in_state(GameState::NoFunds)),
            );
    }
}

fn setup_board(mut commands: Commands, config: Res<LevelConfig>) {
    match Engine::new(config.engine_config(), fastrand::Rng::new()) {
        Ok(engine) => commands.insert_resource(Board(engine)),
        Err(err) => error!("Could not create the board: {err}"),
    }
}

/// Clears the previous session, deals a fresh grid and pays the entry cost.
/// Returns the state the game should move to.
pub fn begin_session(
    board: &mut Board,
    wallet: &mut PlayerWallet,
    difficulty: Difficulty,
    hud: &mut SessionHud,
) -> GameState {
    if !wallet.is_unlocked(difficulty) {
        warn!("{difficulty} is locked");
        return GameState::Welcome;
    }
    board.reset();
    *hud = SessionHud::default();
    if let Err(err) = board.populate() {
        error!("Could not populate the board: {err}");
        return GameState::Welcome;
    }
    match board.start_with_difficulty(difficulty, &mut wallet.0) {
        Ok(()) => {
            info!("Started {difficulty} session");
            GameState::Playing
        }
        Err(err @ SessionError::InsufficientFunds { .. }) => {
            info!("{err}");
            GameState::NoFunds
        }
        Err(SessionError::AlreadyStarted) => {
            warn!("Session already running");
            GameState::Playing
        }
    }
}

fn advance_board(time: Res<Time>, mut board: ResMut<Board>) {
    board.advance(time.delta());
}

fn pump_board_events(mut board: ResMut<Board>, mut events: EventWriter<BoardEvent>) {
    while let Some(event) = board.pop_event() {
        events.send(BoardEvent(event));
    }
}

fn present_board_events(mut events: EventReader<BoardEvent>, mut hud: ResMut<SessionHud>) {
    let mut link = PresenterLink(hud.as_mut());
    for BoardEvent(event) in events.read() {
        link.notify(event);
    }
}

fn start_no_funds_timer(mut commands: Commands) {
    commands.insert_resource(NoFundsTimer(Timer::new(
        config::NO_FUNDS_NOTICE,
        TimerMode::Once,
    )));
}

fn leave_no_funds(
    time: Res<Time>,
    mut timer: ResMut<NoFundsTimer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        next_state.set(GameState::Welcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        let engine = Engine::new(LevelConfig::default().engine_config(), fastrand::Rng::with_seed(7))
            .expect("default level is valid");
        Board(engine)
    }

    #[test]
    fn short_wallets_land_on_the_no_funds_notice() {
        let mut board = board();
        let mut wallet = PlayerWallet(Wallet::with_coins(30));
        let mut hud = SessionHud::default();

        let next = begin_session(&mut board, &mut wallet, Difficulty::Easy, &mut hud);

        assert_eq!(next, GameState::NoFunds, "50 coins needed");
        assert_eq!(wallet.coins, 30, "nothing debited");
        assert!(!board.session().is_running(), "no session opened");
    }

    #[test]
    fn funded_wallets_start_playing() {
        let mut board = board();
        let mut wallet = PlayerWallet::default();
        let mut hud = SessionHud::default();

        let next = begin_session(&mut board, &mut wallet, Difficulty::Easy, &mut hud);

        assert_eq!(next, GameState::Playing, "entry cost covered");
        assert_eq!(wallet.coins, config::STARTING_COINS - 50, "entry cost paid");
        assert_eq!(board.session().balance(), 50, "session holds the entry cost");
        assert!(board.grid().is_full(), "fresh grid dealt");
    }

    #[test]
    fn locked_difficulties_stay_on_the_welcome_screen() {
        let mut board = board();
        let mut wallet = PlayerWallet::default();
        let mut hud = SessionHud::default();

        let next = begin_session(&mut board, &mut wallet, Difficulty::Normal, &mut hud);

        assert_eq!(next, GameState::Welcome, "Normal not unlocked yet");
        assert_eq!(wallet.coins, config::STARTING_COINS, "nothing debited");
        assert!(!board.session().is_running(), "no session opened");
    }
}
