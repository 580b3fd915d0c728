use tracing::{debug, info, warn};

use crate::collaborators::CurrencyStore;
use crate::effects::{Difficulty, Effect, EffectBox};
use crate::error::SessionError;

pub const DEFAULT_FINISH_THRESHOLD: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    Active,
    /// The final piece is in play; effects still count.
    Finishing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied { before: i64, after: i64 },
    DivideByZero,
    /// No running session to apply to.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchProgress {
    Ignored,
    /// The match was counted; holds the count after it.
    Counted(u32),
    FinishSequenceStarted,
}

/// What the player walks away with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishSummary {
    pub final_balance: i64,
    pub initial_balance: i64,
    pub stars: u8,
    pub earned_coins: i64,
}

/// Stars for ending at `balance` after paying `initial` to enter: a ratio of
/// 2 earns one star, 4 earns two and 6 earns three.
pub fn star_rating(balance: i64, initial: i64) -> u8 {
    let base = if initial == 0 { 1 } else { initial };
    let ratio = balance as f64 / base as f64;
    if ratio >= 6.0 {
        3
    } else if ratio >= 4.0 {
        2
    } else if ratio >= 2.0 {
        1
    } else {
        0
    }
}

/// Tracks one play session: entry cost, balance, matches and the finish.
#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    balance: i64,
    initial_balance: i64,
    match_count: u32,
    finish_threshold: u32,
    finish_sequence_started: bool,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(DEFAULT_FINISH_THRESHOLD)
    }
}

impl SessionController {
    pub const fn new(finish_threshold: u32) -> Self {
        Self {
            state: SessionState::NotStarted,
            balance: 0,
            initial_balance: 0,
            match_count: 0,
            finish_threshold,
            finish_sequence_started: false,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn balance(&self) -> i64 {
        self.balance
    }

    pub const fn initial_balance(&self) -> i64 {
        self.initial_balance
    }

    pub const fn match_count(&self) -> u32 {
        self.match_count
    }

    pub const fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Active | SessionState::Finishing)
    }

    /// Pays `entry_cost` from `store` and opens a session with that amount as
    /// its balance.
    pub fn start(
        &mut self,
        entry_cost: i64,
        store: &mut impl CurrencyStore,
    ) -> Result<(), SessionError> {
        if self.is_running() {
            return Err(SessionError::AlreadyStarted);
        }
        let available = store.balance();
        if available < entry_cost || !store.debit(entry_cost) {
            warn!("Cannot start session: {entry_cost} coins required, {available} available");
            return Err(SessionError::InsufficientFunds {
                required: entry_cost,
                available,
            });
        }

        *self = Self {
            state: SessionState::Active,
            balance: entry_cost,
            initial_balance: entry_cost,
            ..Self::new(self.finish_threshold)
        };
        info!("Session started with balance {entry_cost}");
        Ok(())
    }

    pub fn start_with_difficulty(
        &mut self,
        difficulty: Difficulty,
        store: &mut impl CurrencyStore,
    ) -> Result<(), SessionError> {
        debug!("Starting {difficulty} session");
        self.start(difficulty.entry_cost(), store)
    }

    pub fn apply_effect(&mut self, effect: Effect) -> EffectOutcome {
        if !self.is_running() {
            debug!("Ignoring {} effect outside a running session", effect.kind);
            return EffectOutcome::Inactive;
        }
        let before = self.balance;
        let Some(after) = effect.apply_to(before) else {
            warn!("Skipping division by zero");
            return EffectOutcome::DivideByZero;
        };
        self.balance = after;
        debug!("{} {} took balance from {before} to {after}", effect.kind, effect.value);
        EffectOutcome::Applied { before, after }
    }

    /// Applies the box effect, then adds the box's score value.
    pub fn hit_box(&mut self, target: &EffectBox) -> EffectOutcome {
        let before = self.balance;
        if self.apply_effect(target.effect) == EffectOutcome::Inactive {
            return EffectOutcome::Inactive;
        }
        self.balance = self.balance.saturating_add(target.score_value);
        EffectOutcome::Applied {
            before,
            after: self.balance,
        }
    }

    /// Counts a cleared match group. Reaching the threshold resets the count
    /// and, the first time in a session, starts the finish sequence.
    pub fn on_match_completed(&mut self) -> MatchProgress {
        if !self.is_running() {
            return MatchProgress::Ignored;
        }
        self.match_count += 1;
        if self.match_count < self.finish_threshold {
            return MatchProgress::Counted(self.match_count);
        }

        self.match_count = 0;
        if self.finish_sequence_started {
            return MatchProgress::Counted(0);
        }
        self.finish_sequence_started = true;
        self.state = SessionState::Finishing;
        info!("Finish sequence started");
        MatchProgress::FinishSequenceStarted
    }

    /// Closes the session and pays out. Only the first call after a start
    /// does anything.
    pub fn trigger_game_end(&mut self, store: &mut impl CurrencyStore) -> Option<FinishSummary> {
        if !self.is_running() {
            return None;
        }
        self.state = SessionState::Finished;

        let earned_coins = self.balance.max(0);
        store.credit(earned_coins);
        let stars = star_rating(self.balance, self.initial_balance);
        store.award_stars(stars);

        let summary = FinishSummary {
            final_balance: self.balance,
            initial_balance: self.initial_balance,
            stars,
            earned_coins,
        };
        info!("Session finished: {summary:?}");
        Some(summary)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.finish_threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Wallet;

    fn running(entry_cost: i64) -> (SessionController, Wallet) {
        let mut wallet = Wallet::with_coins(entry_cost);
        let mut session = SessionController::default();
        session.start(entry_cost, &mut wallet).expect("funded");
        (session, wallet)
    }

    #[test]
    fn starting_moves_the_entry_cost_into_the_session() {
        let (session, wallet) = running(150);
        assert_eq!(wallet.coins, 0, "store debited");
        assert_eq!(session.balance(), 150, "session balance");
        assert_eq!(session.initial_balance(), 150, "initial balance");
        assert_eq!(session.state(), SessionState::Active, "active");
    }

    #[test]
    fn starting_without_funds_fails_and_keeps_the_store() {
        let mut wallet = Wallet::with_coins(49);
        let mut session = SessionController::default();
        assert_eq!(
            session.start_with_difficulty(Difficulty::Easy, &mut wallet),
            Err(SessionError::InsufficientFunds {
                required: 50,
                available: 49
            }),
            "short by one"
        );
        assert_eq!(wallet.coins, 49, "nothing debited");
        assert_eq!(session.state(), SessionState::NotStarted, "still idle");
    }

    #[test]
    fn negative_entry_costs_are_refused() {
        let mut wallet = Wallet::with_coins(100);
        let mut session = SessionController::default();
        assert!(
            matches!(
                session.start(-30, &mut wallet),
                Err(SessionError::InsufficientFunds { required: -30, .. })
            ),
            "debit refused"
        );
        assert_eq!(wallet.coins, 100, "no coins minted");
        assert_eq!(session.balance(), 0, "no negative opening balance");
        assert_eq!(session.state(), SessionState::NotStarted, "still idle");
    }

    #[test]
    fn running_sessions_cannot_restart() {
        let (mut session, mut wallet) = running(50);
        wallet.credit(50);
        assert_eq!(
            session.start(50, &mut wallet),
            Err(SessionError::AlreadyStarted),
            "second start"
        );
        assert_eq!(wallet.coins, 50, "nothing debited");
    }

    #[test]
    fn dividing_by_zero_keeps_the_balance() {
        let (mut session, _) = running(150);
        assert_eq!(
            session.apply_effect(Effect::divide(0.0)),
            EffectOutcome::DivideByZero,
            "refused"
        );
        assert_eq!(session.balance(), 150, "unchanged");
    }

    #[test]
    fn effects_need_a_running_session() {
        let mut session = SessionController::default();
        assert_eq!(
            session.apply_effect(Effect::add(10.0)),
            EffectOutcome::Inactive,
            "before start"
        );
        assert_eq!(session.balance(), 0, "unchanged");
    }

    #[test]
    fn box_hits_apply_the_effect_then_the_score() {
        let (mut session, _) = running(50);
        let outcome = session.hit_box(&EffectBox::new(Effect::multiply(2.0)));
        assert_eq!(
            outcome,
            EffectOutcome::Applied {
                before: 50,
                after: 110
            },
            "50 * 2 + 10"
        );
        session.hit_box(&EffectBox::new(Effect::divide(0.0)));
        assert_eq!(session.balance(), 120, "score still added");
    }

    #[test]
    fn finish_sequence_starts_once_and_the_count_wraps() {
        let (mut session, _) = running(150);
        for expected in 1..=3 {
            assert_eq!(
                session.on_match_completed(),
                MatchProgress::Counted(expected),
                "match {expected}"
            );
        }
        assert_eq!(
            session.on_match_completed(),
            MatchProgress::FinishSequenceStarted,
            "fourth match"
        );
        assert_eq!(session.match_count(), 0, "count reset");
        assert_eq!(session.state(), SessionState::Finishing, "finishing");
        assert_eq!(session.on_match_completed(), MatchProgress::Counted(1), "fifth match");

        for _ in 0..2 {
            session.on_match_completed();
        }
        assert_eq!(
            session.on_match_completed(),
            MatchProgress::Counted(0),
            "second threshold only resets"
        );
    }

    #[test]
    fn matches_after_the_end_are_ignored() {
        let (mut session, mut wallet) = running(50);
        session.trigger_game_end(&mut wallet);
        assert_eq!(session.on_match_completed(), MatchProgress::Ignored, "finished");
        assert_eq!(session.match_count(), 0, "not counted");
    }

    #[test]
    fn game_end_pays_out_once() {
        let (mut session, mut wallet) = running(150);
        session.apply_effect(Effect::multiply(2.0));

        let summary = session.trigger_game_end(&mut wallet).expect("first end");
        assert_eq!(
            summary,
            FinishSummary {
                final_balance: 300,
                initial_balance: 150,
                stars: 1,
                earned_coins: 300
            },
            "doubling earns the first star"
        );
        assert!(session.is_finished(), "finished");
        assert_eq!(session.trigger_game_end(&mut wallet), None, "second end");
        assert_eq!((wallet.coins, wallet.stars), (300, 1), "credited once");
    }

    #[test]
    fn negative_balances_earn_nothing() {
        let (mut session, mut wallet) = running(50);
        session.apply_effect(Effect::subtract(80.0));
        let summary = session.trigger_game_end(&mut wallet).expect("running");
        assert_eq!(summary.earned_coins, 0, "clamped");
        assert_eq!(wallet.coins, 0, "nothing credited");
    }

    #[test]
    fn star_breakpoints() {
        assert_eq!(star_rating(99, 50), 0, "below double");
        assert_eq!(star_rating(100, 50), 1, "double");
        assert_eq!(star_rating(200, 50), 2, "four times");
        assert_eq!(star_rating(300, 50), 3, "six times");
        assert_eq!(star_rating(6, 0), 3, "zero entry counts as one");
    }

    #[test]
    fn reset_returns_to_not_started() {
        let (mut session, _) = running(50);
        session.on_match_completed();
        session.reset();
        assert_eq!(session.state(), SessionState::NotStarted, "idle");
        assert_eq!(session.match_count(), 0, "count cleared");
        assert_eq!(session.balance(), 0, "balance cleared");
    }
}
