//! Interfaces the engine consumes from the outside world.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::effects::Difficulty;
use crate::position::GridPosition;
use crate::session::FinishSummary;

/// Persistent currency owned by the player, outside any session.
pub trait CurrencyStore {
    fn balance(&self) -> i64;

    /// Removes `amount` coins. Returns `false` and changes nothing when the
    /// balance cannot cover it or the amount is negative.
    fn debit(&mut self, amount: i64) -> bool;

    fn credit(&mut self, amount: i64);

    fn award_stars(&mut self, stars: u8);
}

/// Places new playable pieces into the world.
pub trait Spawner {
    fn spawn_at(&mut self, cell: GridPosition);

    /// Swaps the active piece for the one that ends the session.
    fn replace_with_final(&mut self);
}

/// Shows session progress to the player.
pub trait Presenter {
    fn update_score(&mut self, balance: i64);

    fn show_finish_summary(&mut self, summary: &FinishSummary);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn update_score(&mut self, balance: i64) {
        (**self).update_score(balance);
    }

    fn show_finish_summary(&mut self, summary: &FinishSummary) {
        (**self).show_finish_summary(summary);
    }
}

impl<S: Spawner + ?Sized> Spawner for &mut S {
    fn spawn_at(&mut self, cell: GridPosition) {
        (**self).spawn_at(cell);
    }

    fn replace_with_final(&mut self) {
        (**self).replace_with_final();
    }
}

/// In-memory currency store, plus the difficulties bought with stars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    pub coins: i64,
    pub stars: u32,
    pub unlocked: BTreeSet<Difficulty>,
}

impl Wallet {
    pub const fn with_coins(coins: i64) -> Self {
        Self {
            coins,
            stars: 0,
            unlocked: BTreeSet::new(),
        }
    }

    pub fn is_unlocked(&self, difficulty: Difficulty) -> bool {
        difficulty.unlock_cost() == 0 || self.unlocked.contains(&difficulty)
    }

    /// Makes `difficulty` playable, spending its star cost the first time.
    /// Returns whether it is playable afterwards.
    pub fn unlock(&mut self, difficulty: Difficulty) -> bool {
        if self.is_unlocked(difficulty) {
            return true;
        }
        let cost = difficulty.unlock_cost();
        if self.stars < cost {
            debug!("{difficulty} needs {cost} stars, wallet has {}", self.stars);
            return false;
        }
        self.stars -= cost;
        self.unlocked.insert(difficulty);
        info!("{difficulty} unlocked for {cost} stars");
        true
    }
}

impl CurrencyStore for Wallet {
    fn balance(&self) -> i64 {
        self.coins
    }

    fn debit(&mut self, amount: i64) -> bool {
        if amount < 0 || amount > self.coins {
            return false;
        }
        self.coins -= amount;
        debug!("Wallet debited {amount}, {} left", self.coins);
        true
    }

    fn credit(&mut self, amount: i64) {
        self.coins = self.coins.saturating_add(amount);
        debug!("Wallet credited {amount}, now {}", self.coins);
    }

    fn award_stars(&mut self, stars: u8) {
        self.stars += u32::from(stars);
    }
}
