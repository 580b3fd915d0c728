use strum::{Display, EnumIter, EnumString};
use tracing::warn;

/// Session difficulty, which decides the entry cost and the stars needed to
/// unlock it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, EnumIter, EnumString,
)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const fn entry_cost(self) -> i64 {
        match self {
            Self::Easy => 50,
            Self::Normal => 150,
            Self::Hard => 200,
        }
    }

    /// Stars spent once to make this difficulty playable.
    pub const fn unlock_cost(self) -> u32 {
        match self {
            Self::Easy => 0,
            Self::Normal => 50,
            Self::Hard => 100,
        }
    }

    /// Parses a difficulty name, falling back to `Easy` for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown difficulty {name:?}, using {}", Self::Easy);
            Self::Easy
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EffectKind {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A scoring effect applied to the session balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: f32,
}

impl Effect {
    pub const fn new(kind: EffectKind, value: f32) -> Self {
        Self { kind, value }
    }

    pub const fn add(value: f32) -> Self {
        Self::new(EffectKind::Add, value)
    }

    pub const fn subtract(value: f32) -> Self {
        Self::new(EffectKind::Subtract, value)
    }

    pub const fn multiply(value: f32) -> Self {
        Self::new(EffectKind::Multiply, value)
    }

    pub const fn divide(value: f32) -> Self {
        Self::new(EffectKind::Divide, value)
    }

    /// The balance after this effect, or `None` for a division by zero.
    ///
    /// Add and subtract use the value truncated toward zero; multiply and
    /// divide work in floating point and truncate the result.
    pub fn apply_to(self, balance: i64) -> Option<i64> {
        let value = f64::from(self.value);
        match self.kind {
            EffectKind::Add => Some(balance.saturating_add(value.trunc() as i64)),
            EffectKind::Subtract => Some(balance.saturating_sub(value.trunc() as i64)),
            EffectKind::Multiply => Some((balance as f64 * value).trunc() as i64),
            EffectKind::Divide if value == 0.0 => None,
            EffectKind::Divide => Some((balance as f64 / value).trunc() as i64),
        }
    }
}

/// A scoring target below the grid. A ball landing in it applies `effect`
/// and then adds `score_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectBox {
    pub effect: Effect,
    pub score_value: i64,
}

impl EffectBox {
    pub const DEFAULT_SCORE_VALUE: i64 = 10;

    pub const fn new(effect: Effect) -> Self {
        Self {
            effect,
            score_value: Self::DEFAULT_SCORE_VALUE,
        }
    }

    #[must_use]
    pub const fn with_score_value(mut self, score_value: i64) -> Self {
        self.score_value = score_value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_costs_follow_difficulty() {
        assert_eq!(Difficulty::Easy.entry_cost(), 50, "easy");
        assert_eq!(Difficulty::Normal.entry_cost(), 150, "normal");
        assert_eq!(Difficulty::Hard.entry_cost(), 200, "hard");
    }

    #[test]
    fn unknown_difficulty_names_fall_back_to_easy() {
        assert_eq!(Difficulty::from_name("Hard"), Difficulty::Hard, "known name");
        assert_eq!(Difficulty::from_name("Nightmare"), Difficulty::Easy, "fallback");
    }

    #[test]
    fn additive_effects_truncate_their_value() {
        assert_eq!(Effect::add(2.9).apply_to(10), Some(12), "add truncates");
        assert_eq!(Effect::subtract(2.9).apply_to(10), Some(8), "subtract truncates");
        assert_eq!(Effect::add(-3.5).apply_to(10), Some(7), "toward zero");
    }

    #[test]
    fn multiplicative_effects_truncate_the_result() {
        assert_eq!(Effect::multiply(1.5).apply_to(15), Some(22), "22.5 truncated");
        assert_eq!(Effect::divide(4.0).apply_to(150), Some(37), "37.5 truncated");
        assert_eq!(Effect::multiply(2.0).apply_to(-7), Some(-14), "negative balance");
        assert_eq!(Effect::divide(2.0).apply_to(-7), Some(-3), "toward zero");
    }

    #[test]
    fn dividing_by_zero_is_refused() {
        assert_eq!(Effect::divide(0.0).apply_to(150), None, "no division");
    }
}
