use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumCount)]
pub enum TileColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl TileColor {
    /// Every color, in declaration order.
    pub fn palette() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// A single grid occupant. Tiles have no identity beyond their color; their
/// position is the slot that holds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub color: TileColor,
}

impl Tile {
    pub const fn new(color: TileColor) -> Self {
        Self { color }
    }
}

impl From<TileColor> for Tile {
    fn from(color: TileColor) -> Self {
        Self::new(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lists_every_color_once() {
        let palette = TileColor::palette();
        assert_eq!(palette.len(), TileColor::COUNT, "palette size");
        assert_eq!(palette.first(), Some(&TileColor::Red), "declaration order");
    }
}
