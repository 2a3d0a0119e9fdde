use serde::{Deserialize, Serialize};

/// Hidden truth of a single cell, fixed once the layout is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellTruth {
    Mine,
    Empty,
    /// Adjacent mine count, always in `1..=8`.
    Number(u8),
}

impl CellTruth {
    /// Truth for a non-mine cell with `adjacent` neighbouring mines.
    pub const fn from_adjacent(adjacent: u8) -> Self {
        if adjacent == 0 {
            Self::Empty
        } else {
            Self::Number(adjacent)
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn number(self) -> Option<u8> {
        match self {
            Self::Number(count) => Some(count),
            _ => None,
        }
    }
}

impl Default for CellTruth {
    fn default() -> Self {
        Self::Empty
    }
}

/// How often the player has pressed an exposed numbered cell.
///
/// An armed number performs the neighbour expansion on the next player press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressCount {
    Untouched,
    Armed,
    Saturated,
}

impl PressCount {
    pub const fn is_armed(self) -> bool {
        !matches!(self, Self::Untouched)
    }
}

impl Default for PressCount {
    fn default() -> Self {
        Self::Untouched
    }
}
