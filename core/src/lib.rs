#![no_std]

extern crate alloc;

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{BitOr, Index};
use core::str::FromStr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use board::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod analysis;
mod board;
mod engine;
mod error;
mod generator;
mod session;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const MIN_SIDE: Coord = 2;
    pub const MAX_SIDE: Coord = 30;
    pub const MIN_MINES: CellCount = 1;
    pub const MAX_MINES: CellCount = 150;

    pub const BEGINNER: Self = Self::new(9, 9, 10);
    pub const INTERMEDIATE: Self = Self::new(16, 16, 40);
    pub const EXPERT: Self = Self::new(16, 30, 99);

    pub const fn new(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Checks the playable ranges: 2..=30 per side, 1..=150 mines, and at
    /// least one safe cell.
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_SIDE..=Self::MAX_SIDE).contains(&self.rows) {
            return Err(GameError::RowsOutOfRange {
                rows: self.rows,
                min: Self::MIN_SIDE,
                max: Self::MAX_SIDE,
            });
        }
        if !(Self::MIN_SIDE..=Self::MAX_SIDE).contains(&self.cols) {
            return Err(GameError::ColsOutOfRange {
                cols: self.cols,
                min: Self::MIN_SIDE,
                max: Self::MAX_SIDE,
            });
        }
        if !(Self::MIN_MINES..=Self::MAX_MINES).contains(&self.mines) {
            return Err(GameError::MinesOutOfRange {
                mines: self.mines,
                min: Self::MIN_MINES,
                max: Self::MAX_MINES,
            });
        }
        if self.total_cells() <= self.mines {
            return Err(GameError::TooManyMines {
                cells: self.total_cells(),
                mines: self.mines,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::BEGINNER
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
        Difficulty::Custom,
    ];

    /// Fixed board for the named presets, `None` for custom.
    pub const fn preset(self) -> Option<GameConfig> {
        match self {
            Self::Beginner => Some(GameConfig::BEGINNER),
            Self::Intermediate => Some(GameConfig::INTERMEDIATE),
            Self::Expert => Some(GameConfig::EXPERT),
            Self::Custom => None,
        }
    }

    /// Statistics slot for best times.
    pub const fn slot(self) -> usize {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Expert => 2,
            Self::Custom => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
            Self::Custom => "custom",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
            Self::Custom => "Custom",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name() == s)
            .ok_or_else(|| GameError::UnknownDifficulty(s.to_string()))
    }
}

/// Hidden truth of a generated board: the mine roster in placement order and
/// the derived per-cell truth grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    truth: Array2<CellTruth>,
    mines: Vec<Coord2>,
}

impl MineLayout {
    /// Builds a layout from mine coordinates, computing every number.
    /// Repeated coordinates are kept once, in first-seen order.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        let mut mines = Vec::with_capacity(mine_coords.len());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            if !mine_mask[coords.to_nd_index()] {
                mine_mask[coords.to_nd_index()] = true;
                mines.push(coords);
            }
        }

        let mut truth = Array2::from_elem(size.to_nd_index(), CellTruth::Empty);
        for coords in iter_coords(size) {
            truth[coords.to_nd_index()] = if mine_mask[coords.to_nd_index()] {
                CellTruth::Mine
            } else {
                let adjacent = mine_mask
                    .iter_neighbors(coords)
                    .filter(|&pos| mine_mask[pos.to_nd_index()])
                    .count();
                CellTruth::from_adjacent(adjacent as u8)
            };
        }

        Ok(Self { truth, mines })
    }

    pub fn game_config(&self) -> GameConfig {
        let (rows, cols) = self.size();
        GameConfig::new(rows, cols, self.mine_count())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn in_bounds(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.truth)
    }

    pub fn total_cells(&self) -> CellCount {
        self.truth.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mines.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count()
    }

    /// Mine roster in placement order, free of duplicates.
    pub fn mines(&self) -> &[Coord2] {
        &self.mines
    }

    pub fn truth_grid(&self) -> &Array2<CellTruth> {
        &self.truth
    }

    pub fn truth_at(&self, coords: Coord2) -> CellTruth {
        self[coords]
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine()
    }

    /// Counts mines among the boundary-clipped 8 neighbours of `coords`.
    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.contains_mine(pos))
            .count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.truth.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = CellTruth;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.truth[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    /// A mine was hit but an extra life absorbed it.
    LifeLost,
    HitMine,
    Won,
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (LifeLost, _) => LifeLost,
            (_, LifeLost) => LifeLost,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_presets_and_boundaries() {
        assert_eq!(GameConfig::BEGINNER.validate(), Ok(()));
        assert_eq!(GameConfig::INTERMEDIATE.validate(), Ok(()));
        assert_eq!(GameConfig::EXPERT.validate(), Ok(()));
        assert_eq!(GameConfig::new(2, 2, 3).validate(), Ok(()));
        assert_eq!(GameConfig::new(30, 30, 150).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(matches!(
            GameConfig::new(1, 9, 3).validate(),
            Err(GameError::RowsOutOfRange { rows: 1, .. })
        ));
        assert!(matches!(
            GameConfig::new(9, 31, 3).validate(),
            Err(GameError::ColsOutOfRange { cols: 31, .. })
        ));
        assert!(matches!(
            GameConfig::new(9, 9, 0).validate(),
            Err(GameError::MinesOutOfRange { mines: 0, .. })
        ));
        assert!(matches!(
            GameConfig::new(30, 30, 151).validate(),
            Err(GameError::MinesOutOfRange { mines: 151, .. })
        ));
        assert_eq!(
            GameConfig::new(2, 2, 4).validate(),
            Err(GameError::TooManyMines { cells: 4, mines: 4 })
        );
    }

    #[test]
    fn difficulty_parses_known_names_only() {
        assert_eq!("expert".parse::<Difficulty>(), Ok(Difficulty::Expert));
        assert_eq!("custom".parse::<Difficulty>(), Ok(Difficulty::Custom));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty("nightmare".to_string()))
        );
        assert_eq!(Difficulty::Expert.preset(), Some(GameConfig::new(16, 30, 99)));
        assert_eq!(Difficulty::Custom.preset(), None);
    }

    #[test]
    fn layout_numbers_match_adjacent_mines() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(layout.truth_at((0, 0)), CellTruth::Mine);
        assert_eq!(layout.truth_at((1, 1)), CellTruth::Number(2));
        assert_eq!(layout.truth_at((0, 1)), CellTruth::Number(1));
        assert_eq!(layout.truth_at((0, 2)), CellTruth::Empty);
        assert_eq!(layout.count_adjacent_mines((1, 1)), 2);
    }

    #[test]
    fn layout_drops_duplicate_mines() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 1), (0, 1)]).unwrap();

        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.mines(), &[(0, 1)]);
        assert_eq!(layout.safe_cell_count(), 3);
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn hit_mine_dominates_merged_outcomes() {
        use RevealOutcome::*;
        assert_eq!(Revealed | HitMine, HitMine);
        assert_eq!(LifeLost | Won, Won);
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
