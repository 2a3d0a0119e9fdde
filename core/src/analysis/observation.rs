use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything the player can see: exposed numbers, flags, and the mine
/// total. Deduction works on this view only, never on the hidden truth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub mine_count: Option<CellCount>,
    /// Adjacent-mine count of each exposed safe cell, `Some(0)` for empty.
    pub revealed: Array2<Option<u8>>,
    /// Cells known to hold a mine: player flags and exposed mines.
    pub flags: Array2<bool>,
}

impl Observation {
    pub fn new(
        size: Coord2,
        mine_count: Option<CellCount>,
        revealed: Array2<Option<u8>>,
        flags: Array2<bool>,
    ) -> Result<Self> {
        let obs = Self {
            size,
            mine_count,
            revealed,
            flags,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn from_engine(engine: &PlayEngine) -> Self {
        Self::from_engine_with_mine_count(engine, Some(engine.total_mines()))
    }

    pub fn from_engine_with_mine_count(engine: &PlayEngine, mine_count: Option<CellCount>) -> Self {
        let board = engine.board();
        let size = board.size();
        let mut revealed = Array2::from_elem(size.to_nd_index(), None);
        let mut flags = Array2::from_elem(size.to_nd_index(), false);

        for coords in iter_coords(size) {
            let index = coords.to_nd_index();
            if board.is_exposed(coords) {
                match board.truth_at(coords) {
                    CellTruth::Mine => flags[index] = true,
                    CellTruth::Empty => revealed[index] = Some(0),
                    CellTruth::Number(count) => revealed[index] = Some(count),
                }
            } else if board.is_flagged(coords) {
                flags[index] = true;
            }
        }

        Self {
            size,
            mine_count,
            revealed,
            flags,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.revealed.dim() != expected || self.flags.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }

        if let Some(mine_count) = self.mine_count {
            let cells = mult(self.size.0, self.size.1);
            if mine_count > cells {
                return Err(GameError::TooManyMines {
                    cells,
                    mines: mine_count,
                });
            }
        }

        Ok(())
    }

    pub fn number_at(&self, coords: Coord2) -> Option<u8> {
        self.revealed[coords.to_nd_index()]
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.number_at(coords).is_some()
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flags[coords.to_nd_index()]
    }

    /// Neither revealed nor flagged.
    pub fn is_unknown(&self, coords: Coord2) -> bool {
        !self.is_revealed(coords) && !self.is_flagged(coords)
    }

    pub fn flag_count(&self) -> CellCount {
        self.flags.iter().filter(|&&flagged| flagged).count() as CellCount
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_engine_maps_revealed_and_flagged_cells() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::new(layout);

        engine.reveal((1, 1), Press::Player).unwrap();
        engine.set_flag((0, 0), true).unwrap();

        let obs = Observation::from_engine(&engine);

        assert_eq!(obs.mine_count, Some(1));
        assert_eq!(obs.number_at((1, 1)), Some(1));
        assert!(obs.is_flagged((0, 0)));
        assert!(obs.is_unknown((0, 1)));
    }

    #[test]
    fn absorbed_mines_are_known_mines() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut engine = PlayEngine::from_board(Board::new(layout), LivesLedger::new(1).unwrap());

        engine.reveal((0, 0), Press::Player).unwrap();
        let obs = Observation::from_engine(&engine);

        assert!(obs.is_flagged((0, 0)));
        assert!(!obs.is_revealed((0, 0)));
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let obs = Observation {
            size: (2, 2),
            mine_count: Some(1),
            revealed: Array2::from_elem([2, 2], None),
            flags: Array2::from_elem([1, 2], false),
        };

        assert_eq!(obs.validate(), Err(GameError::InvalidBoardShape));
    }
}
