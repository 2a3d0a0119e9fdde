use alloc::string::String;
use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Rows must be between {min} and {max}, got {rows}")]
    RowsOutOfRange { rows: Coord, min: Coord, max: Coord },
    #[error("Columns must be between {min} and {max}, got {cols}")]
    ColsOutOfRange { cols: Coord, min: Coord, max: Coord },
    #[error("Mines must be between {min} and {max}, got {mines}")]
    MinesOutOfRange {
        mines: CellCount,
        min: CellCount,
        max: CellCount,
    },
    #[error("Board too small: {cells} cells cannot hold {mines} mines")]
    TooManyMines { cells: CellCount, mines: CellCount },
    #[error("Extra lives must be -1 (disabled) or between 0 and 3, got {0}")]
    InvalidExtraLives(i8),
    #[error("Unknown difficulty {0:?}")]
    UnknownDifficulty(String),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
