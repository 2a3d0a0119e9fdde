use alloc::collections::VecDeque;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Result of a logical-mode search.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalOutcome {
    /// A layout the auto-solver clears from the opening already exposed on
    /// `board`, without guessing.
    Solvable { board: Board, attempts: usize },
    /// No candidate passed within the budget. `layout` is the last one
    /// tried, with nothing exposed.
    Exhausted { layout: MineLayout, attempts: usize },
}

impl LogicalOutcome {
    pub fn is_solvable(&self) -> bool {
        matches!(self, Self::Solvable { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Self::Solvable { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_board(self) -> Board {
        match self {
            Self::Solvable { board, .. } => board,
            Self::Exhausted { layout, .. } => Board::new(layout),
        }
    }
}

/// Rejection search for boards that can be cleared by deduction alone from
/// one opening click.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicalMinefieldGenerator {
    seed: u64,
    max_boards: usize,
}

impl LogicalMinefieldGenerator {
    pub const MAX_BOARDS: usize = 500;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_boards: Self::MAX_BOARDS,
        }
    }

    pub fn with_max_boards(mut self, max_boards: usize) -> Self {
        self.max_boards = max_boards.max(1);
        self
    }

    pub fn search(self, config: GameConfig) -> LogicalOutcome {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut layout = None;

        for attempt in 1..=self.max_boards {
            let candidate = RandomMinefieldGenerator::new(rng.random()).generate(config);
            if let Some(board) = solvable_opening(&candidate) {
                log::debug!("logical board found after {} attempts", attempt);
                return LogicalOutcome::Solvable {
                    board,
                    attempts: attempt,
                };
            }
            layout = Some(candidate);
        }

        log::warn!(
            "No logically solvable {}x{} board with {} mines in {} attempts, falling back to random",
            config.rows,
            config.cols,
            config.mines,
            self.max_boards
        );
        LogicalOutcome::Exhausted {
            layout: layout.unwrap_or_else(|| RandomMinefieldGenerator::new(rng.random()).generate(config)),
            attempts: self.max_boards,
        }
    }
}

impl MinefieldGenerator for LogicalMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        match self.search(config) {
            LogicalOutcome::Solvable { board, .. } => board.layout().clone(),
            LogicalOutcome::Exhausted { layout, .. } => layout,
        }
    }
}

/// Maximal 8-connected regions of empty cells, largest first. Regions of
/// equal size keep row-major discovery order.
pub fn zero_regions(layout: &MineLayout) -> Vec<Vec<Coord2>> {
    let size = layout.size();
    let mut seen: Array2<bool> = Array2::default(size.to_nd_index());
    let mut regions = Vec::new();

    for start in iter_coords(size) {
        if seen[start.to_nd_index()] || !layout.truth_at(start).is_empty() {
            continue;
        }
        seen[start.to_nd_index()] = true;

        let mut region = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(coords) = queue.pop_front() {
            region.push(coords);
            for (pos, truth) in layout.truth_grid().iter_neighbor_cells(coords) {
                if truth.is_empty() && !seen[pos.to_nd_index()] {
                    seen[pos.to_nd_index()] = true;
                    queue.push_back(pos);
                }
            }
        }
        regions.push(region);
    }

    regions.sort_by(|a, b| b.len().cmp(&a.len()));
    regions
}

/// Tries each zero region as the opening click and accepts the first one
/// the clue passes alone solve. On success returns the board with just that
/// opening exposed.
fn solvable_opening(layout: &MineLayout) -> Option<Board> {
    for region in zero_regions(layout) {
        let mut engine = PlayEngine::new(layout.clone());
        let Ok(report) = engine.reveal(region[0], Press::Player) else {
            continue;
        };
        if engine.lost() || !report.skipped_mines.is_empty() {
            continue;
        }

        let opening = engine.board().visible_state().clone();
        if logical_solve_with(&mut engine, DeductionRules::ClueOnly) == SolveOutcome::Solved {
            let mut board = engine.into_board();
            board.restore_visible_state(opening);
            board.clear_presses();
            return Some(board);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_board_has_no_zero_region() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(1, 1)]).unwrap();

        assert!(zero_regions(&layout).is_empty());
    }

    #[test]
    fn zero_regions_keep_scan_order_on_ties() {
        let layout = MineLayout::from_mine_coords((3, 7), &[(0, 3), (1, 3), (2, 3)]).unwrap();
        let regions = zero_regions(&layout);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].len(), 6);
        assert_eq!(regions[0][0], (0, 0));
        assert_eq!(regions[1].len(), 6);
        assert_eq!(regions[1][0], (0, 5));
    }

    #[test]
    fn zero_regions_prefer_the_larger_opening() {
        let layout = MineLayout::from_mine_coords((3, 8), &[(0, 2), (1, 2), (2, 2)]).unwrap();
        let regions = zero_regions(&layout);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0][0], (0, 4));
        assert_eq!(regions[0].len(), 12);
        assert_eq!(regions[1].len(), 3);
    }

    #[test]
    fn accepted_boards_solve_from_their_opening() {
        for seed in 0..5 {
            let outcome = LogicalMinefieldGenerator::new(seed).search(GameConfig::BEGINNER);
            let LogicalOutcome::Solvable { board, attempts } = outcome else {
                panic!("beginner search should succeed");
            };
            assert!(attempts <= LogicalMinefieldGenerator::MAX_BOARDS);
            assert!(board.exposed_count() > 0);
            assert_eq!(board.flag_count(), 0);
            assert!(iter_coords(board.size())
                .all(|coords| board.press_count(coords) == PressCount::Untouched));
            assert!(iter_coords(board.size())
                .all(|coords| !board.is_exposed(coords) || !board.layout().contains_mine(coords)));

            let mut engine = PlayEngine::from_board(board, LivesLedger::disabled());
            assert_eq!(
                logical_solve_with(&mut engine, DeductionRules::ClueOnly),
                SolveOutcome::Solved
            );
        }
    }

    #[test]
    fn expert_boards_never_lean_on_the_mine_count() {
        for seed in [38, 39] {
            let outcome = LogicalMinefieldGenerator::new(seed).search(GameConfig::EXPERT);
            let LogicalOutcome::Solvable { board, .. } = outcome else {
                panic!("expert search should succeed");
            };

            let mut engine = PlayEngine::from_board(board, LivesLedger::disabled());
            assert_eq!(
                logical_solve_with(&mut engine, DeductionRules::ClueOnly),
                SolveOutcome::Solved
            );
        }
    }

    #[test]
    fn exhausted_search_falls_back_to_unopened_layout() {
        // Too dense for any empty cell, so no opening exists.
        let config = GameConfig::new(3, 3, 8);
        let outcome = LogicalMinefieldGenerator::new(3)
            .with_max_boards(4)
            .search(config);

        assert!(!outcome.is_solvable());
        assert_eq!(outcome.attempts(), 4);
        let board = outcome.into_board();
        assert_eq!(board.layout().mine_count(), 8);
        assert_eq!(board.exposed_count(), 0);
    }
}
