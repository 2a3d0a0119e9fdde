use alloc::vec::Vec;

use super::propagate_logical_consequences;
use crate::*;

/// A mine is only offered as a hint once this many of its safe neighbours
/// are exposed.
pub const HINT_MIN_EXPOSED_NEIGHBORS: usize = 3;

/// Cells that would newly open if `mine` were flagged and every saturated
/// number expanded to a fixpoint. Simulated on a copy of the engine.
pub fn calculate_expansion_score(engine: &PlayEngine, mine: Coord2) -> CellCount {
    let mut simulated = engine.clone();
    if !simulated.set_flag(mine, true).is_ok_and(MarkOutcome::has_update) {
        return 0;
    }
    propagate_logical_consequences(&mut simulated);
    simulated.board().exposed_count() - engine.board().exposed_count()
}

fn exposed_safe_neighbors(engine: &PlayEngine, mine: Coord2) -> usize {
    let board = engine.board();
    board
        .iter_neighbors(mine)
        .filter(|&pos| board.is_exposed(pos) && !board.layout().contains_mine(pos))
        .count()
}

/// Best hint: the hidden, unflagged mine whose flag would open the most
/// cells. Reads the hidden truth, so it is a helper feature and not part
/// of the fair deduction. Ties go to the earliest mine in the roster.
pub fn suggest_next_mine_to_reveal(engine: &PlayEngine) -> Option<Coord2> {
    let board = engine.board();
    let mut best = None;
    let mut best_gain = 0;

    for &mine in engine.layout().mines() {
        if board.is_exposed(mine) || board.is_flagged(mine) {
            continue;
        }
        if exposed_safe_neighbors(engine, mine) < HINT_MIN_EXPOSED_NEIGHBORS {
            continue;
        }

        let gain = calculate_expansion_score(engine, mine);
        if gain > best_gain {
            best_gain = gain;
            best = Some(mine);
        }
    }

    if let Some(mine) = best {
        log::debug!("hint {:?} would open {} cells", mine, best_gain);
    }
    best
}

/// Flags every unflagged mine with no hidden safe neighbour left, then
/// re-checks the win. Returns the newly flagged mines in roster order.
pub fn flag_isolated_mines(engine: &mut PlayEngine) -> Vec<Coord2> {
    let mut added = Vec::new();
    if engine.is_finished() {
        return added;
    }

    let mines = engine.layout().mines().to_vec();
    for mine in mines {
        let board = engine.board();
        if board.is_flagged(mine) {
            continue;
        }
        let hidden_safe = board
            .iter_neighbors(mine)
            .any(|pos| !board.is_exposed(pos) && !board.layout().contains_mine(pos));
        if hidden_safe {
            continue;
        }
        if matches!(
            engine.board_mut().set_flag(mine, true),
            Ok(MarkOutcome::Changed)
        ) {
            added.push(mine);
        }
    }

    engine.refresh_won();
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn engine(size: Coord2, mines: &[Coord2]) -> PlayEngine {
        PlayEngine::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    /// 3x4 board, single mine at (0,1), everything but (0,0) and the mine open.
    fn corner_pocket() -> PlayEngine {
        let mut engine = engine((3, 4), &[(0, 1)]);
        engine.reveal((2, 3), Press::Player).unwrap();
        engine
    }

    #[test]
    fn expansion_score_counts_cells_opened_by_the_flag() {
        let engine = corner_pocket();

        assert!(!engine.board().is_exposed((0, 0)));
        assert_eq!(calculate_expansion_score(&engine, (0, 1)), 1);
        assert!(!engine.board().is_flagged((0, 1)));
    }

    #[test]
    fn hint_picks_mine_that_opens_cells() {
        let engine = corner_pocket();

        assert_eq!(suggest_next_mine_to_reveal(&engine), Some((0, 1)));
    }

    #[test]
    fn hint_needs_enough_exposed_neighbors() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((1, 1), Press::Player).unwrap();

        assert_eq!(suggest_next_mine_to_reveal(&engine), None);
    }

    #[test]
    fn hint_without_gain_is_none() {
        // Flagging the mine just wins; no cell opens.
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.reveal((0, 0), Press::Player).unwrap();

        assert_eq!(suggest_next_mine_to_reveal(&engine), None);
    }

    #[test]
    fn isolated_mines_are_flagged_and_win() {
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.reveal((0, 0), Press::Player).unwrap();

        assert_eq!(flag_isolated_mines(&mut engine), vec![(2, 2)]);
        assert!(engine.won());
    }

    #[test]
    fn mines_with_hidden_safe_neighbors_stay_unflagged() {
        let mut engine = corner_pocket();

        assert!(flag_isolated_mines(&mut engine).is_empty());
        assert_eq!(engine.flag_count(), 0);
    }
}
