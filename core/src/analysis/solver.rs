use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use super::{DeductionRules, Observation, suggest_certain_mine_with};
use crate::*;

/// Expands every saturated number until nothing new opens, sweeping the
/// board row-major. Returns the newly exposed cells in exposure order.
pub fn propagate_logical_consequences(engine: &mut PlayEngine) -> Vec<Coord2> {
    let mut exposed = Vec::new();
    loop {
        let mut changed = false;
        for coords in iter_coords(engine.size()) {
            if engine.is_finished() {
                return exposed;
            }
            if !engine.is_saturated(coords) {
                continue;
            }
            let Ok(report) = engine.expand_saturated(coords) else {
                return exposed;
            };
            if !report.exposed.is_empty() {
                changed = true;
                exposed.extend(report.exposed);
            }
        }
        if !changed {
            return exposed;
        }
    }
}

/// One move made by the auto-solver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStep {
    /// Saturated numbers were expanded, exposing these cells.
    Expanded(Vec<Coord2>),
    /// A provable mine was flagged.
    Flagged(Coord2),
    Solved,
    /// No certain mine is left; finishing the board needs a guess.
    Stalled,
}

impl SolveStep {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Solved | Self::Stalled)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    Solved,
    Stalled,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Propagate,
    Deduce,
    Done,
}

/// Lazy auto-solver: each [`step`](Self::step) makes one move and the
/// sequence ends after [`SolveStep::Solved`] or [`SolveStep::Stalled`].
///
/// Only visible information drives the deductions. Dropping the solver
/// between steps leaves the engine in a consistent state.
#[derive(Clone, Debug, Default)]
pub struct AutoSolver {
    phase: Phase,
    rules: DeductionRules,
}

impl AutoSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: DeductionRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    pub fn steps(self, engine: &mut PlayEngine) -> SolveSteps<'_> {
        SolveSteps {
            solver: self,
            engine,
        }
    }

    pub fn step(&mut self, engine: &mut PlayEngine) -> Option<SolveStep> {
        match self.phase {
            Phase::Done => None,
            Phase::Propagate => {
                self.phase = Phase::Deduce;
                let exposed = propagate_logical_consequences(engine);
                if exposed.is_empty() {
                    self.step(engine)
                } else {
                    log::trace!("solver expanded {} cells", exposed.len());
                    Some(SolveStep::Expanded(exposed))
                }
            }
            Phase::Deduce => Some(self.deduce(engine)),
        }
    }

    fn deduce(&mut self, engine: &mut PlayEngine) -> SolveStep {
        if engine.won() {
            self.phase = Phase::Done;
            return SolveStep::Solved;
        }
        if engine.is_finished() {
            self.phase = Phase::Done;
            return SolveStep::Stalled;
        }

        let obs = Observation::from_engine(engine);
        let flagged = suggest_certain_mine_with(&obs, self.rules)
            .filter(|&mine| engine.set_flag(mine, true).is_ok_and(MarkOutcome::has_update));
        match flagged {
            Some(mine) => {
                log::trace!("solver flagged {:?}", mine);
                self.phase = Phase::Propagate;
                SolveStep::Flagged(mine)
            }
            None => {
                log::trace!("solver stalled");
                self.phase = Phase::Done;
                SolveStep::Stalled
            }
        }
    }
}

/// Iterator over the moves of an [`AutoSolver`] on a borrowed engine.
pub struct SolveSteps<'a> {
    solver: AutoSolver,
    engine: &'a mut PlayEngine,
}

impl SolveSteps<'_> {
    pub fn engine(&self) -> &PlayEngine {
        &*self.engine
    }
}

impl Iterator for SolveSteps<'_> {
    type Item = SolveStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.solver.step(self.engine)
    }
}

/// Runs the auto-solver to completion.
pub fn logical_solve(engine: &mut PlayEngine) -> SolveOutcome {
    logical_solve_with(engine, DeductionRules::default())
}

pub fn logical_solve_with(engine: &mut PlayEngine, rules: DeductionRules) -> SolveOutcome {
    match AutoSolver::with_rules(rules).steps(engine).last() {
        Some(SolveStep::Solved) => SolveOutcome::Solved,
        _ => SolveOutcome::Stalled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn engine(size: Coord2, mines: &[Coord2]) -> PlayEngine {
        PlayEngine::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn propagation_opens_cells_around_flagged_numbers() {
        let mut engine = engine((3, 1), &[(0, 0)]);
        engine.reveal((1, 0), Press::Player).unwrap();
        engine.set_flag((0, 0), true).unwrap();

        assert_eq!(propagate_logical_consequences(&mut engine), vec![(2, 0)]);
        assert!(engine.won());
    }

    #[test]
    fn propagation_without_flags_changes_nothing() {
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.reveal((0, 0), Press::Player).unwrap();
        let before = engine.board().clone();

        assert!(propagate_logical_consequences(&mut engine).is_empty());
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn steps_alternate_flags_and_expansions() {
        let mut engine = engine((3, 3), &[(0, 0), (0, 2)]);
        engine.reveal((2, 1), Press::Player).unwrap();

        let steps: Vec<_> = AutoSolver::new().steps(&mut engine).collect();

        assert_eq!(
            steps,
            vec![
                SolveStep::Flagged((0, 2)),
                SolveStep::Expanded(vec![(0, 1)]),
                SolveStep::Flagged((0, 0)),
                SolveStep::Solved,
            ]
        );
        assert!(engine.won());
    }

    #[test]
    fn solver_stalls_when_a_guess_is_needed() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((1, 1), Press::Player).unwrap();

        let mut solver = AutoSolver::new();
        assert_eq!(solver.step(&mut engine), Some(SolveStep::Stalled));
        assert!(solver.is_done());
        assert_eq!(solver.step(&mut engine), None);
        assert_eq!(engine.flag_count(), 0);
    }

    #[test]
    fn logical_solve_finishes_flood_opened_board() {
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.reveal((0, 0), Press::Player).unwrap();

        assert_eq!(logical_solve(&mut engine), SolveOutcome::Solved);
        assert!(engine.board().is_flagged((2, 2)));
    }

    #[test]
    fn clue_only_solver_leaves_mine_count_endgames_alone() {
        // Once (0,1) is flagged no number borders (0,0); only the mine
        // total proves it.
        let mut engine = engine((1, 4), &[(0, 0), (0, 1)]);
        engine.reveal((0, 3), Press::Player).unwrap();

        let mut clue_only = engine.clone();
        assert_eq!(
            logical_solve_with(&mut clue_only, DeductionRules::ClueOnly),
            SolveOutcome::Stalled
        );
        assert!(clue_only.board().is_flagged((0, 1)));
        assert!(!clue_only.board().is_flagged((0, 0)));

        assert_eq!(logical_solve(&mut engine), SolveOutcome::Solved);
        assert!(engine.won());
    }

    #[test]
    fn solver_on_lost_game_stalls() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((0, 0), Press::Player).unwrap();

        assert_eq!(logical_solve(&mut engine), SolveOutcome::Stalled);
    }
}
