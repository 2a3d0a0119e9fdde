use alloc::collections::VecDeque;
use alloc::vec::Vec;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Who asked for a reveal. Only a direct player press can cost a life or end
/// the game; cascades step around mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Press {
    Player,
    Cascade,
}

const LIFE_SLOTS: usize = LivesLedger::MAX_LIVES as usize;

/// Extra lives and the mines they absorbed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivesLedger {
    lives_left: i8,
    absorbed: [Option<Coord2>; LIFE_SLOTS],
}

impl LivesLedger {
    pub const DISABLED: i8 = -1;
    pub const MAX_LIVES: i8 = 3;

    pub fn new(lives: i8) -> Result<Self> {
        if !(Self::DISABLED..=Self::MAX_LIVES).contains(&lives) {
            return Err(GameError::InvalidExtraLives(lives));
        }
        Ok(Self {
            lives_left: lives,
            absorbed: [None; LIFE_SLOTS],
        })
    }

    pub const fn disabled() -> Self {
        Self {
            lives_left: Self::DISABLED,
            absorbed: [None; LIFE_SLOTS],
        }
    }

    /// Remaining lives, `-1` when the feature is off.
    pub fn lives_left(&self) -> i8 {
        self.lives_left
    }

    pub fn is_absorbed(&self, coords: Coord2) -> bool {
        self.absorbed.contains(&Some(coords))
    }

    pub fn absorbed(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.absorbed.iter().flatten().copied()
    }

    /// Spends a life on the mine at `coords`, slotting it at the new life
    /// count. Returns `false` when no life is left.
    fn absorb(&mut self, coords: Coord2) -> bool {
        if self.lives_left <= 0 {
            return false;
        }
        self.lives_left -= 1;
        self.absorbed[self.lives_left as usize] = Some(coords);
        true
    }
}

impl Default for LivesLedger {
    fn default() -> Self {
        Self::disabled()
    }
}

/// What a single reveal changed.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    /// Cells exposed by this reveal, in visit order.
    pub exposed: Vec<Coord2>,
    /// Unflagged mines a cascade stepped over, e.g. behind a misplaced flag.
    pub skipped_mines: Vec<Coord2>,
}

impl RevealReport {
    fn unchanged() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            exposed: Vec::new(),
            skipped_mines: Vec::new(),
        }
    }
}

/// Reveal engine over a [`Board`]: flood fill, armed-number expansion, extra
/// lives and the win/loss transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    board: Board,
    lives: LivesLedger,
    state: EngineState,
    last_pressed: Option<Coord2>,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        Self::from_board(Board::new(mine_layout), LivesLedger::disabled())
    }

    pub fn from_board(board: Board, lives: LivesLedger) -> Self {
        Self {
            board,
            lives,
            state: Default::default(),
            last_pressed: None,
            triggered_mine: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn layout(&self) -> &MineLayout {
        self.board.layout()
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn won(&self) -> bool {
        matches!(self.state, EngineState::Won)
    }

    pub fn lost(&self) -> bool {
        matches!(self.state, EngineState::Lost)
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.layout().mine_count()
    }

    pub fn flag_count(&self) -> CellCount {
        self.board.flag_count()
    }

    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flag_count() as isize)
    }

    pub fn lives(&self) -> &LivesLedger {
        &self.lives
    }

    pub fn lives_left(&self) -> i8 {
        self.lives.lives_left()
    }

    pub fn last_pressed(&self) -> Option<Coord2> {
        self.last_pressed
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Flagged neighbours plus neighbouring mines already absorbed by a life.
    /// Flags are trusted, correct or not.
    pub fn count_accounted_neighbors(&self, coords: Coord2) -> u8 {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.board.is_flagged(pos) || self.lives.is_absorbed(pos))
            .count() as u8
    }

    /// An exposed number whose accounted neighbours reach its count.
    pub fn is_saturated(&self, coords: Coord2) -> bool {
        match self.board.truth_at(coords) {
            CellTruth::Number(count) if self.board.is_exposed(coords) => {
                self.count_accounted_neighbors(coords) >= count
            }
            _ => false,
        }
    }

    pub fn set_flag(&mut self, coords: Coord2, flagged: bool) -> Result<MarkOutcome> {
        self.check_not_finished()?;
        let outcome = self.board.set_flag(coords, flagged)?;
        if outcome.has_update() {
            self.refresh_won();
        }
        Ok(outcome)
    }

    /// Reveals `coords`. Out-of-bounds coordinates are ignored.
    ///
    /// A player press on an armed number expands its neighbours once the
    /// flagged and absorbed neighbours cover its count.
    pub fn reveal(&mut self, coords: Coord2, press: Press) -> Result<RevealReport> {
        if !self.board.in_bounds(coords) {
            return Ok(RevealReport::unchanged());
        }
        self.check_not_finished()?;

        if matches!(press, Press::Player) {
            self.last_pressed = Some(coords);
        }

        let mut report = RevealReport::unchanged();
        let mut queue = VecDeque::from([(coords, press)]);
        self.run_queue(&mut queue, &mut report);
        self.finish_reveal(&mut report);
        Ok(report)
    }

    /// Simulated second press on a saturated number, used by the solver.
    /// Does not move `last_pressed` and never costs a life. A number with no
    /// closed safe neighbour is left alone.
    pub fn expand_saturated(&mut self, coords: Coord2) -> Result<RevealReport> {
        self.check_not_finished()?;
        let mut report = RevealReport::unchanged();

        if !self.is_saturated(coords) || !self.has_closed_safe_neighbor(coords) {
            return Ok(report);
        }

        self.board.set_press_count(coords, PressCount::Saturated);
        let mut queue: VecDeque<_> = self
            .board
            .iter_neighbors(coords)
            .map(|pos| (pos, Press::Cascade))
            .collect();
        self.run_queue(&mut queue, &mut report);
        self.finish_reveal(&mut report);
        Ok(report)
    }

    /// Re-evaluates the win condition, e.g. after flags changed outside a reveal.
    pub fn refresh_won(&mut self) -> bool {
        if !self.is_finished() && self.board.is_cleared() {
            log::debug!("board cleared");
            self.state = EngineState::Won;
        }
        self.won()
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn has_closed_safe_neighbor(&self, coords: Coord2) -> bool {
        self.board
            .iter_neighbors(coords)
            .any(|pos| !self.board.is_exposed(pos) && !self.board.layout().contains_mine(pos))
    }

    fn run_queue(&mut self, queue: &mut VecDeque<(Coord2, Press)>, report: &mut RevealReport) {
        let mut visited = HashSet::new();

        while let Some((visit_coords, press)) = queue.pop_front() {
            if matches!(press, Press::Cascade) && !visited.insert(visit_coords) {
                continue;
            }
            self.reveal_single_cell(visit_coords, press, queue, report);
            if self.lost() {
                break;
            }
        }
    }

    fn reveal_single_cell(
        &mut self,
        coords: Coord2,
        press: Press,
        queue: &mut VecDeque<(Coord2, Press)>,
        report: &mut RevealReport,
    ) {
        let truth = self.board.truth_at(coords);
        let exposed = self.board.is_exposed(coords);

        if exposed && truth.number().is_none() {
            return;
        }
        // A flag only shields a mine; a misflagged safe cell still opens.
        if truth.is_mine() && self.board.is_flagged(coords) {
            return;
        }

        match truth {
            CellTruth::Mine => match press {
                Press::Cascade => {
                    log::trace!("cascade stepped over mine at {:?}", coords);
                    report.skipped_mines.push(coords);
                }
                Press::Player => {
                    self.board.expose(coords);
                    report.exposed.push(coords);
                    if self.lives.absorb(coords) {
                        log::debug!(
                            "mine at {:?} absorbed, {} lives left",
                            coords,
                            self.lives.lives_left()
                        );
                        report.outcome = report.outcome | RevealOutcome::LifeLost;
                    } else {
                        log::debug!("mine hit at {:?}", coords);
                        self.triggered_mine = Some(coords);
                        self.state = EngineState::Lost;
                        report.outcome = report.outcome | RevealOutcome::HitMine;
                    }
                }
            },
            CellTruth::Empty => {
                self.board.expose(coords);
                report.exposed.push(coords);
                queue.extend(
                    self.board
                        .iter_neighbors(coords)
                        .filter(|&pos| !self.board.is_exposed(pos))
                        .map(|pos| (pos, Press::Cascade)),
                );
            }
            CellTruth::Number(count) => {
                if self.board.expose(coords) {
                    report.exposed.push(coords);
                }

                if !self.board.press_count(coords).is_armed() {
                    self.board.set_press_count(coords, PressCount::Armed);
                } else if matches!(press, Press::Player)
                    && self.count_accounted_neighbors(coords) >= count
                {
                    log::trace!("expanding around {:?}", coords);
                    self.board.set_press_count(coords, PressCount::Saturated);
                    queue.extend(
                        self.board
                            .iter_neighbors(coords)
                            .map(|pos| (pos, Press::Cascade)),
                    );
                }
            }
        }
    }

    fn finish_reveal(&mut self, report: &mut RevealReport) {
        if !report.exposed.is_empty() {
            report.outcome = report.outcome | RevealOutcome::Revealed;
            self.mark_started();
        }
        if self.refresh_won() {
            report.outcome = report.outcome | RevealOutcome::Won;
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            self.state = EngineState::Active;
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
