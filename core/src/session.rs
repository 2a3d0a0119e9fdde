use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::*;

/// Games played and won plus the best time of each difficulty slot.
///
/// Lives for the whole process and is handed to each [`GameSession`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsStore {
    games_played: u64,
    games_won: u64,
    /// Seconds per [`Difficulty::slot`], `0` while unset.
    best_times: [u64; 4],
}

impl StatisticsStore {
    pub fn new() -> Self {
        Self {
            games_played: 1,
            games_won: 0,
            best_times: [0; 4],
        }
    }

    pub fn games_played(&self) -> u64 {
        self.games_played
    }

    pub fn games_won(&self) -> u64 {
        self.games_won
    }

    pub fn best_times(&self) -> [u64; 4] {
        self.best_times
    }

    pub fn best_time(&self, difficulty: Difficulty) -> Option<u64> {
        match self.best_times[difficulty.slot()] {
            0 => None,
            secs => Some(secs),
        }
    }

    pub fn record_win(&mut self, difficulty: Difficulty, elapsed_secs: u64) {
        self.games_won += 1;
        let best = &mut self.best_times[difficulty.slot()];
        if *best == 0 || elapsed_secs < *best {
            *best = elapsed_secs;
        }
    }

    pub fn record_reset(&mut self) {
        self.games_played += 1;
    }

    /// One line per slot that is current or has a record, e.g.
    /// `Beginner best time: 42 seconds`.
    pub fn best_times_report(&self, current: Difficulty) -> String {
        let mut report = String::new();
        for difficulty in Difficulty::ALL {
            let secs = self.best_times[difficulty.slot()];
            if difficulty == current || secs > 0 {
                report.push_str(&format!("{} best time: {} seconds\n", difficulty.label(), secs));
            }
        }
        report
    }
}

impl Default for StatisticsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Player-chosen settings for the next game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub difficulty: Difficulty,
    /// Board used when `difficulty` is custom.
    pub custom: GameConfig,
    pub logical_mode: bool,
    /// `-1` disables extra lives.
    pub extra_lives: i8,
}

impl SessionSettings {
    pub fn board_config(&self) -> GameConfig {
        self.difficulty.preset().unwrap_or(self.custom)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Beginner,
            custom: GameConfig::BEGINNER,
            logical_mode: false,
            extra_lives: LivesLedger::DISABLED,
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Game session state machine: settings, the running game and statistics.
///
/// Gameplay calls made before [`start_game`](Self::start_game) panic.
#[derive(Clone, Debug)]
pub struct GameSession {
    settings: SessionSettings,
    stats: StatisticsStore,
    rng: SmallRng,
    engine: Option<PlayEngine>,
    difficulty: Difficulty,
    logical_guarantee: bool,
    win_recorded: bool,
    last_elapsed: u64,
}

impl GameSession {
    pub fn new(stats: StatisticsStore) -> Self {
        Self::with_seed(stats, clock_seed())
    }

    pub fn with_seed(stats: StatisticsStore, seed: u64) -> Self {
        Self {
            settings: Default::default(),
            stats,
            rng: SmallRng::seed_from_u64(seed),
            engine: None,
            difficulty: Difficulty::Beginner,
            logical_guarantee: false,
            win_recorded: false,
            last_elapsed: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Replaces every setting at once. Board ranges are checked by
    /// [`start_game`](Self::start_game).
    pub fn set_settings(&mut self, settings: SessionSettings) -> Result<()> {
        LivesLedger::new(settings.extra_lives)?;
        self.settings = settings;
        Ok(())
    }

    pub fn difficulties(&self) -> [Difficulty; 4] {
        Difficulty::ALL
    }

    pub fn configure(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
    }

    /// Out-of-range values are refused and the previous custom rows kept.
    pub fn set_custom_rows(&mut self, rows: Coord) -> Result<()> {
        if !(GameConfig::MIN_SIDE..=GameConfig::MAX_SIDE).contains(&rows) {
            return Err(GameError::RowsOutOfRange {
                rows,
                min: GameConfig::MIN_SIDE,
                max: GameConfig::MAX_SIDE,
            });
        }
        self.settings.custom.rows = rows;
        Ok(())
    }

    pub fn set_custom_cols(&mut self, cols: Coord) -> Result<()> {
        if !(GameConfig::MIN_SIDE..=GameConfig::MAX_SIDE).contains(&cols) {
            return Err(GameError::ColsOutOfRange {
                cols,
                min: GameConfig::MIN_SIDE,
                max: GameConfig::MAX_SIDE,
            });
        }
        self.settings.custom.cols = cols;
        Ok(())
    }

    pub fn set_custom_mines(&mut self, mines: CellCount) -> Result<()> {
        if !(GameConfig::MIN_MINES..=GameConfig::MAX_MINES).contains(&mines) {
            return Err(GameError::MinesOutOfRange {
                mines,
                min: GameConfig::MIN_MINES,
                max: GameConfig::MAX_MINES,
            });
        }
        self.settings.custom.mines = mines;
        Ok(())
    }

    pub fn set_logical_mode(&mut self, logical_mode: bool) {
        self.settings.logical_mode = logical_mode;
    }

    pub fn logical_mode(&self) -> bool {
        self.settings.logical_mode
    }

    pub fn set_extra_lives(&mut self, lives: i8) -> Result<()> {
        LivesLedger::new(lives)?;
        self.settings.extra_lives = lives;
        Ok(())
    }

    /// Generates a new board from the current settings. On error the
    /// previous game, if any, is left untouched.
    pub fn start_game(&mut self) -> Result<()> {
        let config = self.settings.board_config();
        config.validate()?;
        let lives = LivesLedger::new(self.settings.extra_lives)?;
        let seed = self.rng.random();

        let board = if self.settings.logical_mode {
            let outcome = LogicalMinefieldGenerator::new(seed).search(config);
            self.logical_guarantee = outcome.is_solvable();
            outcome.into_board()
        } else {
            self.logical_guarantee = false;
            Board::new(RandomMinefieldGenerator::new(seed).generate(config))
        };

        log::debug!(
            "starting {} game {}x{} with {} mines",
            self.settings.difficulty,
            config.rows,
            config.cols,
            config.mines
        );
        self.engine = Some(PlayEngine::from_board(board, lives));
        self.difficulty = self.settings.difficulty;
        self.win_recorded = false;
        self.last_elapsed = 0;
        Ok(())
    }

    /// Counts a new game and restores the default settings. Logical mode
    /// and the statistics survive.
    pub fn reset_game(&mut self) {
        self.stats.record_reset();
        self.settings = SessionSettings {
            logical_mode: self.settings.logical_mode,
            ..Default::default()
        };
        self.engine = None;
        self.difficulty = Difficulty::Beginner;
        self.logical_guarantee = false;
        self.win_recorded = false;
        self.last_elapsed = 0;
    }

    pub fn has_game(&self) -> bool {
        self.engine.is_some()
    }

    /// The running game.
    ///
    /// # Panics
    ///
    /// If no game has been started.
    pub fn engine(&self) -> &PlayEngine {
        self.engine.as_ref().expect("game has not been started")
    }

    fn engine_mut(&mut self) -> &mut PlayEngine {
        self.engine.as_mut().expect("game has not been started")
    }

    pub fn tile_pressed(&mut self, coords: Coord2, elapsed_secs: u64) -> Result<RevealReport> {
        let report = self.engine_mut().reveal(coords, Press::Player)?;
        self.last_elapsed = elapsed_secs;
        if report.outcome == RevealOutcome::HitMine {
            log::debug!("game lost at {:?}", coords);
        }
        self.record_win();
        Ok(report)
    }

    pub fn tile_flagged(&mut self, flagged: bool, coords: Coord2) -> Result<MarkOutcome> {
        let outcome = self.engine_mut().set_flag(coords, flagged)?;
        self.record_win();
        Ok(outcome)
    }

    pub fn player_won(&self) -> bool {
        self.engine().won()
    }

    pub fn player_lost(&self) -> bool {
        self.engine().lost()
    }

    /// Flags the mine whose flag would open the most cells.
    pub fn apply_hint(&mut self) -> Option<Coord2> {
        let Some(mine) = suggest_next_mine_to_reveal(self.engine()) else {
            log::debug!("no hint available");
            return None;
        };
        self.engine_mut().set_flag(mine, true).ok()?;
        self.record_win();
        Some(mine)
    }

    /// Next mine provable from the visible board, without flagging it.
    pub fn next_logical_mine(&self) -> Option<Coord2> {
        suggest_certain_mine(&Observation::from_engine(self.engine()))
    }

    pub fn propagate_logical_consequences(&mut self) -> Vec<Coord2> {
        let exposed = propagate_logical_consequences(self.engine_mut());
        self.record_win();
        exposed
    }

    pub fn flag_isolated_mines(&mut self) -> Vec<Coord2> {
        let flagged = flag_isolated_mines(self.engine_mut());
        self.record_win();
        flagged
    }

    /// Auto-solve as a lazy sequence of moves. Stop consuming it to cancel.
    pub fn auto_solve(&mut self) -> SessionSolveSteps<'_> {
        assert!(self.has_game(), "game has not been started");
        SessionSolveSteps {
            session: self,
            solver: AutoSolver::new(),
        }
    }

    pub fn logical_solve(&mut self) -> SolveOutcome {
        match self.auto_solve().last() {
            Some(SolveStep::Solved) => SolveOutcome::Solved,
            _ => SolveOutcome::Stalled,
        }
    }

    /// Whether the running board came out of a successful logical search.
    pub fn logical_guarantee(&self) -> bool {
        self.logical_guarantee
    }

    pub fn grid(&self) -> &Array2<CellTruth> {
        self.engine().layout().truth_grid()
    }

    pub fn exposed(&self) -> &Array2<bool> {
        self.engine().board().exposed()
    }

    pub fn flagged(&self) -> &Array2<bool> {
        self.engine().board().flagged()
    }

    /// Mines of the configured board, known before a game starts.
    pub fn num_mines(&self) -> CellCount {
        match &self.engine {
            Some(engine) => engine.total_mines(),
            None => self.settings.board_config().mines,
        }
    }

    pub fn num_flags(&self) -> CellCount {
        self.engine().flag_count()
    }

    pub fn mines_left(&self) -> isize {
        self.engine().mines_left()
    }

    pub fn last_pressed(&self) -> Option<Coord2> {
        self.engine().last_pressed()
    }

    pub fn lives_left(&self) -> i8 {
        match &self.engine {
            Some(engine) => engine.lives_left(),
            None => self.settings.extra_lives,
        }
    }

    pub fn statistics(&self) -> &StatisticsStore {
        &self.stats
    }

    pub fn into_statistics(self) -> StatisticsStore {
        self.stats
    }

    pub fn best_times_report(&self) -> String {
        self.stats.best_times_report(self.settings.difficulty)
    }

    fn record_win(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        if self.win_recorded || !engine.won() {
            return;
        }
        self.win_recorded = true;
        log::debug!(
            "{} game won in {} seconds",
            self.difficulty,
            self.last_elapsed
        );
        self.stats.record_win(self.difficulty, self.last_elapsed);
    }
}

/// Auto-solve steps on a session; a win reached by the solver is recorded.
pub struct SessionSolveSteps<'a> {
    session: &'a mut GameSession,
    solver: AutoSolver,
}

impl Iterator for SessionSolveSteps<'_> {
    type Item = SolveStep;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.solver.step(self.session.engine_mut());
        self.session.record_win();
        step
    }
}
