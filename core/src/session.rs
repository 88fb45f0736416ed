use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Ready -> Active, on the first effective reveal or flag
/// - Ready -> Won | Lost, when that first reveal already ends the game
/// - Active -> Won | Lost
/// - any -> Ready, on reset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What a frontend should draw for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// The mine that ended the game.
    Exploded,
    /// A mine shown after the game ended.
    Mine,
}

/// One game at a time for the selected difficulty, plus everything needed to start the next.
#[derive(Clone, Debug)]
pub struct GameSession {
    difficulty: Difficulty,
    board: Board,
    reveal_state: RevealState,
    flag_state: FlagState,
    timer: Timer,
    state: SessionState,
    triggered_mine: Option<Coord2>,
    rng: SmallRng,
}

impl GameSession {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_seed(difficulty, rand::random())
    }

    /// Reproducible sequence of boards: the same seed yields the same games.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Self::generate_board(difficulty, &mut rng);
        Self::from_parts(difficulty, board, rng)
    }

    /// Starts with a fixed layout, later resets generate boards for `difficulty`.
    pub fn with_board(difficulty: Difficulty, board: Board) -> Self {
        Self::from_parts(difficulty, board, SmallRng::seed_from_u64(rand::random()))
    }

    fn from_parts(difficulty: Difficulty, board: Board, rng: SmallRng) -> Self {
        Self {
            difficulty,
            board,
            reveal_state: RevealState::new(),
            flag_state: FlagState::new(),
            timer: Timer::new(),
            state: SessionState::Ready,
            triggered_mine: None,
            rng,
        }
    }

    fn generate_board(difficulty: Difficulty, rng: &mut SmallRng) -> Board {
        let seed = rng.random();
        match generate(difficulty.config(), seed) {
            Ok(board) => board,
            // presets always leave room for a safe cell
            Err(err) => unreachable!("preset {difficulty} is invalid: {err}"),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.board.mine_count()
    }

    pub fn reveal_state(&self) -> &RevealState {
        &self.reveal_state
    }

    pub fn flag_state(&self) -> &FlagState {
        &self.flag_state
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Seconds since the first action, `None` before it.
    pub fn elapsed(&self) -> Option<Secs> {
        self.timer.elapsed()
    }

    /// Final time of a won game.
    pub fn completion_time(&self) -> Option<Secs> {
        match self.state {
            SessionState::Won => self.timer.elapsed(),
            _ => None,
        }
    }

    pub fn mines_left(&self) -> isize {
        self.flag_state.remaining(self.board.mine_count())
    }

    /// Mine counter as displayed, frozen at zero while over-flagged.
    pub fn displayed_mines_left(&self) -> CellCount {
        self.flag_state.displayed_remaining(self.board.mine_count())
    }

    /// Panics if `coords` is outside the board, check with [`Board::contains`] first.
    pub fn cell_at(&self, coords: Coord2) -> CellView {
        debug_assert!(self.board.contains(coords), "{coords:?} is outside the board");
        if self.reveal_state.contains(coords) {
            return match self.board[coords] {
                CellValue::Clue(count) => CellView::Revealed(count),
                CellValue::Mine => CellView::Exploded,
            };
        }
        if self.flag_state.contains(coords) {
            return CellView::Flagged;
        }
        if self.state.is_finished() && self.board.contains_mine(coords) {
            return CellView::Mine;
        }
        CellView::Hidden
    }

    /// Mine positions, only available once the game is over.
    pub fn revealed_mines(&self) -> Option<impl Iterator<Item = Coord2> + '_> {
        self.state.is_finished().then(|| self.board.mines())
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.board.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(RevealResult::NoOp);
        }

        let result = reveal(
            &self.board,
            &mut self.reveal_state,
            &self.flag_state,
            coords,
        );
        match &result {
            RevealResult::NoOp => {}
            RevealResult::MineHit => {
                self.mark_started();
                self.triggered_mine = Some(coords);
                self.end_game(false);
            }
            RevealResult::Cleared(_) => {
                self.mark_started();
                if all_safe_revealed(&self.board, &self.reveal_state) {
                    self.end_game(true);
                }
            }
        }
        Ok(result)
    }

    pub fn add_flag(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.board.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(false);
        }

        let added = self.flag_state.add(&self.reveal_state, coords);
        if added {
            log::debug!("Flag at {:?}, {} mines left", coords, self.mines_left());
            self.mark_started();
        }
        Ok(added)
    }

    pub fn remove_flag(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.board.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(false);
        }

        let removed = self.flag_state.remove(coords);
        if removed {
            log::debug!("Unflag at {:?}, {} mines left", coords, self.mines_left());
        }
        Ok(removed)
    }

    /// Flags a hidden cell or unflags a flagged one.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.board.validate_coords(coords)?;
        if self.flag_state.contains(coords) {
            self.remove_flag(coords)
        } else {
            self.add_flag(coords)
        }
    }

    /// Advances the timer to `now`, returning how many seconds ticked.
    pub fn poll_timer(&mut self, now: Instant) -> Secs {
        self.timer.poll(now)
    }

    pub fn tick(&mut self) -> Secs {
        self.poll_timer(Instant::now())
    }

    /// Time until the next timer tick, `None` while the timer is not running.
    pub fn until_next_tick(&self) -> Option<core::time::Duration> {
        self.timer.until_next_tick(Instant::now())
    }

    /// Discards the current game and generates a fresh board.
    pub fn reset(&mut self) {
        self.board = Self::generate_board(self.difficulty, &mut self.rng);
        self.reveal_state.clear();
        self.flag_state.clear();
        self.timer.reset();
        self.state = SessionState::Ready;
        self.triggered_mine = None;
        log::debug!("New {} game", self.difficulty);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.reset();
    }

    fn mark_started(&mut self) {
        if matches!(self.state, SessionState::Ready) {
            self.timer.start(Instant::now());
            self.state = SessionState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.timer.poll(Instant::now());
        self.timer.stop();
        self.state = if won {
            SessionState::Won
        } else {
            SessionState::Lost
        };
        log::info!(
            "Game {} after {}s on {}",
            if won { "won" } else { "lost" },
            self.timer.elapsed().unwrap_or(0),
            self.difficulty
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn session(size: Coord2, mines: &[Coord2]) -> GameSession {
        GameSession::with_board(Difficulty::Easy, Board::from_mine_coords(size, mines).unwrap())
    }

    fn assert_fresh(session: &GameSession, difficulty: Difficulty) {
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.difficulty(), difficulty);
        assert_eq!(session.board().game_config(), difficulty.config());
        assert!(session.reveal_state().is_empty());
        assert!(session.flag_state().is_empty());
        assert_eq!(session.elapsed(), None);
        assert_eq!(session.triggered_mine(), None);
        assert_eq!(session.mines_left(), difficulty.config().mines as isize);
    }

    #[test]
    fn fresh_session_is_ready() {
        assert_fresh(&GameSession::with_seed(Difficulty::Hard, 7), Difficulty::Hard);
    }

    #[test]
    fn first_reveal_starts_timer() {
        let mut session = session((3, 3), &[(0, 0)]);

        session.reveal((1, 1)).unwrap();

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.elapsed(), Some(0));
        assert_eq!(session.poll_timer(Instant::now() + Duration::from_secs(3)), 3);
        assert_eq!(session.elapsed(), Some(3));
    }

    #[test]
    fn first_flag_starts_timer() {
        let mut session = session((3, 3), &[(0, 0)]);

        assert!(session.add_flag((0, 0)).unwrap());

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.elapsed(), Some(0));
        assert_eq!(session.mines_left(), 0);
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        let mut session = session((2, 2), &[(0, 0)]);

        for coords in [(0, 1), (1, 0)] {
            assert!(session.reveal(coords).unwrap().has_update());
            assert_eq!(session.state(), SessionState::Active);
        }
        let result = session.reveal((1, 1)).unwrap();

        assert_eq!(result.newly_revealed().map(|cells| cells.len()), Some(1));
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.completion_time(), Some(0));
        assert!(!session.timer.is_running());
        assert_eq!(session.cell_at((0, 0)), CellView::Mine);
    }

    #[test]
    fn single_cascade_can_win_immediately() {
        let mut session = session((3, 3), &[(0, 0)]);

        session.reveal((2, 2)).unwrap();

        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.reveal_state().len(), 8);
    }

    #[test]
    fn mine_hit_loses_and_freezes_everything() {
        let mut session = session((3, 3), &[(0, 0), (2, 2)]);
        session.reveal((0, 2)).unwrap();
        session.add_flag((2, 2)).unwrap();

        assert_eq!(session.reveal((0, 0)).unwrap(), RevealResult::MineHit);
        assert_eq!(session.state(), SessionState::Lost);
        assert_eq!(session.triggered_mine(), Some((0, 0)));
        assert_eq!(session.cell_at((0, 0)), CellView::Exploded);
        assert_eq!(session.cell_at((2, 2)), CellView::Flagged);
        assert_eq!(session.completion_time(), None);

        let reveal_before = session.reveal_state().clone();
        let flags_before = session.flag_state().clone();
        assert_eq!(session.reveal((1, 0)).unwrap(), RevealResult::NoOp);
        assert!(!session.add_flag((1, 0)).unwrap());
        assert!(!session.remove_flag((2, 2)).unwrap());
        assert!(!session.toggle_flag((2, 2)).unwrap());
        assert_eq!(session.reveal_state(), &reveal_before);
        assert_eq!(session.flag_state(), &flags_before);
        assert_eq!(session.poll_timer(Instant::now() + Duration::from_secs(10)), 0);
        assert_eq!(session.revealed_mines().unwrap().count(), 2);
    }

    #[test]
    fn flag_blocks_reveal_until_removed() {
        let mut session = session((3, 3), &[(0, 0)]);

        assert!(session.toggle_flag((1, 1)).unwrap());
        assert_eq!(session.reveal((1, 1)).unwrap(), RevealResult::NoOp);
        assert_eq!(session.cell_at((1, 1)), CellView::Flagged);

        assert!(session.toggle_flag((1, 1)).unwrap());
        assert!(session.reveal((1, 1)).unwrap().has_update());
        assert_eq!(session.cell_at((1, 1)), CellView::Revealed(1));
        assert!(!session.add_flag((1, 1)).unwrap());
    }

    #[test]
    fn over_flagging_freezes_counter() {
        let mut session = session((3, 3), &[(0, 0)]);
        session.add_flag((0, 0)).unwrap();
        session.add_flag((0, 1)).unwrap();

        assert_eq!(session.mines_left(), -1);
        assert_eq!(session.displayed_mines_left(), 0);
    }

    #[test]
    fn out_of_bounds_coords_are_rejected() {
        let mut session = session((2, 2), &[(0, 0)]);
        assert_eq!(session.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(session.toggle_flag((0, 5)), Err(GameError::InvalidCoords));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    #[should_panic]
    fn cell_view_outside_board_panics() {
        let session = session((2, 2), &[(0, 0)]);
        session.cell_at((2, 0));
    }

    #[test]
    fn reset_after_game_end_matches_fresh_session() {
        let mut won = session((2, 2), &[(0, 0)]);
        for coords in [(0, 1), (1, 0), (1, 1)] {
            won.reveal(coords).unwrap();
        }
        assert_eq!(won.state(), SessionState::Won);
        won.reset();
        assert_fresh(&won, Difficulty::Easy);

        let mut lost = GameSession::with_seed(Difficulty::Hard, 99);
        let mine = lost.board().mines().next().unwrap();
        lost.add_flag(mine).unwrap();
        lost.remove_flag(mine).unwrap();
        lost.reveal(mine).unwrap();
        assert_eq!(lost.state(), SessionState::Lost);
        lost.reset();
        assert_fresh(&lost, Difficulty::Hard);
    }

    #[test]
    fn changing_difficulty_resets_with_new_size() {
        let mut session = GameSession::with_seed(Difficulty::Easy, 3);
        session.add_flag((0, 0)).unwrap();

        session.set_difficulty(Difficulty::Hard);

        assert_fresh(&session, Difficulty::Hard);
        assert_eq!(session.size(), (16, 16));
    }

    #[test]
    fn seeded_sessions_replay_the_same_boards() {
        let mut a = GameSession::with_seed(Difficulty::Easy, 42);
        let mut b = GameSession::with_seed(Difficulty::Easy, 42);
        assert_eq!(a.board(), b.board());
        a.reset();
        b.reset();
        assert_eq!(a.board(), b.board());
    }

    #[test]
    fn revealing_all_safe_cells_wins_generated_boards() {
        for difficulty in Difficulty::ALL {
            for seed in 0..32 {
                let mut session = GameSession::with_seed(difficulty, seed);
                let (rows, cols) = session.size();
                let safe_cells = usize::from(session.board().safe_cell_count());

                for row in 0..rows {
                    for col in 0..cols {
                        if session.board().contains_mine((row, col)) {
                            continue;
                        }
                        session.reveal((row, col)).unwrap();
                        let all_revealed = session.reveal_state().len() == safe_cells;
                        assert_eq!(
                            session.state() == SessionState::Won,
                            all_revealed,
                            "{difficulty} seed {seed} at {:?}",
                            (row, col)
                        );
                    }
                }

                assert_eq!(session.state(), SessionState::Won);
                assert_eq!(session.triggered_mine(), None);
                assert!(session.completion_time().is_some());
            }
        }
    }
}
