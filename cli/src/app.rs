use sapper_core::{
    GameError, GameSession, HighScores, LedgerStore, RecordOutcome, RevealResult, Secs,
    SessionState, today,
};
use std::fmt::Write;

use crate::command::Command;
use crate::view;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes player commands to the session and turns the results into text.
pub struct App<S> {
    session: GameSession,
    scores: HighScores<S>,
}

impl<S: LedgerStore> App<S> {
    pub fn new(session: GameSession, scores: HighScores<S>) -> Self {
        Self { session, scores }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scores(&self) -> &HighScores<S> {
        &self.scores
    }

    pub fn render(&mut self) -> String {
        self.session.tick();
        view::render_game(&self.session)
    }

    /// Applies one command, appending anything the player should read to `out`.
    ///
    /// `ask_name` is only called after a win whose time makes the high-score list.
    pub fn handle(
        &mut self,
        command: Command,
        out: &mut String,
        ask_name: impl FnOnce(Secs) -> Option<String>,
    ) -> Flow {
        // catch up on ticks missed while waiting for input
        self.session.tick();

        match command {
            Command::Reveal(coords) => match self.session.reveal(coords) {
                Ok(RevealResult::NoOp) => {
                    log::debug!("Nothing to reveal at {:?}", coords);
                }
                Ok(RevealResult::MineHit) => {
                    let _ = writeln!(out, "Boom! You hit a mine.");
                }
                Ok(RevealResult::Cleared(cells)) => {
                    log::debug!("Revealed {} cells", cells.len());
                    if self.session.state() == SessionState::Won {
                        self.finish_win(out, ask_name);
                    }
                }
                Err(err) => write_coords_error(out, err),
            },
            Command::Flag(coords) => match self.session.toggle_flag(coords) {
                Ok(changed) => {
                    if !changed {
                        log::debug!("Flag at {:?} unchanged", coords);
                    }
                }
                Err(err) => write_coords_error(out, err),
            },
            Command::NewGame => self.session.reset(),
            Command::SetDifficulty(difficulty) => self.session.set_difficulty(difficulty),
            Command::Scores => {
                out.push_str(&view::render_scores(self.scores.ledger()));
                return Flow::Continue;
            }
            Command::Help => {
                out.push_str(view::HELP);
                return Flow::Continue;
            }
            Command::Quit => return Flow::Quit,
        }

        out.push_str(&view::render_game(&self.session));
        Flow::Continue
    }

    fn finish_win(&mut self, out: &mut String, ask_name: impl FnOnce(Secs) -> Option<String>) {
        let Some(time) = self.session.completion_time() else {
            return;
        };
        let _ = writeln!(out, "You win! Cleared in {}s.", time);

        let difficulty = self.session.difficulty();
        match self
            .scores
            .record_if_qualifying(difficulty, time, today(), || ask_name(time))
        {
            Ok(RecordOutcome::Recorded { rank }) => {
                let _ = writeln!(out, "New high score, place {}!", rank + 1);
                out.push_str(&view::render_scores(self.scores.ledger()));
            }
            Ok(RecordOutcome::Declined | RecordOutcome::NotQualifying) => {}
            Err(err) => {
                log::error!("Could not save high scores: {:?}", err);
                let _ = writeln!(out, "Could not save high scores: {}", err);
            }
        }
    }
}

fn write_coords_error(out: &mut String, err: GameError) {
    let _ = writeln!(out, "{}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sapper_core::{Board, Difficulty, MemoryStore};

    fn app(size: (u8, u8), mines: &[(u8, u8)]) -> App<MemoryStore> {
        let board = Board::from_mine_coords(size, mines).unwrap();
        App::new(
            GameSession::with_board(Difficulty::Easy, board),
            HighScores::load_or_default(MemoryStore::new()),
        )
    }

    #[test]
    fn win_records_high_score() {
        let mut app = app((2, 2), &[(0, 0)]);
        let mut out = String::new();

        for coords in [(0, 1), (1, 0)] {
            app.handle(Command::Reveal(coords), &mut out, |_| {
                panic!("not won yet")
            });
        }
        let mut asked = None;
        app.handle(Command::Reveal((1, 1)), &mut out, |time| {
            asked = Some(time);
            Some("Ada".into())
        });

        assert_eq!(asked, Some(0));
        assert!(out.contains("You win!"));
        assert!(out.contains("New high score, place 1!"));
        assert_eq!(app.scores().ledger().entries(Difficulty::Easy)[0].name, "Ada");
        assert!(app.scores().store().contents().is_some());
    }

    #[test]
    fn loss_reports_mine() {
        let mut app = app((2, 2), &[(0, 0)]);
        let mut out = String::new();

        app.handle(Command::Reveal((0, 0)), &mut out, |_| None);

        assert!(out.starts_with("Boom!"));
        assert_eq!(app.session().state(), SessionState::Lost);
        assert!(app.scores().store().contents().is_none());
    }

    #[test]
    fn bad_coords_are_reported_not_fatal() {
        let mut app = app((2, 2), &[(0, 0)]);
        let mut out = String::new();

        let flow = app.handle(Command::Flag((5, 5)), &mut out, |_| None);

        assert_eq!(flow, Flow::Continue);
        assert!(out.starts_with("Invalid coordinates"));
    }

    #[test]
    fn quit_and_difficulty() {
        let mut app = app((2, 2), &[(0, 0)]);
        let mut out = String::new();

        app.handle(Command::SetDifficulty(Difficulty::Hard), &mut out, |_| None);
        assert_eq!(app.session().size(), (16, 16));
        assert_eq!(app.handle(Command::Quit, &mut out, |_| None), Flow::Quit);
    }
}
