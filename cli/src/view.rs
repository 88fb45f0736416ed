use sapper_core::{CellView, Difficulty, GameSession, HighScoreLedger, LEDGER_CAPACITY, SessionState};
use std::fmt::Write;

/// Three-digit counter display, wrapping past 999 like a mechanical counter.
pub fn counter_digits(value: u32) -> String {
    format!("{:03}", value % 1000)
}

fn face(state: SessionState) -> &'static str {
    match state {
        SessionState::Ready | SessionState::Active => ":)",
        SessionState::Won => "B)",
        SessionState::Lost => "X(",
    }
}

fn cell_glyph(cell: CellView) -> char {
    match cell {
        CellView::Hidden => '#',
        CellView::Flagged => 'F',
        CellView::Revealed(0) => '.',
        CellView::Revealed(count) => char::from(b'0' + count),
        CellView::Exploded => '@',
        CellView::Mine => '*',
    }
}

/// Counters, face and grid, with 1-based row and column labels.
pub fn render_game(session: &GameSession) -> String {
    let (rows, cols) = session.size();
    let mines_left = counter_digits(session.displayed_mines_left().into());
    let elapsed = counter_digits(session.elapsed().unwrap_or(0));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}]  {}  [{}]   {}",
        mines_left,
        face(session.state()),
        elapsed,
        session.difficulty()
    );
    out.push_str("    ");
    for col in 1..=cols {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');
    for row in 0..rows {
        let _ = write!(out, "{:>3} ", row + 1);
        for col in 0..cols {
            let _ = write!(out, "{:>3}", cell_glyph(session.cell_at((row, col))));
        }
        out.push('\n');
    }
    out
}

/// Best times per difficulty, padded with empty places.
pub fn render_scores(ledger: &HighScoreLedger) -> String {
    let mut out = String::new();
    for difficulty in Difficulty::ALL {
        let _ = writeln!(out, "{} MODE", difficulty.name().to_uppercase());
        let entries = ledger.entries(difficulty);
        for place in 0..LEDGER_CAPACITY {
            match entries.get(place) {
                Some(entry) => {
                    let _ = writeln!(
                        out,
                        "{}.  {} | {}s | {}",
                        place + 1,
                        entry.name,
                        entry.time,
                        entry.date
                    );
                }
                None => {
                    let _ = writeln!(out, "{}.", place + 1);
                }
            }
        }
        out.push('\n');
    }
    out
}

pub const HELP: &str = "\
Uncover every cell that does not hide a mine. A number tells how many of the
eight surrounding cells hold mines. Flag cells you suspect; a flagged cell can
not be uncovered until the flag is removed. Uncovering a blank cell opens its
whole blank neighbourhood. The timer starts with your first move.

Commands (rows and columns start at 1):
  r <row> <col>      reveal a cell
  f <row> <col>      place or remove a flag
  n                  new game
  d easy|hard        change difficulty (starts a new game)
  s                  show high scores
  h                  show this help
  q                  quit
";
