use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Uncovered cells of the current game. Only grows until the next reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    cells: BTreeSet<Coord2>,
}

impl RevealState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.cells.contains(&coords)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells.iter().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }

    fn insert(&mut self, coords: Coord2) {
        let inserted = self.cells.insert(coords);
        debug_assert!(inserted, "{coords:?} revealed twice");
    }
}

/// What a single reveal action changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealResult {
    /// Flagged, already revealed, or the game is over.
    NoOp,
    /// Safe cells uncovered by this action, including any flood-fill.
    Cleared(BTreeSet<Coord2>),
    MineHit,
}

impl RevealResult {
    /// Whether this result could have caused an update to the game
    pub fn has_update(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    pub fn newly_revealed(&self) -> Option<&BTreeSet<Coord2>> {
        match self {
            Self::Cleared(cells) => Some(cells),
            _ => None,
        }
    }
}

/// Uncovers `coords`, flood-filling through zero clues.
///
/// Flags block the reveal: a flagged target is a no-op and flagged cells stop the
/// flood-fill without being removed. Win detection is left to the caller since it
/// is checked once per action, see [`all_safe_revealed`].
pub fn reveal(
    board: &Board,
    reveal_state: &mut RevealState,
    flag_state: &FlagState,
    coords: Coord2,
) -> RevealResult {
    debug_assert!(board.contains(coords), "{coords:?} is outside the board");

    if flag_state.contains(coords) || reveal_state.contains(coords) {
        return RevealResult::NoOp;
    }

    let clue = match board[coords] {
        CellValue::Mine => {
            reveal_state.insert(coords);
            log::debug!("Hit mine at {:?}", coords);
            return RevealResult::MineHit;
        }
        CellValue::Clue(clue) => clue,
    };

    reveal_state.insert(coords);
    let mut newly_revealed = BTreeSet::from([coords]);
    log::debug!("Reveal cell at {:?}, clue: {}", coords, clue);

    if clue == 0 {
        let mut visited = BTreeSet::from([coords]);
        let mut to_visit: VecDeque<_> = board
            .neighbors(coords)
            .filter(|&pos| is_closed(reveal_state, flag_state, pos))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            coords,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            if !is_closed(reveal_state, flag_state, visit_coords) {
                log::trace!("Skipping cell at {:?}", visit_coords);
                continue;
            }

            // zero clues never border a mine
            let Some(visit_clue) = board[visit_coords].clue() else {
                debug_assert!(false, "flood-fill reached mine at {visit_coords:?}");
                continue;
            };
            reveal_state.insert(visit_coords);
            newly_revealed.insert(visit_coords);
            log::trace!(
                "Flood revealed cell at {:?}, clue: {}",
                visit_coords,
                visit_clue
            );

            if visit_clue == 0 {
                to_visit.extend(
                    board
                        .neighbors(visit_coords)
                        .filter(|&pos| is_closed(reveal_state, flag_state, pos))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    RevealResult::Cleared(newly_revealed)
}

fn is_closed(reveal_state: &RevealState, flag_state: &FlagState, coords: Coord2) -> bool {
    !reveal_state.contains(coords) && !flag_state.contains(coords)
}

/// True once every safe cell is uncovered and no mine was.
pub fn all_safe_revealed(board: &Board, reveal_state: &RevealState) -> bool {
    reveal_state.len() == usize::from(board.safe_cell_count())
        && !reveal_state.iter().any(|pos| board.contains_mine(pos))
}
