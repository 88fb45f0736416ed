use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::*;

/// Cells the player marked as suspected mines. Disjoint from [`RevealState`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    cells: BTreeSet<Coord2>,
}

impl FlagState {
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

    /// Flags `coords` unless it is revealed or already flagged.
    pub fn add(&mut self, reveal_state: &RevealState, coords: Coord2) -> bool {
        if reveal_state.contains(coords) {
            return false;
        }
        self.cells.insert(coords)
    }

    pub fn remove(&mut self, coords: Coord2) -> bool {
        self.cells.remove(&coords)
    }

    /// Mines not yet accounted for by a flag, negative when over-flagged.
    pub fn remaining(&self, total_mines: CellCount) -> isize {
        total_mines as isize - self.cells.len() as isize
    }

    /// The mine counter as a player sees it.
    ///
    /// It only follows the flag count while there are no more flags than mines, so it
    /// stays at zero while over-flagged and resumes once flags are taken back off.
    pub fn displayed_remaining(&self, total_mines: CellCount) -> CellCount {
        self.remaining(total_mines).max(0) as CellCount
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }
}
