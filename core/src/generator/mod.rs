use ndarray::{Array2, s};

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board>;
}

/// Adds one to every safe cell in the window of every mine, leaving mines untouched.
pub(crate) fn fill_clues(cells: &mut Array2<CellValue>, mines: &[Coord2]) {
    for &mine in mines {
        let (rows, cols) = window_around(mine, cells.dim());
        for cell in cells.slice_mut(s![rows, cols]) {
            if let CellValue::Clue(count) = cell {
                *count += 1;
            }
        }
    }
}

/// Convenience for the common case of a seeded uniform board.
pub fn generate(config: GameConfig, seed: u64) -> Result<Board> {
    RandomBoardGenerator::new(seed).generate(config)
}
