use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use difficulty::*;
pub use error::*;
pub use flags::*;
pub use generator::*;
pub use ledger::*;
pub use reveal::*;
pub use session::*;
pub use timer::*;
pub use types::*;

mod difficulty;
mod error;
mod flags;
mod generator;
mod ledger;
mod reveal;
mod session;
mod timer;
mod types;

/// Board dimensions and mine count, validated so that at least one safe cell exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((rows, cols): Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked((rows, cols), mines);
        if rows == 0 || cols == 0 || mines >= config.total_cells() {
            return Err(GameError::InvalidConfiguration { rows, cols, mines });
        }
        Ok(config)
    }

    pub const fn total_cells(&self) -> CellCount {
        // u8 * u8 always fits
        self.size.0 as CellCount * self.size.1 as CellCount
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// Content of a single cell, fixed once the board is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    Clue(u8),
}

impl CellValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Adjacent mine count, `None` for mines.
    pub const fn clue(self) -> Option<u8> {
        match self {
            Self::Mine => None,
            Self::Clue(count) => Some(count),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Clue(0)
    }
}

/// Mine layout together with the precomputed adjacency clue of every safe cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<CellValue>,
    mine_count: CellCount,
}

impl Board {
    /// Wraps a grid whose mines are placed and whose clues are already filled in.
    pub(crate) fn from_clued_grid(cells: Array2<CellValue>, mine_count: CellCount) -> Self {
        Self { cells, mine_count }
    }

    /// Builds a fixed layout, duplicate coordinates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let (rows, cols) = size;
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfiguration {
                rows,
                cols,
                mines: mine_coords.len() as CellCount,
            });
        }

        let mut cells: Array2<CellValue> = Array2::default((usize::from(rows), usize::from(cols)));
        let mut mines = Vec::with_capacity(mine_coords.len());
        for &coords in mine_coords {
            let (row, col) = coords;
            if row >= rows || col >= cols {
                return Err(GameError::InvalidCoords);
            }
            let cell = &mut cells[(usize::from(row), usize::from(col))];
            if !cell.is_mine() {
                *cell = CellValue::Mine;
                mines.push(coords);
            }
        }

        let config = GameConfig::new(size, mines.len() as CellCount)?;
        generator::fill_clues(&mut cells, &mines);
        Ok(Self::from_clued_grid(cells, config.mines))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.validate_coords(coords).is_ok()
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine()
    }

    /// All mine positions in row-major order.
    pub fn mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells
            .indexed_iter()
            .filter(|(_, cell)| cell.is_mine())
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    /// Moore neighbourhood of `coords` clipped to the board, in row-major order.
    pub fn neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = window_around(coords, self.cells.dim());
        let (top, left) = (rows.start, cols.start);
        ndarray::indices((rows.len(), cols.len()))
            .into_iter()
            .map(move |(row, col)| ((top + row) as Coord, (left + col) as Coord))
            .filter(move |&pos| pos != coords)
    }
}

impl Index<Coord2> for Board {
    type Output = CellValue;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.cells[(row as usize, col as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_full_boards() {
        assert!(GameConfig::new((3, 3), 8).is_ok());
        assert_eq!(
            GameConfig::new((3, 3), 9),
            Err(GameError::InvalidConfiguration {
                rows: 3,
                cols: 3,
                mines: 9
            })
        );
        assert!(GameConfig::new((0, 3), 0).is_err());
    }

    #[test]
    fn fixed_layout_computes_clues() {
        let board = Board::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(board.mine_count(), 2);
        assert_eq!(board.safe_cell_count(), 7);
        assert_eq!(board[(0, 0)], CellValue::Mine);
        assert_eq!(board[(1, 1)], CellValue::Clue(2));
        assert_eq!(board[(0, 2)], CellValue::Clue(0));
        assert_eq!(board[(0, 1)], CellValue::Clue(1));
        assert_eq!(board.mines().collect::<Vec<_>>(), vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn fixed_layout_rejects_bad_input() {
        assert_eq!(
            Board::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
        assert!(matches!(
            Board::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn neighbors_are_clipped_to_the_board() {
        let board = Board::from_mine_coords((9, 9), &[]).unwrap();

        assert_eq!(
            board.neighbors((0, 0)).collect::<Vec<_>>(),
            vec![(0, 1), (1, 0), (1, 1)]
        );
        assert_eq!(board.neighbors((0, 4)).count(), 5);
        assert_eq!(board.neighbors((8, 4)).count(), 5);
        assert_eq!(board.neighbors((4, 8)).count(), 5);
        assert_eq!(
            board.neighbors((4, 4)).collect::<Vec<_>>(),
            vec![(3, 3), (3, 4), (3, 5), (4, 3), (4, 5), (5, 3), (5, 4), (5, 5)]
        );
    }

    #[test]
    fn single_cell_board_has_no_neighbors() {
        let board = Board::from_mine_coords((1, 1), &[]).unwrap();
        assert_eq!(board.neighbors((0, 0)).count(), 0);
    }

    #[test]
    fn duplicate_mines_count_once() {
        let board = Board::from_mine_coords((2, 2), &[(1, 1), (1, 1)]).unwrap();
        assert_eq!(board.mine_count(), 1);
    }
}
