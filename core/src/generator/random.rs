use super::*;

/// Uniform generation strategy: mines are sampled one coordinate at a time, rejecting
/// coordinates that already hold a mine. There is no safe starting cell.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board> {
        use rand::prelude::*;
        use rand::rngs::SmallRng;

        // an unchecked config would never finish sampling
        let config = GameConfig::new(config.size, config.mines)?;
        let (rows, cols) = config.size;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut cells: Array2<CellValue> = Array2::default((usize::from(rows), usize::from(cols)));
        let mut mines = Vec::with_capacity(config.mines.into());
        let mut rejected = 0usize;

        while mines.len() < usize::from(config.mines) {
            let (row, col) = (rng.random_range(0..rows), rng.random_range(0..cols));
            let cell = &mut cells[(usize::from(row), usize::from(col))];
            if cell.is_mine() {
                rejected += 1;
                continue;
            }
            *cell = CellValue::Mine;
            mines.push((row, col));
        }
        log::trace!(
            "Placed {} mines on {}x{}, {} samples rejected",
            mines.len(),
            rows,
            cols,
            rejected
        );

        fill_clues(&mut cells, &mines);
        let board = Board::from_clued_grid(cells, config.mines);
        debug_assert_eq!(board.mines().count(), usize::from(config.mines));
        Ok(board)
    }
}
