use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid configuration: {mines} mines do not fit a {rows}x{cols} board")]
    InvalidConfiguration {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    },
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to persist or read back the high-score ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ledger contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LedgerResult<T> = core::result::Result<T, LedgerError>;
