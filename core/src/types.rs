use core::ops::Range;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Whole seconds, used for elapsed and record times.
pub type Secs = u32;

/// Row and column ranges of the 3x3 window centred on `coords`, clipped to `dim`.
///
/// The window includes the centre itself; callers that want only the Moore
/// neighbourhood skip it.
pub(crate) fn window_around(
    (row, col): Coord2,
    (rows, cols): (usize, usize),
) -> (Range<usize>, Range<usize>) {
    let (row, col) = (usize::from(row), usize::from(col));
    (
        row.saturating_sub(1)..(row + 2).min(rows),
        col.saturating_sub(1)..(col + 2).min(cols),
    )
}
