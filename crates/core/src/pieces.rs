//! Pieces module - tetromino catalog and matrix rotation
//!
//! Every kind has a single occupancy matrix. Orientations are not stored:
//! the falling piece owns a working copy of its matrix and rotates it in place
//! by transposing and reversing.

use crate::types::{PieceKind, RotateDirection};

/// Largest matrix side used by the catalog (the I piece).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Boolean occupancy matrix, row 0 = top.
///
/// Storage is a fixed 4x4 array so that rotating and probing placements never
/// allocates; only the `rows x cols` corner is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from row strings where `#` marks an occupied cell.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is empty, ragged, or larger than 4x4. Only used
    /// with the static catalog and in tests.
    pub fn from_pattern(pattern: &[&str]) -> Self {
        let rows = pattern.len();
        let cols = pattern.first().map_or(0, |r| r.len());
        assert!(rows > 0 && rows <= MAX_SHAPE_SIZE, "bad shape height");
        assert!(cols > 0 && cols <= MAX_SHAPE_SIZE, "bad shape width");

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in pattern.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged shape pattern");
            for (x, ch) in row.bytes().enumerate() {
                cells[y][x] = ch == b'#';
            }
        }

        Self {
            rows: rows as u8,
            cols: cols as u8,
            cells,
        }
    }

    /// Number of matrix rows.
    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    /// Number of matrix columns (the kick search bound).
    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Iterate occupied cells as `(row, col)` matrix coordinates.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows()).flat_map(move |row| {
            (0..self.cols()).filter_map(move |col| self.cells[row][col].then_some((row, col)))
        })
    }

    /// Number of occupied cells.
    pub fn count(&self) -> usize {
        self.filled().count()
    }

    /// Return this matrix rotated 90° in the given direction.
    ///
    /// Clockwise: transpose, then reverse each row.
    /// Counter-clockwise: transpose, then reverse the row order.
    pub fn rotated(&self, direction: RotateDirection) -> Self {
        let (rows, cols) = (self.rows(), self.cols());
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];

        // Transposed matrix is cols x rows: t[r][c] = self[c][r].
        for r in 0..cols {
            for c in 0..rows {
                let value = self.cells[c][r];
                match direction {
                    RotateDirection::Clockwise => cells[r][rows - 1 - c] = value,
                    RotateDirection::CounterClockwise => cells[cols - 1 - r][c] = value,
                }
            }
        }

        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

/// Catalog matrix for a piece kind.
pub fn get_shape(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => Shape::from_pattern(&[".#..", ".#..", ".#..", ".#.."]),
        PieceKind::J => Shape::from_pattern(&[".#.", ".#.", "##."]),
        PieceKind::L => Shape::from_pattern(&[".#.", ".#.", ".##"]),
        PieceKind::O => Shape::from_pattern(&["##", "##"]),
        PieceKind::S => Shape::from_pattern(&[".##", "##.", "..."]),
        PieceKind::T => Shape::from_pattern(&["###", ".#.", "..."]),
        PieceKind::Z => Shape::from_pattern(&["##.", ".##", "..."]),
    }
}

/// Horizontal kick offsets tried after a rotation collides in place.
///
/// Yields +1, -1, +2, -2, ... up to `bound` in magnitude. This is a loose
/// approximation of wall kicks, not any standard kick table.
pub fn kick_offsets(bound: usize) -> impl Iterator<Item = i8> {
    (1..=bound as i8).flat_map(|m| [m, -m])
}
