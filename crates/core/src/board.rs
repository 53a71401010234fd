//! Board module - manages the game grid
//!
//! The board is a 10x20 grid of [`Cell`]s stored in a flat array for cache
//! locality and zero allocation. Coordinates: (x, y) where x ranges 0..9
//! (left to right) and y ranges 0..19 (top to bottom).
//!
//! Locked cells are the permanent stack. Unlocked, non-empty cells are the
//! falling piece overlaid on top of it; they are wiped and redrawn on every
//! rebuild so the piece never leaves stray cells behind.

use arrayvec::ArrayVec;

use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices, top to bottom. Never allocates.
pub type RowList = ArrayVec<usize, { BOARD_HEIGHT as usize }>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::EMPTY; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether (x, y) holds a locked cell. Out of bounds is never locked.
    pub fn is_locked(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(cell) if cell.locked)
    }

    /// Check if a row is completely filled (every cell non-empty)
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        self.row(y).iter().all(|cell| !cell.is_empty())
    }

    /// Cells of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * BOARD_WIDTH as usize;
        &self.cells[start..start + BOARD_WIDTH as usize]
    }

    /// Indices of all full rows, top to bottom.
    pub fn full_rows(&self) -> RowList {
        (0..BOARD_HEIGHT as usize)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Wipe every unlocked cell back to empty.
    pub fn clear_unlocked(&mut self) {
        for cell in &mut self.cells {
            if !cell.locked {
                *cell = Cell::EMPTY;
            }
        }
    }

    /// Draw a shape anchored at (x, y) as unlocked cells of `kind`.
    ///
    /// Shape cells outside the grid (e.g. above row 0 right after spawning)
    /// are skipped. Locked cells are never overwritten.
    pub fn overlay(&mut self, shape: &Shape, x: i8, y: i8, kind: PieceKind) {
        for (row, col) in shape.filled() {
            let bx = x + col as i8;
            let by = y + row as i8;
            if let Some(idx) = Self::index(bx, by) {
                if !self.cells[idx].locked {
                    self.cells[idx] = Cell::active(kind);
                }
            }
        }
    }

    /// Rebuild the transient layer: keep the locked stack, then overlay the
    /// falling piece (if any).
    pub fn rebuild(&mut self, active: Option<(&Shape, i8, i8, PieceKind)>) {
        self.clear_unlocked();
        if let Some((shape, x, y, kind)) = active {
            self.overlay(shape, x, y, kind);
        }
    }

    /// Promote every unlocked cell of `kind` to locked.
    ///
    /// After a rebuild the only unlocked cells are the falling piece, so this
    /// commits exactly that piece. Returns the number of promoted cells.
    pub fn commit(&mut self, kind: PieceKind) -> usize {
        let mut promoted = 0;
        for cell in &mut self.cells {
            if cell.kind == Some(kind) && !cell.locked {
                cell.locked = true;
                promoted += 1;
            }
        }
        promoted
    }

    /// Remove exactly the given rows, shift the remaining rows down in order,
    /// and fill the top with empty rows.
    ///
    /// Uses a two-pointer pass with `copy_within`; no allocation. Indices that
    /// are out of bounds or repeated are ignored. Returns how many rows were
    /// removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;
        let mut removed = 0;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if rows.contains(&read_y) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * width;
                let dst_start = write_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, dst_start);
            }
        }

        // Fresh rows at the top
        for cell in &mut self.cells[..write_y * width] {
            *cell = Cell::EMPTY;
        }

        removed
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of locked cells on the board.
    pub fn locked_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.locked).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [Cell::EMPTY; BOARD_SIZE];
    }

    /// Build a board from text rows (top to bottom).
    ///
    /// Each row is `BOARD_WIDTH` characters; a piece letter (`IJLOSTZ`, any
    /// case) is a locked cell of that kind and anything else is empty. Fewer
    /// rows than `BOARD_HEIGHT` are aligned to the bottom. Useful for puzzle
    /// setups and tests. Returns `None` on a malformed layout.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        if rows.len() > BOARD_HEIGHT as usize {
            return None;
        }
        let mut board = Self::new();
        let top = BOARD_HEIGHT as usize - rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.chars().count() != BOARD_WIDTH as usize {
                return None;
            }
            for (x, ch) in row.chars().enumerate() {
                let mut buf = [0u8; 4];
                if let Some(kind) = PieceKind::from_str(ch.encode_utf8(&mut buf)) {
                    board.set(x as i8, (top + i) as i8, Cell::locked(kind));
                }
            }
        }
        Some(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::get_shape;

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_rebuild_moves_overlay_without_trail() {
        let mut board = Board::new();
        let o = get_shape(PieceKind::O);

        board.rebuild(Some((&o, 3, 0, PieceKind::O)));
        assert_eq!(board.get(3, 0), Some(Cell::active(PieceKind::O)));

        board.rebuild(Some((&o, 3, 1, PieceKind::O)));
        assert_eq!(board.get(3, 0), Some(Cell::EMPTY));
        assert_eq!(board.get(3, 1), Some(Cell::active(PieceKind::O)));
        assert_eq!(board.get(4, 2), Some(Cell::active(PieceKind::O)));
        assert_eq!(board.locked_count(), 0);
    }

    #[test]
    fn test_overlay_skips_cells_above_the_board() {
        let mut board = Board::new();
        let i = get_shape(PieceKind::I);

        board.overlay(&i, 0, -2, PieceKind::I);

        // Only the two lower cells of the vertical bar are on the board.
        assert_eq!(board.get(1, 0), Some(Cell::active(PieceKind::I)));
        assert_eq!(board.get(1, 1), Some(Cell::active(PieceKind::I)));
        assert_eq!(board.get(1, 2), Some(Cell::EMPTY));
    }

    #[test]
    fn test_commit_promotes_only_unlocked_cells_of_kind() {
        let mut board = Board::new();
        board.set(0, 19, Cell::locked(PieceKind::T));
        let t = get_shape(PieceKind::T);
        board.rebuild(Some((&t, 3, 17, PieceKind::T)));

        assert_eq!(board.commit(PieceKind::T), 4);
        assert_eq!(board.locked_count(), 5);
        // Nothing left to promote.
        assert_eq!(board.commit(PieceKind::T), 0);
    }

    #[test]
    fn test_remove_rows_keeps_order() {
        let mut board = Board::from_rows(&[
            "T.........",
            "IIIIIIIIII",
            ".S........",
            "OOOOOOOOOO",
        ])
        .unwrap();

        let full = board.full_rows();
        assert_eq!(full.as_slice(), &[17, 19]);

        assert_eq!(board.remove_rows(&full), 2);
        assert_eq!(board.get(1, 19).unwrap().kind, Some(PieceKind::S));
        assert_eq!(board.get(0, 18).unwrap().kind, Some(PieceKind::T));
        assert!(board.row(17).iter().all(Cell::is_empty));
        assert_eq!(board.locked_count(), 2);
    }

    #[test]
    fn test_from_rows_rejects_bad_width() {
        assert!(Board::from_rows(&["IIII"]).is_none());
    }
}
