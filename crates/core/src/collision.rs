//! Collision oracle - pure placement checks against the locked stack.

use crate::board::Board;
use crate::pieces::Shape;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Whether `shape` anchored at (`x + dx`, `y + dy`) is blocked.
///
/// A placement is blocked if any occupied shape cell lands left of column 0,
/// right of the last column, at or below the bottom row, or on a locked cell.
/// Rows above the top of the board (negative y) are allowed so freshly spawned
/// pieces can stick out of the playfield.
pub fn collides(shape: &Shape, x: i8, y: i8, board: &Board, (dx, dy): (i8, i8)) -> bool {
    shape.filled().any(|(row, col)| {
        let bx = x as i16 + col as i16 + dx as i16;
        let by = y as i16 + row as i16 + dy as i16;

        if bx < 0 || bx >= BOARD_WIDTH as i16 || by >= BOARD_HEIGHT as i16 {
            return true;
        }
        // Above the board: nothing to hit.
        by >= 0 && board.is_locked(bx as i8, by as i8)
    })
}
