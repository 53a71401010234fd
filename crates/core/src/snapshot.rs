//! Read-only views of the game state for renderers and other observers.

use crate::board::RowList;
use crate::game_state::ActivePiece;
use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

pub type BoardCells = [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

/// Everything a renderer needs for one frame.
///
/// The board already contains the falling piece as unlocked cells; `active`
/// is provided for observers that want the piece separately.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: BoardCells,
    pub active: Option<ActiveSnapshot>,
    pub next: PieceKind,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    /// Rows waiting for the clear delay, top to bottom
    pub clearing_rows: RowList,
    pub just_locked: bool,
    pub paused: bool,
    pub game_over: bool,
    pub lines_cleared: u32,
    pub level: u32,
    pub episode_id: u32,
    pub piece_id: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[Cell::EMPTY; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.next = PieceKind::I;
        self.hold = None;
        self.can_hold = true;
        self.clearing_rows.clear();
        self.just_locked = false;
        self.paused = false;
        self.game_over = false;
        self.lines_cleared = 0;
        self.level = 0;
        self.episode_id = 0;
        self.piece_id = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Whether row `y` is flagged for removal.
    pub fn is_clearing(&self, y: usize) -> bool {
        self.clearing_rows.contains(&y)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[Cell::EMPTY; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            next: PieceKind::I,
            hold: None,
            can_hold: true,
            clearing_rows: RowList::new(),
            just_locked: false,
            paused: false,
            game_over: false,
            lines_cleared: 0,
            level: 0,
            episode_id: 0,
            piece_id: 0,
        };
        s.clear();
        s
    }
}

/// Turns the cumulative cleared-rows counter into per-clear deltas.
///
/// Scorers feed it every snapshot (or every counter change) and get back the
/// number of rows cleared since the last observation. A new episode resets the
/// baseline, so the counter dropping back to zero is never reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearWatcher {
    episode_id: u32,
    lines_cleared: u32,
}

impl ClearWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows cleared since the previous call, or `None` if there are none.
    pub fn observe(&mut self, episode_id: u32, lines_cleared: u32) -> Option<u32> {
        if episode_id != self.episode_id {
            self.episode_id = episode_id;
            self.lines_cleared = 0;
        }
        let delta = lines_cleared.saturating_sub(self.lines_cleared);
        self.lines_cleared = lines_cleared;
        (delta > 0).then_some(delta)
    }

    pub fn observe_snapshot(&mut self, snapshot: &GameSnapshot) -> Option<u32> {
        self.observe(snapshot.episode_id, snapshot.lines_cleared)
    }
}
