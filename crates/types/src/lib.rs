//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine logic, terminal rendering, input mapping).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top)
//! - **Spawn anchor**: column `BOARD_WIDTH / 2 - 2`, row 0
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `BASE_DROP_MS` | 1000 | Gravity interval at level 0 |
//! | `SOFT_DROP_BOOST` | 0.2 | Added to `level + 1` for the post-soft-drop period |
//! | `CLEAR_DELAY_MS` | 300 | Row-clear animation before rows are removed |
//! | `LOCK_FLASH_MS` | 200 | Feedback window after a lock commit |
//! | `LINES_PER_LEVEL` | 10 | Cleared rows needed per level |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{GameAction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Column of the spawn anchor (top-left of the shape matrix)
pub const SPAWN_X: i8 = (BOARD_WIDTH / 2) as i8 - 2;

/// Row of the spawn anchor
pub const SPAWN_Y: i8 = 0;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Base gravity interval at level 0 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Added to `level + 1` when computing the interval right after a manual soft drop.
pub const SOFT_DROP_BOOST: f64 = 0.2;

/// Delay between detecting full rows and removing them.
pub const CLEAR_DELAY_MS: u32 = 300;

/// How long the "just locked" feedback flag stays raised.
pub const LOCK_FLASH_MS: u32 = 200;

/// Cleared rows per level.
pub const LINES_PER_LEVEL: u32 = 10;

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and color:
/// - **I**: Cyan, straight bar
/// - **J**: Blue
/// - **L**: Orange (mirror of J)
/// - **O**: Yellow, 2x2 square
/// - **S**: Green
/// - **T**: Purple
/// - **Z**: Red (mirror of S)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in catalog order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }

    /// Display color of this kind.
    pub fn color(&self) -> Color {
        match self {
            PieceKind::I => Color::rgb(0x06, 0xb6, 0xd4),
            PieceKind::J => Color::rgb(0x3b, 0x82, 0xf6),
            PieceKind::L => Color::rgb(0xf9, 0x73, 0x16),
            PieceKind::O => Color::rgb(0xea, 0xb3, 0x08),
            PieceKind::S => Color::rgb(0x22, 0xc5, 0x5e),
            PieceKind::T => Color::rgb(0xa8, 0x55, 0xf7),
            PieceKind::Z => Color::rgb(0xef, 0x44, 0x44),
        }
    }
}

/// 24-bit display color carried by board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A single board slot.
///
/// `kind == None` is the empty sentinel. `locked` marks cells that a piece
/// has been permanently committed to; those only change when their row is
/// cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub kind: Option<PieceKind>,
    pub color: Color,
    pub locked: bool,
}

impl Cell {
    /// The empty cell.
    pub const EMPTY: Cell = Cell {
        kind: None,
        color: Color::rgb(0, 0, 0),
        locked: false,
    };

    /// An unlocked cell covered by the falling piece.
    pub fn active(kind: PieceKind) -> Self {
        Self {
            kind: Some(kind),
            color: kind.color(),
            locked: false,
        }
    }

    /// A permanently committed cell.
    pub fn locked(kind: PieceKind) -> Self {
        Self {
            kind: Some(kind),
            color: kind.color(),
            locked: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }
}

/// Direction of a 90° rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl RotateDirection {
    pub fn opposite(&self) -> Self {
        match self {
            RotateDirection::Clockwise => RotateDirection::CounterClockwise,
            RotateDirection::CounterClockwise => RotateDirection::Clockwise,
        }
    }
}

/// Discrete intents accepted by the engine.
///
/// Device handling (keys, touch) lives outside the engine and is translated
/// into these before reaching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell down, locking it if it cannot move
    SoftDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Hold current piece (once per spawned piece)
    Hold,
    /// Toggle pause state
    Pause,
    /// Restart the game
    Restart,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotateCw"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::from_str("reset"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "rotate" | "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" | "resume" => Some(GameAction::Pause),
            "restart" | "reset" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}
