//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation
//! logic. It has no dependencies on terminals or other I/O, so the same seed
//! always produces the same game.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of cells, the locked stack plus the falling piece overlay
//! - [`collision`]: placement checks against walls, floor and the locked stack
//! - [`game_state`]: the game session: movement, rotation, gravity, line clears, hold
//! - [`gravity`]: level-dependent gravity timer and the clear-delay countdown
//! - [`pieces`]: the seven shape matrices, rotation and kick offsets
//! - [`rng`]: seeded piece generation (uniform or 7-bag)
//! - [`snapshot`]: read-only views for renderers and scorers
//!
//! # Game Rules
//!
//! - Pieces spawn with the top-left of their matrix at column 3, row 0.
//! - Rotation turns the matrix by a quarter; if it collides the piece is
//!   kicked sideways by 1, -1, 2, -2, ... columns, up to the matrix width.
//! - A piece that cannot descend is locked into the stack.
//! - Full rows are flagged and removed after a short delay, during which all
//!   input is ignored.
//! - One hold per spawned piece.
//! - Locking without leaving the spawn row, or spawning into the stack, ends
//!   the game.
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::GameAction;
//!
//! let mut game = GameState::with_seed(12345);
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::SoftDrop);
//!
//! assert!(!game.game_over());
//! assert_eq!(game.lines_cleared(), 0);
//! ```
//!
//! # Timing
//!
//! The game uses a fixed timestep system:
//! - **Tick Rate**: 16ms (approximately 60 FPS)
//! - **Gravity**: `1000 / (level + 1)` ms per row
//! - **Soft Drop**: restarts the gravity phase with a slightly shorter period
//! - **Line Clear**: 300ms between flagging rows and removing them
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with elapsed time.

pub mod board;
pub mod collision;
pub mod game_state;
pub mod gravity;
pub mod pieces;
pub mod rng;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, RowList};
pub use collision::collides;
pub use game_state::{ActivePiece, GameConfig, GameOverReason, GameState, LockEvent};
pub use gravity::{drop_interval_ms, level_for_lines, ClearToken, GravityTimer};
pub use pieces::{get_shape, kick_offsets, Shape};
pub use rng::{PieceGenerator, Randomizer, SimpleRng};
pub use snapshot::{ActiveSnapshot, ClearWatcher, GameSnapshot};
