//! Game state module - manages the complete game session
//!
//! This module ties together the board, the piece catalog, the collision
//! oracle, the piece generator and the timers. It owns the falling piece and
//! applies moves, rotations, gravity, locking, line clears, holds and the game
//! lifecycle.
//!
//! Every mutation runs to completion before the next one is accepted. Two flags
//! gate input: a pending line clear rejects all piece intents until the rows
//! are removed, and the hold guard allows one hold per spawned piece.

use log::{debug, info};

use crate::board::{Board, RowList};
use crate::collision::collides;
use crate::gravity::{level_for_lines, ClearTimer, ClearToken, GravityTimer};
use crate::pieces::{get_shape, kick_offsets, Shape};
use crate::rng::{PieceGenerator, Randomizer};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;

/// Engine settings fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Seed for the piece generator
    pub seed: u32,
    pub randomizer: Randomizer,
    /// Delay between detecting full rows and removing them
    pub clear_delay_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            randomizer: Randomizer::Uniform,
            clear_delay_ms: CLEAR_DELAY_MS,
        }
    }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Working copy of the catalog matrix, rotated in place
    pub shape: Shape,
    /// Anchor column (left edge of the matrix)
    pub x: i8,
    /// Anchor row (top edge of the matrix)
    pub y: i8,
    /// Set on the step the piece could not descend and is committed
    pub collided: bool,
}

impl ActivePiece {
    /// Create a new piece at the spawn anchor
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: get_shape(kind),
            x: SPAWN_X,
            y: SPAWN_Y,
            collided: false,
        }
    }

    /// Whether this piece shifted by `offset` would be blocked on `board`
    pub fn collides(&self, board: &Board, offset: (i8, i8)) -> bool {
        collides(&self.shape, self.x, self.y, board, offset)
    }
}

/// Why the session ended. Both reasons raise the same terminal flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// A new piece overlapped the stack at the spawn anchor
    SpawnBlocked,
    /// A piece locked without ever descending below the spawn row
    Overflow,
}

/// Emitted on every lock commit (consumed by observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    /// Monotonic lock counter within the episode
    pub lock_id: u32,
    /// Full rows found right after the commit (removed after the clear delay).
    /// Always 0 for a lock that ends the game, since no clear runs.
    pub rows_cleared: u8,
}

/// Rows waiting for their clear delay to elapse.
#[derive(Debug, Clone, PartialEq)]
struct PendingClear {
    rows: RowList,
    timer: ClearTimer,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    active: Option<ActivePiece>,
    next: PieceKind,
    hold: Option<PieceKind>,
    /// Hold guard: set by a hold, cleared by the next spawn
    hold_used: bool,
    generator: PieceGenerator,
    pending_clear: Option<PendingClear>,
    gravity: GravityTimer,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Monotonic id for spawned pieces (increments on every successful spawn).
    piece_id: u32,
    /// Monotonic id for lock commits.
    lock_id: u32,
    /// Cumulative cleared rows: the scoring surface.
    lines_cleared: u32,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
    lock_flash_ms: u32,
    paused: bool,
    game_over: Option<GameOverReason>,
    started: bool,
}

impl GameState {
    /// Create an idle session; call [`start`](Self::start) to spawn the first piece
    pub fn new(config: GameConfig) -> Self {
        let mut generator = PieceGenerator::new(config.seed, config.randomizer);
        let next = generator.draw();

        Self {
            config,
            board: Board::new(),
            active: None,
            next,
            hold: None,
            hold_used: false,
            generator,
            pending_clear: None,
            gravity: GravityTimer::new(),
            episode_id: 0,
            piece_id: 0,
            lock_id: 0,
            lines_cleared: 0,
            last_event: None,
            lock_flash_ms: 0,
            paused: false,
            game_over: None,
            started: false,
        }
    }

    /// Create an idle session with the default config and the given seed
    pub fn with_seed(seed: u32) -> Self {
        Self::new(GameConfig {
            seed,
            ..GameConfig::default()
        })
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            "episode {} started (seed {}, {})",
            self.episode_id,
            self.config.seed,
            self.config.randomizer.as_str()
        );
        self.spawn_next();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    /// Whether a hold is currently allowed
    pub fn can_hold(&self) -> bool {
        self.accepts_input() && !self.hold_used && self.active.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    /// Cumulative number of removed rows
    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        level_for_lines(self.lines_cleared)
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Rows waiting to be removed, top to bottom (empty when no clear is pending)
    pub fn clearing_rows(&self) -> &[usize] {
        self.pending_clear
            .as_ref()
            .map_or(&[][..], |pending| pending.rows.as_slice())
    }

    /// Token of the pending clear, for schedulers driving [`complete_clear`](Self::complete_clear)
    pub fn pending_clear_token(&self) -> Option<ClearToken> {
        self.pending_clear.as_ref().map(|pending| pending.timer.token())
    }

    /// Whether the "just locked" feedback window is open
    pub fn just_locked(&self) -> bool {
        self.lock_flash_ms > 0
    }

    /// Current gravity interval (level interval, or the soft-drop interval
    /// right after a manual soft drop)
    pub fn drop_interval_ms(&self) -> u32 {
        self.gravity.interval_ms(self.level())
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Replace the locked stack, e.g. to set up a puzzle.
    ///
    /// Only locked cells of `board` are kept; the falling piece is redrawn on
    /// top. Rejected once the game is over or while a clear is pending.
    pub fn load_board(&mut self, mut board: Board) -> bool {
        if self.game_over() || self.pending_clear.is_some() {
            return false;
        }
        board.clear_unlocked();
        self.board = board;
        self.refresh_board();
        true
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        for (y, row) in out.board.iter_mut().enumerate() {
            row.copy_from_slice(self.board.row(y));
        }
        out.active = self.active.map(ActiveSnapshot::from);
        out.next = self.next;
        out.hold = self.hold;
        out.can_hold = self.can_hold();
        out.clearing_rows.clear();
        out.clearing_rows
            .try_extend_from_slice(self.clearing_rows())
            .ok();
        out.just_locked = self.just_locked();
        out.paused = self.paused;
        out.game_over = self.game_over();
        out.lines_cleared = self.lines_cleared;
        out.level = self.level();
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Whether piece intents are currently accepted
    fn accepts_input(&self) -> bool {
        self.started && !self.paused && self.game_over.is_none() && self.pending_clear.is_none()
    }

    /// Put a new piece of `kind` at the spawn anchor.
    ///
    /// Resets the hold guard. If the piece overlaps the stack the game is over
    /// and `false` is returned. Rejected (also `false`) after game over and
    /// while a clear is pending.
    pub fn spawn(&mut self, kind: PieceKind) -> bool {
        if self.game_over.is_some() || self.pending_clear.is_some() {
            return false;
        }
        self.started = true;

        let piece = ActivePiece::new(kind);
        if piece.collides(&self.board, (0, 0)) {
            self.active = None;
            self.end_game(GameOverReason::SpawnBlocked);
            self.refresh_board();
            return false;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        self.hold_used = false;
        self.refresh_board();
        debug!("spawned {:?} (piece {})", kind, self.piece_id);
        true
    }

    /// Promote the lookahead to active and draw a new lookahead
    fn spawn_next(&mut self) -> bool {
        let kind = self.next;
        self.next = self.generator.draw();
        self.spawn(kind)
    }

    fn end_game(&mut self, reason: GameOverReason) {
        self.game_over = Some(reason);
        self.pending_clear = None;
        info!(
            "episode {} over: {:?} after {} lines",
            self.episode_id, reason, self.lines_cleared
        );
    }

    /// Try to shift the active piece horizontally
    pub fn try_move(&mut self, dx: i8) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        if active.collides(&self.board, (dx, 0)) {
            return false;
        }

        self.active = Some(ActivePiece {
            x: active.x + dx,
            ..active
        });
        self.refresh_board();
        true
    }

    /// Rotate the active piece, kicking it sideways if the rotated matrix
    /// collides in place.
    ///
    /// Offsets +1, -1, +2, -2, ... are tried up to the rotated matrix width.
    /// If none fits, the rotation is abandoned and nothing changes.
    pub fn try_rotate(&mut self, direction: RotateDirection) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let rotated = ActivePiece {
            shape: active.shape.rotated(direction),
            ..active
        };

        let offset = if !rotated.collides(&self.board, (0, 0)) {
            Some(0)
        } else {
            kick_offsets(rotated.shape.cols()).find(|&dx| !rotated.collides(&self.board, (dx, 0)))
        };

        let Some(dx) = offset else {
            return false;
        };
        if dx != 0 {
            debug!("rotation of {:?} kicked by {}", active.kind, dx);
        }

        self.active = Some(ActivePiece {
            x: rotated.x + dx,
            ..rotated
        });
        self.refresh_board();
        true
    }

    /// Manual soft drop: descend one row (or lock) and restart the gravity
    /// phase so the next automatic tick does not follow immediately.
    pub fn soft_drop(&mut self) -> bool {
        if !self.accepts_input() || self.active.is_none() {
            return false;
        }
        self.gravity.restart_boosted();
        self.descend()
    }

    /// One automatic gravity step. Same descent as a soft drop, without
    /// touching the gravity phase.
    pub fn gravity_tick(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.descend()
    }

    /// Move the active piece down one row, or mark it collided and commit it
    fn descend(&mut self) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };

        if !active.collides(&self.board, (0, 1)) {
            active.y += 1;
        } else {
            active.collided = true;
        }
        self.active = Some(active);
        self.refresh_board();
        true
    }

    /// Redraw the falling piece over the locked stack; commit it if collided.
    fn refresh_board(&mut self) {
        let Some(active) = self.active else {
            self.board.rebuild(None);
            return;
        };

        self.board
            .rebuild(Some((&active.shape, active.x, active.y, active.kind)));

        if active.collided {
            self.board.commit(active.kind);
            self.active = None;
            self.after_lock(active);
        }
    }

    /// Line-clear engine entry point, run right after a commit
    fn after_lock(&mut self, piece: ActivePiece) {
        self.lock_id = self.lock_id.wrapping_add(1);
        self.lock_flash_ms = LOCK_FLASH_MS;

        // Locked before ever leaving the spawn row: the stack reached the top.
        // Full rows are left in place, so none are reported.
        if piece.y <= SPAWN_Y {
            self.last_event = Some(LockEvent {
                kind: piece.kind,
                lock_id: self.lock_id,
                rows_cleared: 0,
            });
            debug!("locked {:?} at ({}, {}), overflow", piece.kind, piece.x, piece.y);
            self.end_game(GameOverReason::Overflow);
            return;
        }

        let full_rows = self.board.full_rows();
        self.last_event = Some(LockEvent {
            kind: piece.kind,
            lock_id: self.lock_id,
            rows_cleared: full_rows.len() as u8,
        });
        debug!(
            "locked {:?} at ({}, {}), {} full rows",
            piece.kind,
            piece.x,
            piece.y,
            full_rows.len()
        );

        if full_rows.is_empty() {
            self.spawn_next();
            return;
        }

        let token = ClearToken {
            episode_id: self.episode_id,
            lock_id: self.lock_id,
        };
        self.pending_clear = Some(PendingClear {
            rows: full_rows,
            timer: ClearTimer::new(token, self.config.clear_delay_ms),
        });
    }

    /// Remove the rows of the pending clear identified by `token`, add them
    /// to the cleared-rows counter and spawn the next piece.
    ///
    /// A token from an earlier episode or an already completed clear is
    /// ignored and `false` is returned.
    pub fn complete_clear(&mut self, token: ClearToken) -> bool {
        let matches = self
            .pending_clear
            .as_ref()
            .is_some_and(|pending| pending.timer.token() == token);
        if !matches || self.game_over.is_some() {
            debug!("ignoring stale clear {:?}", token);
            return false;
        }
        let Some(pending) = self.pending_clear.take() else {
            return false;
        };

        let removed = self.board.remove_rows(&pending.rows);
        self.lines_cleared = self.lines_cleared.saturating_add(removed as u32);
        debug!(
            "cleared rows {:?}, total {}",
            pending.rows.as_slice(),
            self.lines_cleared
        );

        self.gravity.reset_phase();
        self.spawn_next();
        true
    }

    /// Hold or swap the active piece (once per spawned piece)
    pub fn hold(&mut self) -> bool {
        if !self.can_hold() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        match self.hold.replace(active.kind) {
            // Swap: the held piece comes back at the spawn anchor, the lookahead is untouched.
            Some(held) => {
                self.spawn(held);
            }
            None => {
                self.spawn_next();
            }
        }
        debug!("held {:?}", active.kind);

        self.hold_used = true;
        true
    }

    /// Toggle pause. Refused before start and after game over.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.started || self.game_over.is_some() {
            return false;
        }
        self.paused = !self.paused;
        // Time spent before the pause does not count toward the next descent.
        self.gravity.reset_phase();
        true
    }

    /// Throw the session away and start a new episode.
    ///
    /// Pending timers die with the old state; tokens issued before the restart
    /// no longer match anything.
    pub fn restart(&mut self) {
        let config = GameConfig {
            seed: self.generator.next_seed(),
            ..self.config
        };
        let next_episode = self.episode_id.wrapping_add(1);
        *self = Self::new(config);
        self.episode_id = next_episode;
        self.start();
    }

    /// Advance timers by `elapsed_ms`: the clear delay while a clear is
    /// pending, gravity otherwise. Returns whether the state changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.started || self.paused || self.game_over.is_some() {
            return false;
        }

        self.lock_flash_ms = self.lock_flash_ms.saturating_sub(elapsed_ms);

        if let Some(pending) = self.pending_clear.as_mut() {
            return match pending.timer.advance(elapsed_ms) {
                Some(token) => self.complete_clear(token),
                None => false,
            };
        }

        let fired = self.gravity.advance(elapsed_ms, self.level());
        let mut changed = false;
        for _ in 0..fired {
            if !self.gravity_tick() {
                break;
            }
            changed = true;
        }
        changed
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.try_move(-1),
            GameAction::MoveRight => self.try_move(1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::RotateCw => self.try_rotate(RotateDirection::Clockwise),
            GameAction::RotateCcw => self.try_rotate(RotateDirection::CounterClockwise),
            GameAction::Hold => self.hold(),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
