//! Integration tests for the game session

use blockfall::core::{Board, ClearWatcher, GameConfig, GameOverReason, GameState, Randomizer};
use blockfall::types::{Cell, GameAction, PieceKind, RotateDirection, CLEAR_DELAY_MS, TICK_MS};

fn started(seed: u32) -> GameState {
    let mut state = GameState::with_seed(seed);
    state.start();
    state
}

/// Soft drop until the current piece locks; returns the number of drops.
fn drop_until_locked(state: &mut GameState) -> usize {
    let mut drops = 0;
    loop {
        let before = state.piece_id();
        assert!(state.soft_drop(), "soft drop rejected after {} drops", drops);
        drops += 1;
        if state.active().is_none() || state.piece_id() != before || state.game_over() {
            return drops;
        }
        assert!(drops < 64, "piece never locked");
    }
}

/// Tick until the pending clear completes; returns elapsed milliseconds.
fn tick_until_cleared(state: &mut GameState) -> u32 {
    let mut elapsed = 0;
    while !state.clearing_rows().is_empty() {
        state.tick(TICK_MS);
        elapsed += TICK_MS;
        assert!(elapsed < 10_000, "clear never completed");
    }
    elapsed
}

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::with_seed(12345);
    assert!(!state.started());
    assert!(state.active().is_none());

    state.start();
    assert!(state.started());
    assert!(state.active().is_some());
    assert!(!state.game_over());
    assert!(!state.paused());
}

#[test]
fn test_o_piece_falls_to_floor() {
    let mut state = started(1);
    assert!(state.spawn(PieceKind::O));

    let drops = drop_until_locked(&mut state);
    assert_eq!(drops, 19);

    for (x, y) in [(3, 18), (4, 18), (3, 19), (4, 19)] {
        assert_eq!(state.board().get(x, y), Some(Cell::locked(PieceKind::O)));
    }
    assert_eq!(state.board().locked_count(), 4);
    assert_eq!(state.lines_cleared(), 0);
    assert!(state.clearing_rows().is_empty());

    // The lookahead was promoted.
    let active = state.active().unwrap();
    assert_eq!((active.x, active.y), (3, 0));
}

#[test]
fn test_single_line_clear_after_delay() {
    let mut state = started(1);
    assert!(state.load_board(Board::from_rows(&["S.........", "LLLLLLLLL."]).unwrap()));
    assert!(state.spawn(PieceKind::I));

    // The I bar sits in matrix column 1, so anchor 8 puts it in column 9.
    for _ in 0..5 {
        assert!(state.try_move(1));
    }
    assert_eq!(state.active().unwrap().x, 8);
    assert!(!state.try_move(1));

    let drops = drop_until_locked(&mut state);
    assert_eq!(drops, 17);
    assert_eq!(state.clearing_rows(), &[19]);
    assert_eq!(state.take_last_event().unwrap().rows_cleared, 1);

    // Nothing moves while the clear is pending.
    assert!(!state.apply_action(GameAction::MoveLeft));
    assert!(!state.apply_action(GameAction::RotateCw));
    assert!(!state.apply_action(GameAction::Hold));

    let elapsed = tick_until_cleared(&mut state);
    assert!(elapsed >= CLEAR_DELAY_MS);
    assert!(elapsed < CLEAR_DELAY_MS + TICK_MS);

    assert_eq!(state.lines_cleared(), 1);
    let board = state.board();
    assert_eq!(board.get(0, 19), Some(Cell::locked(PieceKind::S)));
    for y in 17..20 {
        assert_eq!(board.get(9, y), Some(Cell::locked(PieceKind::I)));
    }
    assert!(!board.is_locked(9, 16));
    assert!(!board.is_locked(1, 19));
    assert!(state.active().is_some());
}

#[test]
fn test_four_line_clear() {
    let mut state = started(2);
    let row = "TTTTTTTTT.";
    state.load_board(Board::from_rows(&[row, row, row, row]).unwrap());
    state.spawn(PieceKind::I);
    for _ in 0..5 {
        state.try_move(1);
    }
    drop_until_locked(&mut state);

    assert_eq!(state.clearing_rows(), &[16, 17, 18, 19]);
    let token = state.pending_clear_token().unwrap();
    assert!(state.complete_clear(token));
    assert_eq!(state.lines_cleared(), 4);
    assert_eq!(state.board().locked_count(), 0);
}

#[test]
fn test_level_follows_cleared_lines() {
    let mut state = started(3);
    let mut watcher = ClearWatcher::new();
    let row = "JJJJJJJJJ.";

    for _ in 0..3 {
        assert!(state.load_board(Board::from_rows(&[row, row, row, row]).unwrap()));
        state.spawn(PieceKind::I);
        for _ in 0..5 {
            state.try_move(1);
        }
        drop_until_locked(&mut state);
        tick_until_cleared(&mut state);
        assert_eq!(
            watcher.observe(state.episode_id(), state.lines_cleared()),
            Some(4)
        );
    }

    assert_eq!(state.lines_cleared(), 12);
    assert_eq!(state.level(), 1);
    assert_eq!(state.drop_interval_ms(), 500);
}

#[test]
fn test_rotation_kicks_off_left_wall() {
    let mut state = started(4);
    state.spawn(PieceKind::J);
    state.try_rotate(RotateDirection::Clockwise);
    state.try_rotate(RotateDirection::Clockwise);

    // Upside-down J occupies matrix columns 1 and 2.
    let mut moves = 0;
    while state.try_move(-1) {
        moves += 1;
    }
    assert_eq!(moves, 4);
    let before = state.active().unwrap();
    assert_eq!(before.x, -1);

    assert!(state.try_rotate(RotateDirection::Clockwise));
    let after = state.active().unwrap();
    assert_eq!(after.x, 0);
    assert_eq!(after.y, before.y);
    assert_eq!(after.shape, before.shape.rotated(RotateDirection::Clockwise));
}

#[test]
fn test_rotation_kicks_off_right_wall() {
    let mut state = started(4);
    state.spawn(PieceKind::I);
    while state.try_move(1) {}
    // Vertical I in the last column: turning it horizontal needs a kick left.
    assert_eq!(state.active().unwrap().x, 8);

    assert!(state.try_rotate(RotateDirection::Clockwise));
    let after = state.active().unwrap();
    assert_eq!(after.x, 6);
    assert!(!state.board().is_locked(9, 1));
}

#[test]
fn test_failed_rotation_changes_nothing() {
    let mut state = started(5);
    let row = "ZZZZ.ZZZZZ";
    state.load_board(Board::from_rows(&[row; 16]).unwrap());
    state.spawn(PieceKind::I);
    for _ in 0..5 {
        assert!(state.soft_drop());
    }
    let before = state.snapshot();

    assert!(!state.try_rotate(RotateDirection::Clockwise));
    assert!(!state.try_rotate(RotateDirection::CounterClockwise));
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_spawn_into_full_top_rows_ends_game() {
    let mut state = GameState::with_seed(6);
    let full = "OOOOOOOOOO";
    let mut rows = vec![full, full];
    rows.extend(std::iter::repeat("..........").take(18));
    assert!(state.load_board(Board::from_rows(&rows).unwrap()));

    state.start();
    assert!(state.game_over());
    assert_eq!(state.game_over_reason(), Some(GameOverReason::SpawnBlocked));

    let before = state.snapshot();
    for action in [
        GameAction::MoveLeft,
        GameAction::MoveRight,
        GameAction::SoftDrop,
        GameAction::RotateCw,
        GameAction::RotateCcw,
        GameAction::Hold,
        GameAction::Pause,
    ] {
        assert!(!state.apply_action(action), "{:?} accepted after game over", action);
    }
    assert!(!state.tick(10_000));
    assert!(!state.spawn(PieceKind::O));
    assert_eq!(state.snapshot(), before);

    // Only a reset leaves the terminal state.
    assert!(state.apply_action(GameAction::Restart));
    assert!(!state.game_over());
    assert_eq!(state.episode_id(), 1);
}

#[test]
fn test_stack_to_the_top_ends_game() {
    let mut state = started(7);
    let mut dropped = 0;
    while !state.game_over() {
        drop_until_locked(&mut state);
        dropped += 1;
        assert!(dropped < 40, "stack never overflowed");
    }
    assert!(state.active().is_none());
    assert!(state.clearing_rows().is_empty());
}

#[test]
fn test_hold_once_per_piece() {
    let mut state = started(8);
    state.spawn(PieceKind::T);
    let next = state.next_piece();

    assert!(state.apply_action(GameAction::Hold));
    assert_eq!(state.hold_piece(), Some(PieceKind::T));
    assert_eq!(state.active().unwrap().kind, next);

    let before = state.snapshot();
    assert!(!state.apply_action(GameAction::Hold));
    assert_eq!(state.snapshot(), before);

    // Locking re-arms the guard; the swap brings T back at the spawn anchor.
    drop_until_locked(&mut state);
    let current = state.active().unwrap().kind;
    assert!(state.hold());
    let active = state.active().unwrap();
    assert_eq!(active.kind, PieceKind::T);
    assert_eq!((active.x, active.y), (3, 0));
    assert_eq!(state.hold_piece(), Some(current));
}

#[test]
fn test_pause_freezes_everything() {
    let mut state = started(9);
    let before = state.snapshot();
    assert!(state.apply_action(GameAction::Pause));

    assert!(!state.tick(5000));
    assert!(!state.try_move(1));
    assert!(!state.soft_drop());
    assert!(!state.hold());
    assert!(state.paused());

    assert!(state.apply_action(GameAction::Pause));
    let mut after = state.snapshot();
    after.paused = before.paused;
    assert_eq!(after, before);
}

#[test]
fn test_first_descent_after_resume_takes_full_interval() {
    let mut state = started(9);
    state.spawn(PieceKind::O);
    state.tick(state.drop_interval_ms() - 10);
    assert_eq!(state.active().unwrap().y, 0);

    assert!(state.apply_action(GameAction::Pause));
    assert!(state.apply_action(GameAction::Pause));

    state.tick(TICK_MS);
    assert_eq!(state.active().unwrap().y, 0);
    state.tick(state.drop_interval_ms() - TICK_MS - 1);
    assert_eq!(state.active().unwrap().y, 0);
    state.tick(1);
    assert_eq!(state.active().unwrap().y, 1);
}

#[test]
fn test_gravity_and_soft_drop_phase() {
    let mut state = started(10);
    let y0 = state.active().unwrap().y;

    for _ in 0..62 {
        state.tick(TICK_MS);
    }
    assert_eq!(state.active().unwrap().y, y0);
    state.tick(TICK_MS);
    assert_eq!(state.active().unwrap().y, y0 + 1);

    // A manual soft drop restarts the phase with the shorter period.
    assert!(state.soft_drop());
    assert_eq!(state.drop_interval_ms(), 833);
    state.tick(832);
    assert_eq!(state.active().unwrap().y, y0 + 2);
    state.tick(1);
    assert_eq!(state.active().unwrap().y, y0 + 3);
    assert_eq!(state.drop_interval_ms(), 1000);
}

#[test]
fn test_stale_clear_after_restart_is_ignored() {
    let mut state = started(11);
    state.load_board(Board::from_rows(&["LLLLLLLLL."]).unwrap());
    state.spawn(PieceKind::I);
    for _ in 0..5 {
        state.try_move(1);
    }
    drop_until_locked(&mut state);
    let token = state.pending_clear_token().unwrap();

    state.apply_action(GameAction::Restart);
    let before = state.snapshot();
    assert!(!state.complete_clear(token));
    assert_eq!(state.snapshot(), before);
    assert_eq!(state.lines_cleared(), 0);
}

#[test]
fn test_same_seed_same_game() {
    let actions = [
        GameAction::MoveLeft,
        GameAction::RotateCw,
        GameAction::SoftDrop,
        GameAction::MoveRight,
        GameAction::Hold,
        GameAction::RotateCcw,
    ];
    let config = GameConfig {
        seed: 77,
        randomizer: Randomizer::SevenBag,
        ..GameConfig::default()
    };

    let mut a = GameState::new(config);
    let mut b = GameState::new(config);
    a.start();
    b.start();
    for step in 0..300 {
        let action = actions[step % actions.len()];
        a.apply_action(action);
        b.apply_action(action);
        a.tick(TICK_MS * 4);
        b.tick(TICK_MS * 4);
    }
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_custom_clear_delay() {
    let mut state = GameState::new(GameConfig {
        clear_delay_ms: 32,
        ..GameConfig::default()
    });
    state.start();
    state.load_board(Board::from_rows(&["LLLLLLLLL."]).unwrap());
    state.spawn(PieceKind::I);
    for _ in 0..5 {
        state.try_move(1);
    }
    drop_until_locked(&mut state);

    assert_eq!(tick_until_cleared(&mut state), 32);
    assert_eq!(state.lines_cleared(), 1);
}
