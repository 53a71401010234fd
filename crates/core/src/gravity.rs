//! Gravity scheduler and clear-delay timer.
//!
//! Both timers are plain values owned by the game session and advanced by
//! [`GameState::tick`](crate::game_state::GameState::tick). Dropping them
//! cancels them; not advancing them suspends them.

use crate::types::{BASE_DROP_MS, LINES_PER_LEVEL, SOFT_DROP_BOOST};

/// Level for a cumulative cleared-row count.
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL
}

/// Automatic descent interval: `1000 / (level + 1)` ms.
pub fn drop_interval_ms(level: u32) -> u32 {
    (BASE_DROP_MS / level.saturating_add(1)).max(1)
}

/// Interval for the period right after a manual soft drop:
/// `1000 / ((level + 1) + 0.2)` ms.
pub fn soft_drop_interval_ms(level: u32) -> u32 {
    let ms = BASE_DROP_MS as f64 / (level as f64 + 1.0 + SOFT_DROP_BOOST);
    (ms as u32).max(1)
}

/// Periodic gravity tick generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GravityTimer {
    elapsed_ms: u32,
    boosted: bool,
}

impl GravityTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval of the current period.
    pub fn interval_ms(&self, level: u32) -> u32 {
        if self.boosted {
            soft_drop_interval_ms(level)
        } else {
            drop_interval_ms(level)
        }
    }

    /// Time accumulated in the current period.
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Restart from zero at the level interval.
    pub fn reset_phase(&mut self) {
        self.elapsed_ms = 0;
        self.boosted = false;
    }

    /// Restart the phase after a manual soft drop; the next period uses the
    /// soft-drop interval, later ones go back to the level interval.
    pub fn restart_boosted(&mut self) {
        self.elapsed_ms = 0;
        self.boosted = true;
    }

    /// Advance by `elapsed_ms` and return how many ticks came due.
    pub fn advance(&mut self, elapsed_ms: u32, level: u32) -> u32 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        let mut fired = 0;
        loop {
            let interval = self.interval_ms(level);
            if self.elapsed_ms < interval {
                break;
            }
            self.elapsed_ms -= interval;
            self.boosted = false;
            fired += 1;
        }
        fired
    }
}

/// Identifies one pending row clear.
///
/// A clear scheduled in one episode must never be applied to a later one, and
/// a clear must be applied at most once; both are checked by comparing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearToken {
    pub episode_id: u32,
    pub lock_id: u32,
}

/// One-shot countdown for a pending clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearTimer {
    token: ClearToken,
    remaining_ms: u32,
}

impl ClearTimer {
    pub fn new(token: ClearToken, delay_ms: u32) -> Self {
        Self {
            token,
            remaining_ms: delay_ms,
        }
    }

    pub fn token(&self) -> ClearToken {
        self.token
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Advance the countdown. Returns the token once the delay has fully
    /// elapsed, and on every call after that.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<ClearToken> {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        (self.remaining_ms == 0).then_some(self.token)
    }
}
