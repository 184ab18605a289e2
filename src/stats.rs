//! Win streak bookkeeping.

use serde::{Deserialize, Serialize};

use crate::game::GameState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Applies a finished game to the streaks exactly once, no matter how often the
/// resolved state is reported.
#[derive(Clone, Debug, Default)]
pub struct StreakTracker {
    streaks: Streaks,
    updated: bool,
}

impl StreakTracker {
    pub fn new(streaks: Streaks) -> Self {
        Self { streaks, updated: false }
    }

    pub fn streaks(&self) -> Streaks {
        self.streaks
    }

    /// Returns true when the streaks changed.
    pub fn record(&mut self, state: GameState) -> bool {
        if self.updated {
            return false;
        }
        match state {
            GameState::Won => {
                if self.streaks.current >= self.streaks.longest {
                    self.streaks.longest += 1;
                }
                self.streaks.current += 1;
            }
            GameState::Lost => self.streaks.current = 0,
            GameState::Playing => return false,
        }
        self.updated = true;
        true
    }

    /// Allow the next resolution to count again ("play again").
    pub fn rearm(&mut self) {
        self.updated = false;
    }
}
