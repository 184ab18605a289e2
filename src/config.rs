//! Runtime configuration for an archive instance.
//!
//! Build-time toggles stay in Cargo features; everything that varies per
//! deployment lives here and can be handed over from JS as a JSON object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Guesses allowed per puzzle.
pub const BOARD_ROWS: usize = 6;
/// Letters per guess.
pub const WORD_LEN: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Calendar date of puzzle #1.
    pub origin: NaiveDate,
    /// Record slots pre-allocated in the store so upcoming days already have a home.
    pub slot_capacity: usize,
    /// Pause between the final guess and the end-of-game modal.
    pub end_game_delay_ms: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            // 2021-06-21 is always a valid date
            origin: NaiveDate::from_ymd_opt(2021, 6, 21).unwrap_or_default(),
            slot_capacity: 500,
            end_game_delay_ms: 500,
        }
    }
}

impl ArchiveConfig {
    /// Parse a JSON config, falling back to defaults when it is missing or malformed.
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        match raw {
            None => Self::default(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
                log::warn!("ignoring malformed config ({err}); using defaults");
                Self::default()
            }),
        }
    }
}
