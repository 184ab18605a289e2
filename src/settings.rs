//! Player preferences and streak counters, each under its own storage key.

use serde::Serialize;

use crate::error::Result;
use crate::stats::Streaks;
use crate::storage::{KeyValueStore, load_json, save_json};

pub const DARK_MODE_KEY: &str = "dark-mode";
pub const COLORBLIND_MODE_KEY: &str = "colorblind-mode";
pub const FIRST_TIME_KEY: &str = "first-time";
pub const CURRENT_STREAK_KEY: &str = "current-streak";
pub const LONGEST_STREAK_KEY: &str = "longest-streak";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
    pub colorblind_mode: bool,
    /// No visit recorded yet; the intro modal is due.
    pub first_time: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            colorblind_mode: false,
            first_time: true,
        }
    }
}

impl Preferences {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            dark_mode: load_json(store, DARK_MODE_KEY).unwrap_or(defaults.dark_mode),
            colorblind_mode: load_json(store, COLORBLIND_MODE_KEY)
                .unwrap_or(defaults.colorblind_mode),
            first_time: load_json(store, FIRST_TIME_KEY).unwrap_or(defaults.first_time),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        save_json(store, DARK_MODE_KEY, &self.dark_mode)?;
        save_json(store, COLORBLIND_MODE_KEY, &self.colorblind_mode)?;
        save_json(store, FIRST_TIME_KEY, &self.first_time)
    }

    /// Class bound onto the document root at render time.
    pub fn root_class(&self) -> &'static str {
        if self.dark_mode { "dark-bg" } else { "bg" }
    }
}

pub fn load_streaks(store: &dyn KeyValueStore) -> Streaks {
    Streaks {
        current: load_json(store, CURRENT_STREAK_KEY).unwrap_or(0),
        longest: load_json(store, LONGEST_STREAK_KEY).unwrap_or(0),
    }
}

pub fn save_streaks(store: &mut dyn KeyValueStore, streaks: Streaks) -> Result<()> {
    save_json(store, CURRENT_STREAK_KEY, &streaks.current)?;
    save_json(store, LONGEST_STREAK_KEY, &streaks.longest)
}
