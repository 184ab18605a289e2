//! Wordle Archive core crate.
//!
//! Replays every past daily puzzle in the browser. Game rules, the day picker and
//! persistence are plain Rust so they run (and are tested) natively; `web` wires
//! them to `localStorage`, the address bar and keyboard events when compiled to
//! WASM.

use wasm_bindgen::prelude::*;

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod puzzle;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod web;
pub mod words;

pub use app::{Archive, View};
pub use config::{ArchiveConfig, BOARD_ROWS, WORD_LEN};
pub use error::{ArchiveError, Result};
pub use game::{CellStatus, Game, GameState, GuessOutcome, LetterStatus, SavedBoard};
pub use puzzle::Navigation;
pub use storage::{DayRecord, KeyValueStore, MemoryStore, RecordStore};
pub use words::{EmbeddedWords, WordLists, WordSource};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
