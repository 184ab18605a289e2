//! Persistence: key/value backends and the per-day record store.
//!
//! The record store lives under a single key as one JSON document and is always
//! rewritten in full. Older layouts are upgraded through [`MIGRATIONS`] when loaded.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::{BOARD_ROWS, WORD_LEN};
use crate::error::{ArchiveError, Result};
use crate::game::{GameState, SavedBoard};
use crate::words::WordSource;

pub const GAME_STATE_LIST_KEY: &str = "gameStateList";

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 2;

/// Minimal string key/value storage (browser `localStorage` or in-memory).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Read a JSON value; absent or undecodable entries yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_item(key) {
        Ok(raw) => raw?,
        Err(err) => {
            log::warn!("reading {key} failed: {err}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("discarding malformed {key}: {err}");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}

/// In-memory backend for native builds and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    /// Largest value accepted by `set_item`; `Some(0)` rejects every write.
    value_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, like a browser with storage quota exhausted.
    pub fn read_only(items: HashMap<String, String>) -> Self {
        Self {
            items,
            value_limit: Some(0),
        }
    }

    /// A store that only fits values up to `limit` bytes, so small keys save and
    /// large documents fail.
    pub fn with_value_limit(limit: usize) -> Self {
        Self {
            items: HashMap::new(),
            value_limit: Some(limit),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.value_limit.is_some_and(|limit| value.len() > limit) {
            return Err(ArchiveError::Storage(format!("quota exceeded writing {key}")));
        }
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Outcome of one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub state: GameState,
    pub board: Option<SavedBoard>,
    /// Won before boards were tracked; the guess count is lost.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub score_unknown: bool,
}

impl Default for DayRecord {
    fn default() -> Self {
        Self {
            state: GameState::Playing,
            board: None,
            score_unknown: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    records: Vec<DayRecord>,
}

/// One schema upgrade step, from `from` to `from + 1`.
struct Migration {
    from: u32,
    apply: fn(Value, &dyn WordSource) -> Result<Value>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        from: 0,
        apply: legacy_states_to_records,
    },
    Migration {
        from: 1,
        apply: wrap_in_envelope,
    },
];

/// v0 stored bare state strings. Wins get the answer on row 0 and an unknown score.
fn legacy_states_to_records(value: Value, words: &dyn WordSource) -> Result<Value> {
    let states: Vec<String> = serde_json::from_value(value)?;
    let records: Vec<DayRecord> = states
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let state = serde_json::from_value(Value::String(raw.clone()))
                .unwrap_or(GameState::Playing);
            if state != GameState::Won {
                return DayRecord { state, ..DayRecord::default() };
            }
            let board = words
                .answer(idx as u32 + 1)
                .ok()
                .map(|answer| placeholder_board(&answer));
            DayRecord {
                state,
                board,
                score_unknown: true,
            }
        })
        .collect();
    Ok(serde_json::to_value(records)?)
}

fn wrap_in_envelope(value: Value, _words: &dyn WordSource) -> Result<Value> {
    Ok(json!({ "version": 2, "records": value }))
}

/// Answer on the first row, blank rows after.
fn placeholder_board(answer: &str) -> SavedBoard {
    let letters: Vec<String> = answer.chars().map(String::from).collect();
    std::array::from_fn(|r| {
        std::array::from_fn(|c| {
            if r == 0 {
                letters.get(c).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
    })
}

/// Classify a stored document. Unversioned arrays predate the envelope.
fn detect_version(value: &Value) -> Option<u32> {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::String(_)) => Some(0),
            _ => Some(1),
        },
        Value::Object(map) => map
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok()),
        _ => None,
    }
}

fn upgrade(mut value: Value, words: &dyn WordSource) -> Result<(Vec<DayRecord>, bool)> {
    let mut version = detect_version(&value).ok_or(ArchiveError::UnknownLayout)?;
    if version > CURRENT_VERSION {
        return Err(ArchiveError::UnsupportedVersion(version));
    }
    let migrated = version < CURRENT_VERSION;
    while version < CURRENT_VERSION {
        let step = MIGRATIONS
            .iter()
            .find(|m| m.from == version)
            .ok_or(ArchiveError::UnsupportedVersion(version))?;
        value = (step.apply)(value, words)?;
        log::info!("migrated record store v{} -> v{}", version, version + 1);
        version += 1;
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    Ok((envelope.records, migrated))
}

/// Day-picker row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub day: u32,
    pub label: String,
    pub state: GameState,
    pub score: String,
    pub cleared: bool,
}

/// Per-day outcomes, indexed by `day - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<DayRecord>,
}

impl RecordStore {
    /// Empty store with `capacity` default slots.
    pub fn fresh(capacity: usize) -> Self {
        Self {
            records: vec![DayRecord::default(); capacity],
        }
    }

    /// Load from `store`, migrating old layouts. Missing or malformed data is
    /// replaced by a fresh store; either way the result is written back when it
    /// differs from what was stored. The second value is that write-back's outcome.
    pub fn load(
        store: &mut dyn KeyValueStore,
        words: &dyn WordSource,
        capacity: usize,
    ) -> (Self, Result<()>) {
        let raw = match store.get_item(GAME_STATE_LIST_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("record store unreadable ({err}); starting fresh");
                None
            }
        };

        let (mut records, dirty) = match raw {
            None => (Vec::new(), true),
            Some(raw) => match serde_json::from_str::<Value>(&raw)
                .map_err(ArchiveError::from)
                .and_then(|value| upgrade(value, words))
            {
                Ok(loaded) => loaded,
                Err(err) => {
                    log::warn!("resetting record store: {err}");
                    (Vec::new(), true)
                }
            },
        };

        let padded = records.len() < capacity;
        if padded {
            records.resize(capacity, DayRecord::default());
        }

        let this = Self { records };
        let written = if dirty || padded {
            this.save(store)
        } else {
            Ok(())
        };
        if let Err(err) = &written {
            log::warn!("could not persist record store: {err}");
        }
        (this, written)
    }

    /// Rewrite the whole store.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let envelope = Envelope {
            version: CURRENT_VERSION,
            records: self.records.clone(),
        };
        save_json(store, GAME_STATE_LIST_KEY, &envelope)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn record(&self, day: u32) -> Option<&DayRecord> {
        let idx = (day as usize).checked_sub(1)?;
        self.records.get(idx)
    }

    fn record_mut(&mut self, day: u32) -> Result<&mut DayRecord> {
        let idx = (day as usize)
            .checked_sub(1)
            .ok_or(ArchiveError::DayOutOfRange {
                day,
                max_day: self.records.len() as u32,
            })?;
        if idx >= self.records.len() {
            self.records.resize(idx + 1, DayRecord::default());
        }
        Ok(&mut self.records[idx])
    }

    /// Won with the board still on file.
    pub fn is_saved_solution(&self, day: u32) -> bool {
        self.record(day)
            .is_some_and(|r| r.state == GameState::Won && r.board.is_some())
    }

    /// Won, but the board was cleared so the day can be replayed.
    pub fn is_cleared_solution(&self, day: u32) -> bool {
        self.record(day)
            .is_some_and(|r| r.state == GameState::Won && r.board.is_none())
    }

    /// `"<n>/6"` for a saved board, empty when unknown or unsolved.
    pub fn score(&self, day: u32) -> String {
        let Some(record) = self.record(day) else {
            return String::new();
        };
        if record.score_unknown {
            return String::new();
        }
        let Some(board) = &record.board else {
            return String::new();
        };
        let guesses = board
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .count();
        if guesses == 0 {
            String::new()
        } else {
            format!("{guesses}/{BOARD_ROWS}")
        }
    }

    /// Drop the saved board; the outcome stays.
    pub fn clear_solution(&mut self, day: u32, store: &mut dyn KeyValueStore) -> Result<()> {
        let record = self.record_mut(day)?;
        record.board = None;
        self.save(store)
    }

    /// Store a finished game and persist.
    pub fn record_result(
        &mut self,
        day: u32,
        state: GameState,
        board: Option<SavedBoard>,
        store: &mut dyn KeyValueStore,
    ) -> Result<()> {
        let record = self.record_mut(day)?;
        *record = DayRecord {
            state,
            board,
            score_unknown: false,
        };
        self.save(store)
    }

    pub fn menu_entry(&self, day: u32) -> MenuEntry {
        let state = self.record(day).map_or(GameState::Playing, |r| r.state);
        let marker = match state {
            GameState::Won => " ✔",
            GameState::Lost => " ✘",
            GameState::Playing => "",
        };
        MenuEntry {
            day,
            label: format!("{day}{marker}"),
            state,
            score: self.score(day),
            cleared: self.is_cleared_solution(day),
        }
    }
}

/// Board with nothing typed, handy for comparisons.
pub fn empty_board() -> SavedBoard {
    std::array::from_fn(|_| std::array::from_fn::<String, WORD_LEN, _>(|_| String::new()))
}
