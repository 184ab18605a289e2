//! The archive context: everything one browser tab needs to play any past day.
//!
//! [`Archive`] is handed its storage backend, word lists, config and clock reading
//! up front; nothing here reaches for globals, so the whole flow runs natively in
//! tests and unchanged behind the wasm bridge.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::game::{CellStatus, Game, GameState, GuessOutcome, LetterStatus};
use crate::puzzle::{self, Navigation};
use crate::settings::{self, Preferences};
use crate::stats::{StreakTracker, Streaks};
use crate::storage::{KeyValueStore, MenuEntry, RecordStore};
use crate::words::{EmbeddedWords, WordSource};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Modals {
    end_game_open: bool,
    /// Delay requested for the end-of-game modal, not yet handed to a timer.
    end_game_due_ms: Option<u32>,
    intro_open: bool,
}

pub struct Archive<S: KeyValueStore, W: WordSource = EmbeddedWords> {
    store: S,
    words: W,
    config: ArchiveConfig,
    max_day: u32,
    day: u32,
    records: RecordStore,
    game: Game,
    /// Current day was loaded from a saved winning board.
    restored: bool,
    streaks: StreakTracker,
    prefs: Preferences,
    modals: Modals,
    storage_warning: Option<String>,
}

impl<S: KeyValueStore, W: WordSource> Archive<S, W> {
    /// Open the archive at the day named by `query` (address bar search string).
    pub fn new(
        mut store: S,
        words: W,
        config: ArchiveConfig,
        now: NaiveDateTime,
        query: Option<&str>,
    ) -> Result<Self> {
        let max_day = puzzle::max_day(config.origin, now, words.answer_count());
        let day = puzzle::resolve_day(query, max_day);
        log::info!("archive opened at day {day} of {max_day}");

        let capacity = config.slot_capacity.max(max_day as usize);
        let (records, written) = RecordStore::load(&mut store, &words, capacity);
        let prefs = Preferences::load(&store);
        let streaks = StreakTracker::new(settings::load_streaks(&store));
        let game = Game::new(words.answer(day)?);

        let mut archive = Self {
            store,
            words,
            config,
            max_day,
            day,
            records,
            game,
            restored: false,
            streaks,
            prefs,
            modals: Modals {
                intro_open: prefs.first_time,
                ..Modals::default()
            },
            storage_warning: None,
        };
        archive.note_storage("record store", written);
        archive.load_day(day)?;
        Ok(archive)
    }

    /// Reset in-memory play state for `day`, restoring a saved win if there is one.
    fn load_day(&mut self, day: u32) -> Result<()> {
        let answer = self.words.answer(day)?;
        let saved = self
            .records
            .record(day)
            .filter(|_| self.records.is_saved_solution(day))
            .and_then(|r| r.board.as_ref());
        match saved {
            Some(board) => {
                self.game = Game::restore(answer, board);
                self.restored = true;
            }
            None => {
                self.game = Game::new(answer);
                self.restored = false;
            }
        }
        self.day = day;
        self.streaks.rearm();
        self.modals.end_game_open = false;
        self.modals.end_game_due_ms = None;
        log::debug!("day {day} loaded (restored: {})", self.restored);
        Ok(())
    }

    /// Start of an action that writes; its failures replace the previous warning.
    fn begin_writes(&mut self) {
        self.storage_warning = None;
    }

    /// Keeps the first failure of the current action; successes never clear it.
    fn note_storage(&mut self, what: &str, result: Result<()>) {
        if let Err(err) = result {
            log::warn!("{what} not saved, keeping it in memory only: {err}");
            self.storage_warning.get_or_insert_with(|| err.to_string());
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn max_day(&self) -> u32 {
        self.max_day
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn streaks(&self) -> Streaks {
        self.streaks.streaks()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_saved_solution(&self) -> bool {
        self.restored
    }

    pub fn storage_warning(&self) -> Option<&str> {
        self.storage_warning.as_deref()
    }

    pub fn press_letter(&mut self, letter: char) {
        self.game.add_letter(letter);
    }

    pub fn press_delete(&mut self) {
        self.game.delete_letter();
    }

    pub fn press_enter(&mut self) -> GuessOutcome {
        let outcome = self.game.submit_guess(&self.words);
        if matches!(outcome, GuessOutcome::Won { .. } | GuessOutcome::Lost) {
            self.finish();
        }
        outcome
    }

    /// Route a `KeyboardEvent.key` value. Returns the guess outcome for Enter.
    pub fn press_key(&mut self, key: &str) -> Option<GuessOutcome> {
        match key {
            "Enter" => return Some(self.press_enter()),
            "Backspace" | "Delete" => self.press_delete(),
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if c.is_ascii_alphabetic() {
                        self.press_letter(c);
                    }
                }
            }
        }
        None
    }

    /// Game just resolved: persist, count the streak, queue the modal.
    fn finish(&mut self) {
        let state = self.game.state();
        let board = (state == GameState::Won).then(|| self.game.snapshot());
        log::info!(
            "day {} finished: {:?} after {} guesses",
            self.day,
            state,
            self.game.guesses_used()
        );
        self.begin_writes();
        let saved = self
            .records
            .record_result(self.day, state, board, &mut self.store);
        self.note_storage("result", saved);

        if self.streaks.record(state) {
            let saved = settings::save_streaks(&mut self.store, self.streaks.streaks());
            self.note_storage("streaks", saved);
        }

        if !self.restored {
            self.modals.end_game_due_ms = Some(self.config.end_game_delay_ms);
        }
    }

    /// Hand the pending end-of-game delay to a timer; `None` when nothing is queued.
    pub fn take_end_game_delay(&mut self) -> Option<u32> {
        self.modals.end_game_due_ms.take()
    }

    /// Share button pressed.
    pub fn open_end_game_modal(&mut self) {
        self.modals.end_game_open = true;
    }

    /// Timer queued for `day` fired. Ignored once the player has moved to another
    /// day or the game there is no longer finished.
    pub fn open_end_game_modal_for(&mut self, day: u32) -> bool {
        if self.day != day || !self.game.state().is_terminal() {
            log::debug!("dropping end-game modal queued for day {day}");
            return false;
        }
        self.open_end_game_modal();
        true
    }

    pub fn close_modal(&mut self) {
        self.modals.end_game_open = false;
    }

    /// Close the results and let the next resolution count towards streaks again.
    pub fn play_again(&mut self) {
        self.close_modal();
        self.streaks.rearm();
    }

    pub fn open_intro(&mut self) {
        self.modals.intro_open = true;
    }

    pub fn dismiss_intro(&mut self) {
        self.modals.intro_open = false;
        if self.prefs.first_time {
            self.prefs.first_time = false;
            self.begin_writes();
            let saved = self.prefs.save(&mut self.store);
            self.note_storage("preferences", saved);
        }
    }

    /// Jump to `day`. Unlike the address bar, out-of-range requests are refused.
    pub fn play_day(&mut self, day: u32) -> Result<()> {
        if !(1..=self.max_day).contains(&day) {
            return Err(ArchiveError::DayOutOfRange {
                day,
                max_day: self.max_day,
            });
        }
        log::info!("switching to day {day}");
        self.load_day(day)
    }

    pub fn navigate(&mut self, nav: Navigation) -> Result<u32> {
        let target = nav.target_day(self.day, self.max_day);
        self.play_day(target)?;
        Ok(target)
    }

    /// Forget the saved board for the current day so it can be replayed.
    pub fn clear_solution(&mut self) -> Result<()> {
        self.begin_writes();
        match self.records.clear_solution(self.day, &mut self.store) {
            Err(err @ ArchiveError::Storage(_)) => self.note_storage("cleared board", Err(err)),
            Err(err) => return Err(err),
            Ok(()) => self.note_storage("cleared board", Ok(())),
        }
        self.load_day(self.day)
    }

    pub fn toggle_dark_mode(&mut self) {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        self.begin_writes();
        let saved = self.prefs.save(&mut self.store);
        self.note_storage("preferences", saved);
    }

    pub fn toggle_colorblind_mode(&mut self) {
        self.prefs.colorblind_mode = !self.prefs.colorblind_mode;
        self.begin_writes();
        let saved = self.prefs.save(&mut self.store);
        self.note_storage("preferences", saved);
    }

    /// Address bar query for the current day.
    pub fn query(&self) -> String {
        puzzle::query_for(self.day)
    }

    pub fn header_title(&self) -> String {
        let symbol = match self.records.record(self.day).map(|r| r.state) {
            Some(GameState::Won) => "✔",
            Some(GameState::Lost) => "✘",
            _ => "",
        };
        format!("WORDLE ARCHIVE {} {}", self.day, symbol)
            .trim_end()
            .to_owned()
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        (1..=self.max_day).map(|d| self.records.menu_entry(d)).collect()
    }

    /// Everything the UI renders, in one serializable snapshot.
    pub fn view(&self) -> View {
        let (current_row, current_col) = self.game.cursor();
        let rows = self
            .game
            .rows()
            .iter()
            .enumerate()
            .map(|(r, row)| ViewRow {
                letters: row
                    .letters
                    .iter()
                    .map(|l| l.map(String::from).unwrap_or_default())
                    .collect(),
                cells: (0..row.letters.len())
                    .map(|c| self.game.cell_status(r, c))
                    .collect(),
            })
            .collect();
        let state = self.game.state();
        View {
            day: self.day,
            max_day: self.max_day,
            title: self.header_title(),
            root_class: self.prefs.root_class(),
            preferences: self.prefs,
            state,
            rows,
            current_row,
            current_col,
            invalid_submission: self.game.invalid_submission(),
            keyboard: self.game.letter_statuses().iter().collect(),
            is_solved: state == GameState::Won,
            game_disabled: state.is_terminal(),
            answer: state.is_terminal().then(|| self.game.answer().to_owned()),
            score: self.records.score(self.day),
            streaks: self.streaks.streaks(),
            end_game_open: self.modals.end_game_open,
            intro_open: self.modals.intro_open,
            storage_warning: self.storage_warning.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub letters: Vec<String>,
    pub cells: Vec<CellStatus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub day: u32,
    pub max_day: u32,
    pub title: String,
    pub root_class: &'static str,
    pub preferences: Preferences,
    pub state: GameState,
    pub rows: Vec<ViewRow>,
    pub current_row: usize,
    pub current_col: usize,
    pub invalid_submission: bool,
    pub keyboard: BTreeMap<char, LetterStatus>,
    pub is_solved: bool,
    pub game_disabled: bool,
    /// Revealed once the game is over.
    pub answer: Option<String>,
    pub score: String,
    pub streaks: Streaks,
    pub end_game_open: bool,
    pub intro_open: bool,
    pub storage_warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{GAME_STATE_LIST_KEY, MemoryStore};
    use crate::words::WordLists;
    use chrono::NaiveDate;

    fn words() -> WordLists {
        WordLists::new(
            ["cigar", "rebut", "crane"],
            ["slate", "adieu", "pious", "lymph", "bogus", "witch"],
        )
    }

    fn now() -> NaiveDateTime {
        // three days after the default origin, mid-morning
        NaiveDate::from_ymd_opt(2021, 6, 23)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn archive(query: Option<&str>) -> Archive<MemoryStore, WordLists> {
        Archive::new(MemoryStore::new(), words(), ArchiveConfig::default(), now(), query).unwrap()
    }

    fn type_word<S: KeyValueStore, W: WordSource>(a: &mut Archive<S, W>, word: &str) {
        for c in word.chars() {
            a.press_letter(c);
        }
    }

    #[test]
    fn opens_on_query_day_or_latest() {
        assert_eq!(archive(None).day(), 3);
        assert_eq!(archive(Some("?2")).day(), 2);
        assert_eq!(archive(Some("?9")).day(), 3);
        assert_eq!(archive(None).max_day(), 3);
        assert_eq!(archive(Some("?1")).query(), "?1");
    }

    #[test]
    fn winning_records_result_streak_and_modal() {
        let mut a = archive(None);
        type_word(&mut a, "slate");
        a.press_enter();
        type_word(&mut a, "crane");
        assert_eq!(a.press_enter(), GuessOutcome::Won { row: 1 });

        assert!(a.records().is_saved_solution(3));
        assert_eq!(a.records().score(3), "2/6");
        assert_eq!(a.streaks(), Streaks { current: 1, longest: 1 });
        assert_eq!(a.take_end_game_delay(), Some(500));
        assert_eq!(a.take_end_game_delay(), None);
        assert_eq!(a.header_title(), "WORDLE ARCHIVE 3 ✔");

        // extra Enter presses never double count
        a.press_enter();
        assert_eq!(a.streaks(), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn losing_resets_streak_and_keeps_no_board() {
        let mut store = MemoryStore::new();
        store.insert("current-streak", "4");
        store.insert("longest-streak", "9");
        let mut a = Archive::new(store, words(), ArchiveConfig::default(), now(), None).unwrap();
        for w in ["slate", "adieu", "pious", "lymph", "bogus", "witch"] {
            type_word(&mut a, w);
            a.press_enter();
        }
        assert_eq!(a.game().state(), GameState::Lost);
        let record = a.records().record(3).unwrap();
        assert_eq!(record.state, GameState::Lost);
        assert!(record.board.is_none());
        assert_eq!(a.streaks(), Streaks { current: 0, longest: 9 });
        assert_eq!(a.store().get("current-streak"), Some("0"));
        assert_eq!(a.header_title(), "WORDLE ARCHIVE 3 ✘");
        assert_eq!(a.view().answer.as_deref(), Some("CRANE"));
    }

    #[test]
    fn saved_solution_is_restored_without_modal() {
        let mut a = archive(Some("?1"));
        type_word(&mut a, "cigar");
        a.press_enter();
        let store = a.store().clone();

        let mut reopened =
            Archive::new(store, words(), ArchiveConfig::default(), now(), Some("?1")).unwrap();
        assert!(reopened.is_saved_solution());
        assert_eq!(reopened.game().state(), GameState::Won);
        assert_eq!(reopened.take_end_game_delay(), None);
        // viewing an old win does not count again
        assert_eq!(reopened.streaks(), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn clear_solution_allows_replay() {
        let mut a = archive(Some("?2"));
        type_word(&mut a, "rebut");
        a.press_enter();
        a.play_day(2).unwrap();
        assert!(a.is_saved_solution());

        a.clear_solution().unwrap();
        assert!(!a.is_saved_solution());
        assert!(a.records().is_cleared_solution(2));
        assert_eq!(a.game().state(), GameState::Playing);
        assert!(a.menu()[1].cleared);
    }

    #[test]
    fn navigation_stays_in_range() {
        let mut a = archive(None);
        assert_eq!(a.navigate(Navigation::Next).unwrap(), 3);
        assert_eq!(a.navigate(Navigation::First).unwrap(), 1);
        assert_eq!(a.navigate(Navigation::Previous).unwrap(), 1);
        assert_eq!(a.navigate(Navigation::Random { entropy: 5 }).unwrap(), 3);
        assert!(matches!(
            a.play_day(4),
            Err(ArchiveError::DayOutOfRange { day: 4, max_day: 3 })
        ));
        assert_eq!(a.day(), 3);
    }

    #[test]
    fn switching_days_resets_board() {
        let mut a = archive(None);
        type_word(&mut a, "sla");
        a.navigate(Navigation::Previous).unwrap();
        assert_eq!(a.game().cursor(), (0, 0));
        assert_eq!(a.game().answer(), "REBUT");
    }

    #[test]
    fn key_routing() {
        let mut a = archive(None);
        for key in ["c", "R", "Shift", "1", "a", "n", "e", "x"] {
            assert_eq!(a.press_key(key), None);
        }
        a.press_key("Backspace");
        a.press_key("e");
        assert_eq!(a.game().rows()[0].word(), "CRANE");
        assert_eq!(a.press_key("Enter"), Some(GuessOutcome::Won { row: 0 }));
    }

    #[test]
    fn invalid_guess_shows_in_view() {
        let mut a = archive(None);
        type_word(&mut a, "zzzzz");
        assert_eq!(a.press_enter(), GuessOutcome::Invalid);
        let view = a.view();
        assert!(view.invalid_submission);
        assert_eq!(view.rows[0].cells[0], CellStatus::Error);
        assert_eq!(view.current_col, 5);
        assert!(view.answer.is_none());
    }

    #[test]
    fn preferences_and_intro() {
        let mut a = archive(None);
        assert!(a.view().intro_open);
        a.dismiss_intro();
        a.toggle_dark_mode();
        let view = a.view();
        assert!(!view.intro_open);
        assert_eq!(view.root_class, "dark-bg");
        assert_eq!(a.store().get("first-time"), Some("false"));

        let reopened =
            Archive::new(a.store().clone(), words(), ArchiveConfig::default(), now(), None)
                .unwrap();
        assert!(!reopened.view().intro_open);
        assert!(reopened.preferences().dark_mode);
    }

    #[test]
    fn storage_failure_keeps_playing_in_memory() {
        let mut a = Archive::new(
            MemoryStore::read_only(Default::default()),
            words(),
            ArchiveConfig::default(),
            now(),
            None,
        )
        .unwrap();
        type_word(&mut a, "crane");
        assert_eq!(a.press_enter(), GuessOutcome::Won { row: 0 });
        assert!(a.storage_warning().is_some());
        assert!(a.records().is_saved_solution(3));
        assert!(a.store().get(GAME_STATE_LIST_KEY).is_none());
    }

    #[test]
    fn failed_result_write_is_not_masked_by_streak_write() {
        // the record document never fits, the streak counters always do
        let mut a = Archive::new(
            MemoryStore::with_value_limit(100),
            words(),
            ArchiveConfig::default(),
            now(),
            None,
        )
        .unwrap();
        assert!(a.storage_warning().is_some(), "initial write-back failure is reported");

        a.toggle_dark_mode();
        assert_eq!(a.storage_warning(), None);

        type_word(&mut a, "crane");
        assert_eq!(a.press_enter(), GuessOutcome::Won { row: 0 });
        assert!(a.store().get(GAME_STATE_LIST_KEY).is_none());
        assert_eq!(a.store().get("current-streak"), Some("1"));
        let warning = a.storage_warning().unwrap();
        assert!(warning.contains(GAME_STATE_LIST_KEY), "{warning}");
        assert_eq!(a.view().storage_warning.as_deref(), Some(warning));
    }

    #[test]
    fn end_game_modal_only_opens_on_its_own_day() {
        let mut a = archive(None);
        type_word(&mut a, "crane");
        a.press_enter();
        assert_eq!(a.take_end_game_delay(), Some(500));

        // player moved on before the timer fired
        a.navigate(Navigation::Previous).unwrap();
        assert!(!a.open_end_game_modal_for(3));
        assert!(!a.view().end_game_open);
        assert!(!a.open_end_game_modal_for(2), "day 2 is still being played");

        a.navigate(Navigation::Next).unwrap();
        assert!(a.open_end_game_modal_for(3));
        assert!(a.view().end_game_open);
    }

    #[test]
    fn view_serializes_for_the_ui() {
        let a = archive(None);
        let json = serde_json::to_value(a.view()).unwrap();
        assert_eq!(json["day"], 3);
        assert_eq!(json["rootClass"], "bg");
        assert_eq!(json["keyboard"]["A"], "unguessed");
        assert_eq!(json["rows"][0]["cells"][0], "not-guessed");
        assert_eq!(json["preferences"]["firstTime"], true);
    }
}
