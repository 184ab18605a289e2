//! Guess evaluation for a single day's puzzle.
//!
//! A [`Game`] owns the 6x5 board, the typing cursor and the keyboard feedback.
//! It knows nothing about storage or which day it belongs to; the archive wires
//! those in.

use serde::{Deserialize, Serialize};

use crate::config::{BOARD_ROWS, WORD_LEN};
use crate::words::WordSource;

/// Board as persisted: six rows of five single-letter strings, `""` when unfilled.
pub type SavedBoard = [[String; WORD_LEN]; BOARD_ROWS];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameState::Playing)
    }
}

/// Best-known classification of a keyboard letter. Ordered so that a status only
/// ever moves up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    #[default]
    Unguessed,
    Gray,
    Yellow,
    Green,
}

/// Per-cell feedback shown in the guess grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellStatus {
    Correct,
    Partial,
    Incorrect,
    /// Active row after a rejected submission.
    Error,
    NotGuessed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    pub letters: [Option<char>; WORD_LEN],
    pub submitted: bool,
}

impl Row {
    pub fn word(&self) -> String {
        self.letters.iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.iter().all(Option::is_none)
    }
}

/// Keyboard feedback for A..=Z.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LetterStatuses([LetterStatus; 26]);

impl LetterStatuses {
    fn slot(letter: char) -> Option<usize> {
        let upper = letter.to_ascii_uppercase();
        upper
            .is_ascii_uppercase()
            .then(|| (upper as u8 - b'A') as usize)
    }

    pub fn get(&self, letter: char) -> LetterStatus {
        Self::slot(letter).map_or(LetterStatus::Unguessed, |i| self.0[i])
    }

    /// Fold one submitted word into the map. Green letters are never revisited.
    pub fn apply_guess(&mut self, word: &str, answer: &str) {
        let answer: Vec<char> = answer.chars().collect();
        for (pos, letter) in word.chars().enumerate() {
            let Some(slot) = Self::slot(letter) else { continue };
            if self.0[slot] == LetterStatus::Green {
                continue;
            }
            self.0[slot] = if answer.get(pos) == Some(&letter) {
                LetterStatus::Green
            } else if answer.contains(&letter) {
                LetterStatus::Yellow
            } else {
                LetterStatus::Gray
            };
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, LetterStatus)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, status)| ((b'A' + i as u8) as char, *status))
    }
}

/// What happened on Enter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Not five letters or not in the dictionary; nothing moved.
    Invalid,
    /// Accepted; typing continues on `next_row`.
    Continue { next_row: usize },
    Won { row: usize },
    Lost,
    /// Game already over.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct Game {
    answer: String,
    rows: [Row; BOARD_ROWS],
    current_row: usize,
    current_col: usize,
    letter_statuses: LetterStatuses,
    invalid_submission: bool,
    state: GameState,
}

impl Game {
    /// Fresh game; `answer` is expected uppercase.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into().to_ascii_uppercase(),
            rows: Default::default(),
            current_row: 0,
            current_col: 0,
            letter_statuses: LetterStatuses::default(),
            invalid_submission: false,
            state: GameState::Playing,
        }
    }

    /// Rebuild a solved game from a saved board.
    pub fn restore(answer: impl Into<String>, saved: &SavedBoard) -> Self {
        let mut game = Self::new(answer);
        let mut last_filled = 0;
        for (idx, (row, saved_row)) in game.rows.iter_mut().zip(saved).enumerate() {
            for (cell, letter) in row.letters.iter_mut().zip(saved_row) {
                *cell = letter.chars().next().map(|c| c.to_ascii_uppercase());
            }
            if !row.is_empty() {
                row.submitted = true;
                last_filled = idx;
            }
        }
        for row in game.rows.iter().filter(|r| r.submitted) {
            game.letter_statuses.apply_guess(&row.word(), &game.answer);
        }
        game.current_row = last_filled;
        game.current_col = WORD_LEN;
        game.state = GameState::Won;
        game
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn rows(&self) -> &[Row; BOARD_ROWS] {
        &self.rows
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.current_row, self.current_col)
    }

    pub fn letter_statuses(&self) -> &LetterStatuses {
        &self.letter_statuses
    }

    pub fn invalid_submission(&self) -> bool {
        self.invalid_submission
    }

    /// Type a letter into the active row. Non-letters and a full row are no-ops.
    pub fn add_letter(&mut self, letter: char) {
        self.invalid_submission = false;
        if self.state.is_terminal() || !letter.is_ascii_alphabetic() {
            return;
        }
        if self.current_col >= WORD_LEN {
            return;
        }
        self.rows[self.current_row].letters[self.current_col] = Some(letter.to_ascii_uppercase());
        self.current_col += 1;
    }

    pub fn delete_letter(&mut self) {
        self.invalid_submission = false;
        if self.state.is_terminal() || self.current_col == 0 {
            return;
        }
        self.current_col -= 1;
        self.rows[self.current_row].letters[self.current_col] = None;
    }

    /// Submit the active row against `words`.
    pub fn submit_guess(&mut self, words: &dyn WordSource) -> GuessOutcome {
        if self.state.is_terminal() {
            return GuessOutcome::Ignored;
        }
        let word = self.rows[self.current_row].word();
        if !words.is_valid_word(&word) {
            self.invalid_submission = true;
            return GuessOutcome::Invalid;
        }

        let row = self.current_row;
        self.rows[row].submitted = true;
        self.letter_statuses.apply_guess(&word, &self.answer);

        if word == self.answer {
            self.state = GameState::Won;
            GuessOutcome::Won { row }
        } else if row + 1 == BOARD_ROWS {
            self.state = GameState::Lost;
            GuessOutcome::Lost
        } else {
            self.current_row = row + 1;
            self.current_col = 0;
            GuessOutcome::Continue { next_row: row + 1 }
        }
    }

    /// Grid feedback for one cell.
    pub fn cell_status(&self, row: usize, col: usize) -> CellStatus {
        let Some(r) = self.rows.get(row) else {
            return CellStatus::NotGuessed;
        };
        if r.submitted {
            let letter = r.letters.get(col).copied().flatten();
            return match letter {
                Some(c) if self.answer.chars().nth(col) == Some(c) => CellStatus::Correct,
                Some(c) if self.answer.contains(c) => CellStatus::Partial,
                _ => CellStatus::Incorrect,
            };
        }
        if self.invalid_submission && row == self.current_row {
            CellStatus::Error
        } else {
            CellStatus::NotGuessed
        }
    }

    /// Board in persisted form.
    pub fn snapshot(&self) -> SavedBoard {
        std::array::from_fn(|r| {
            std::array::from_fn(|c| self.rows[r].letters[c].map(String::from).unwrap_or_default())
        })
    }

    /// Rows holding at least one letter.
    pub fn guesses_used(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordLists;

    fn words() -> WordLists {
        WordLists::new(
            ["crane"],
            ["crate", "slate", "adieu", "pious", "lymph", "bogus", "witch"],
        )
    }

    fn type_word(game: &mut Game, word: &str) {
        for c in word.chars() {
            game.add_letter(c);
        }
    }

    #[test]
    fn crate_against_crane() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "crate");
        assert_eq!(game.submit_guess(&words()), GuessOutcome::Continue { next_row: 1 });

        let s = game.letter_statuses();
        assert_eq!(s.get('C'), LetterStatus::Green);
        assert_eq!(s.get('R'), LetterStatus::Green);
        assert_eq!(s.get('A'), LetterStatus::Green);
        assert_eq!(s.get('T'), LetterStatus::Gray);
        assert_eq!(s.get('E'), LetterStatus::Green);
        assert_eq!(s.get('Z'), LetterStatus::Unguessed);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.cursor(), (1, 0));
        assert!(game.rows()[0].submitted);
    }

    #[test]
    fn invalid_word_sets_flag_without_moving() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "qqqqq");
        let before = game.rows().clone();
        assert_eq!(game.submit_guess(&words()), GuessOutcome::Invalid);
        assert!(game.invalid_submission());
        assert_eq!(game.rows(), &before);
        assert_eq!(game.cursor(), (0, 5));
        assert_eq!(game.cell_status(0, 0), CellStatus::Error);

        // next keystroke clears the flag
        game.delete_letter();
        assert!(!game.invalid_submission());
        assert_eq!(game.cell_status(0, 0), CellStatus::NotGuessed);
    }

    #[test]
    fn short_word_is_invalid() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "cra");
        assert_eq!(game.submit_guess(&words()), GuessOutcome::Invalid);
        assert_eq!(game.cursor(), (0, 3));
    }

    #[test]
    fn winning_guess_ends_game() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "slate");
        game.submit_guess(&words());
        type_word(&mut game, "crane");
        assert_eq!(game.submit_guess(&words()), GuessOutcome::Won { row: 1 });
        assert_eq!(game.state(), GameState::Won);

        // no further rows become active
        type_word(&mut game, "adieu");
        assert_eq!(game.cursor(), (1, 5));
        assert!(game.rows()[2].is_empty());
        assert_eq!(game.submit_guess(&words()), GuessOutcome::Ignored);
    }

    #[test]
    fn six_misses_lose() {
        let mut game = Game::new("CRANE");
        let guesses = ["crate", "slate", "adieu", "pious", "lymph", "bogus"];
        for (i, g) in guesses.iter().enumerate() {
            type_word(&mut game, g);
            let outcome = game.submit_guess(&words());
            if i < 5 {
                assert_eq!(outcome, GuessOutcome::Continue { next_row: i + 1 });
            } else {
                assert_eq!(outcome, GuessOutcome::Lost);
            }
        }
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.guesses_used(), 6);
    }

    #[test]
    fn green_is_never_downgraded() {
        let mut statuses = LetterStatuses::default();
        statuses.apply_guess("CRATE", "CRANE");
        assert_eq!(statuses.get('A'), LetterStatus::Green);
        // A guessed in position 0 would be yellow on its own
        statuses.apply_guess("ADIEU", "CRANE");
        assert_eq!(statuses.get('A'), LetterStatus::Green);
        assert_eq!(statuses.get('E'), LetterStatus::Green);
        assert_eq!(statuses.get('D'), LetterStatus::Gray);
    }

    #[test]
    fn add_and_delete_respect_bounds() {
        let mut game = Game::new("CRANE");
        game.delete_letter();
        assert_eq!(game.cursor(), (0, 0));
        type_word(&mut game, "abcdefg");
        assert_eq!(game.cursor(), (0, 5));
        assert_eq!(game.rows()[0].word(), "ABCDE");
        game.add_letter('1');
        game.delete_letter();
        assert_eq!(game.rows()[0].word(), "ABCD");
        assert_eq!(game.cursor(), (0, 4));
    }

    #[test]
    fn cell_statuses_after_submit() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "adieu");
        game.submit_guess(&words());
        assert_eq!(game.cell_status(0, 0), CellStatus::Partial);
        assert_eq!(game.cell_status(0, 1), CellStatus::Incorrect);
        assert_eq!(game.cell_status(0, 3), CellStatus::Partial);
        assert_eq!(game.cell_status(1, 0), CellStatus::NotGuessed);
    }

    #[test]
    fn snapshot_and_restore() {
        let mut game = Game::new("CRANE");
        type_word(&mut game, "slate");
        game.submit_guess(&words());
        type_word(&mut game, "crane");
        game.submit_guess(&words());

        let saved = game.snapshot();
        assert_eq!(saved[0][0], "S");
        assert_eq!(saved[2][0], "");

        let restored = Game::restore("CRANE", &saved);
        assert_eq!(restored.state(), GameState::Won);
        assert_eq!(restored.guesses_used(), 2);
        assert!(restored.rows()[1].submitted);
        assert!(!restored.rows()[2].submitted);
        assert_eq!(restored.letter_statuses().get('S'), LetterStatus::Gray);
        assert_eq!(restored.letter_statuses().get('A'), LetterStatus::Green);
        assert_eq!(restored.cell_status(1, 4), CellStatus::Correct);
    }
}
