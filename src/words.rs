//! Answer list and guess dictionary.
//!
//! Both lists are embedded at build time (one lowercase word per line) and parsed
//! once on first use. The dictionary accepts every answer as a guess as well.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::WORD_LEN;
use crate::error::{ArchiveError, Result};

const ANSWERS_RAW: &str = include_str!("../data/answers.txt");
const GUESSES_RAW: &str = include_str!("../data/words.txt");

fn parse_list(raw: &'static str) -> impl Iterator<Item = &'static str> {
    raw.lines().map(str::trim).filter(|w| !w.is_empty())
}

/// Answer for each day, in day order (`answers()[day - 1]`).
pub fn answers() -> &'static [&'static str] {
    static ANSWERS: OnceLock<Vec<&'static str>> = OnceLock::new();
    ANSWERS.get_or_init(|| parse_list(ANSWERS_RAW).collect())
}

fn dictionary() -> &'static HashSet<&'static str> {
    static DICTIONARY: OnceLock<HashSet<&'static str>> = OnceLock::new();
    DICTIONARY.get_or_init(|| parse_list(ANSWERS_RAW).chain(parse_list(GUESSES_RAW)).collect())
}

/// Source of daily answers and accepted guesses.
///
/// The archive only ever talks to this trait so tests can swap in tiny fixtures.
pub trait WordSource {
    /// Lowercase answer for a 1-based day, if one exists.
    fn answer_for(&self, day: u32) -> Option<&str>;
    /// Number of days with an answer.
    fn answer_count(&self) -> u32;
    /// Dictionary membership for a lowercase word.
    fn contains(&self, word: &str) -> bool;

    /// Uppercase answer for `day`.
    fn answer(&self, day: u32) -> Result<String> {
        self.answer_for(day)
            .map(str::to_ascii_uppercase)
            .ok_or(ArchiveError::NoAnswer(day))
    }

    /// A guess is valid when it has five letters and the dictionary knows it
    /// (case-insensitive).
    fn is_valid_word(&self, word: &str) -> bool {
        word.chars().count() == WORD_LEN && self.contains(&word.to_ascii_lowercase())
    }
}

/// The lists shipped with the crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedWords;

impl WordSource for EmbeddedWords {
    fn answer_for(&self, day: u32) -> Option<&str> {
        let idx = (day as usize).checked_sub(1)?;
        answers().get(idx).copied()
    }

    fn answer_count(&self) -> u32 {
        answers().len() as u32
    }

    fn contains(&self, word: &str) -> bool {
        dictionary().contains(word)
    }
}

/// Caller-provided lists; used by tests and by embedders with their own data.
#[derive(Clone, Debug, Default)]
pub struct WordLists {
    answers: Vec<String>,
    dictionary: HashSet<String>,
}

impl WordLists {
    pub fn new<A, G>(answers: A, guesses: G) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        let answers: Vec<String> = answers
            .into_iter()
            .map(|w| w.into().to_ascii_lowercase())
            .collect();
        let mut dictionary: HashSet<String> = guesses
            .into_iter()
            .map(|w| w.into().to_ascii_lowercase())
            .collect();
        dictionary.extend(answers.iter().cloned());
        Self { answers, dictionary }
    }
}

impl WordSource for WordLists {
    fn answer_for(&self, day: u32) -> Option<&str> {
        let idx = (day as usize).checked_sub(1)?;
        self.answers.get(idx).map(String::as_str)
    }

    fn answer_count(&self) -> u32 {
        self.answers.len() as u32
    }

    fn contains(&self, word: &str) -> bool {
        self.dictionary.contains(word)
    }
}
