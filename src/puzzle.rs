//! Puzzle selection: which archived day is playable and which one is active.

use chrono::{NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Days elapsed since `origin` (local midnight), rounded up.
///
/// One second past midnight already counts as the next day, so on the origin
/// date itself this yields 1 for any time after midnight.
pub fn elapsed_days(origin: NaiveDate, now: NaiveDateTime) -> u32 {
    let start = origin.and_time(chrono::NaiveTime::MIN);
    let secs = (now - start).num_seconds().abs();
    let days = secs / SECONDS_PER_DAY + i64::from(secs % SECONDS_PER_DAY != 0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Highest playable day: elapsed days, never beyond the last known answer and never
/// below 1.
pub fn max_day(origin: NaiveDate, now: NaiveDateTime, answer_count: u32) -> u32 {
    elapsed_days(origin, now).min(answer_count).max(1)
}

/// Resolve the address bar query (`?123` or `123`) to a day.
///
/// Any finite number is accepted and truncated to its leading integer digits, so
/// `?5.5` is day 5 and `?1e1` is day 1. Missing, non-numeric or out-of-range
/// input silently falls back to `max_day`.
pub fn resolve_day(query: Option<&str>, max_day: u32) -> u32 {
    let Some(raw) = query else { return max_day };
    let raw = raw.strip_prefix('?').unwrap_or(raw).trim();
    if !raw.parse::<f64>().is_ok_and(f64::is_finite) {
        return max_day;
    }
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    match unsigned[..end].parse::<u32>() {
        Ok(day) if (1..=max_day).contains(&day) => day,
        _ => max_day,
    }
}

/// Address bar query string reflecting `day`.
pub fn query_for(day: u32) -> String {
    format!("?{day}")
}

/// Day-picker buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
    /// Uniform pick over `[1, max_day]` from caller-supplied entropy.
    Random { entropy: u64 },
}

impl Navigation {
    /// Parse a button name as sent from the UI. `Random` gets its entropy later.
    pub fn from_name(name: &str, entropy: u64) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "first" => Some(Self::First),
            "previous" | "prev" => Some(Self::Previous),
            "next" => Some(Self::Next),
            "last" => Some(Self::Last),
            "random" => Some(Self::Random { entropy }),
            _ => None,
        }
    }

    /// Target day, clamped to `[1, max_day]`.
    pub fn target_day(self, current: u32, max_day: u32) -> u32 {
        let max_day = max_day.max(1);
        let day = match self {
            Self::First => 1,
            Self::Previous => current.saturating_sub(1),
            Self::Next => current.saturating_add(1),
            Self::Last => max_day,
            Self::Random { entropy } => (entropy % u64::from(max_day)) as u32 + 1,
        };
        day.clamp(1, max_day)
    }
}
