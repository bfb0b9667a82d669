//! Text helpers shared by the chart detail panel and the leaderboard.

use chrono::NaiveDate;

use super::aggregation::ms_to_minutes;

const ELLIPSIS: &str = "...";

/// Shorten `s` to at most `max_len` characters, ending in `"..."` when cut.
///
/// Lengths count Unicode scalar values, so multi-byte names are never split
/// inside a character. With `max_len < 4` there is no room for content plus
/// the marker and the string is simply cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return s.chars().take(max_len).collect();
    }
    let mut out: String = s.chars().take(max_len - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Whole minutes, rounded half away from zero.
pub fn rounded_minutes(ms: u64) -> u64 {
    ms_to_minutes(ms).round() as u64
}

/// `"42 min"`.
pub fn minutes_label(ms: u64) -> String {
    format!("{} min", rounded_minutes(ms))
}

/// `"1 play"` / `"3 plays"`.
pub fn plays_label(plays: u64) -> String {
    if plays > 1 {
        format!("{} plays", plays)
    } else {
        format!("{} play", plays)
    }
}

/// `"Jan 1, 2024"`.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
