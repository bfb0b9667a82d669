//! "Top songs" leaderboard with a year selector.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::aggregation::{aggregate_by_year, years_present, YearFilter};
use super::format::{minutes_label, truncate_string};
use crate::models::{PlayEvent, TrackIdentity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("Year {0} is not offered by the selector")]
    UnknownYear(i32),
}

/// One entry of the year selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearOption {
    pub value: YearFilter,
    pub label: String,
}

/// One ranked track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub identity: TrackIdentity,
    pub display_name: String,
    pub playtime_ms: u64,
    pub minutes_label: String,
}

/// Ranked list for one selector option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRanking {
    pub year: YearFilter,
    pub entries: Vec<LeaderboardEntry>,
}

/// Selected-year state of the leaderboard.
///
/// Defaults to the most recent year in the dataset, or all time when the
/// dataset has no events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    selected: YearFilter,
    /// Descending.
    years: Vec<i32>,
    name_max_len: usize,
}

impl Leaderboard {
    pub fn new(events: &[PlayEvent], name_max_len: usize) -> Self {
        let years = years_present(events);
        let selected = years
            .first()
            .map_or(YearFilter::AllTime, |year| YearFilter::Year(*year));
        Self {
            selected,
            years,
            name_max_len,
        }
    }

    pub fn selected(&self) -> YearFilter {
        self.selected
    }

    /// "All time" followed by every year present, newest first.
    pub fn options(&self) -> Vec<YearOption> {
        std::iter::once(YearFilter::AllTime)
            .chain(self.years.iter().map(|year| YearFilter::Year(*year)))
            .map(|value| YearOption {
                value,
                label: value.to_string(),
            })
            .collect()
    }

    pub fn offers(&self, filter: YearFilter) -> bool {
        match filter {
            YearFilter::AllTime => true,
            YearFilter::Year(year) => self.years.contains(&year),
        }
    }

    /// Change the selected year. Values the selector does not offer are
    /// rejected and leave the selection unchanged.
    pub fn select(&mut self, filter: YearFilter) -> Result<(), LeaderboardError> {
        if !self.offers(filter) {
            return Err(LeaderboardError::UnknownYear(filter.value()));
        }
        debug!(year = filter.value(), "Leaderboard year selected");
        self.selected = filter;
        Ok(())
    }

    /// Ranked list for the selected year.
    pub fn entries(&self, events: &[PlayEvent]) -> Vec<LeaderboardEntry> {
        rank_by_playtime(events, self.selected, self.name_max_len)
    }

    /// Ranked lists for every option, in selector order.
    pub fn rankings(&self, events: &[PlayEvent]) -> Vec<YearRanking> {
        self.options()
            .into_iter()
            .map(|option| YearRanking {
                year: option.value,
                entries: rank_by_playtime(events, option.value, self.name_max_len),
            })
            .collect()
    }
}

/// Tracks of `year` ordered by total playtime, descending; ties by name.
pub fn rank_by_playtime(
    events: &[PlayEvent],
    year: YearFilter,
    name_max_len: usize,
) -> Vec<LeaderboardEntry> {
    let mut totals: Vec<(TrackIdentity, u64)> = aggregate_by_year(events, year).into_iter().collect();
    totals.sort_by(|(a_id, a_ms), (b_id, b_ms)| b_ms.cmp(a_ms).then_with(|| a_id.display_cmp(b_id)));

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (identity, playtime_ms))| LeaderboardEntry {
            rank: i + 1,
            display_name: truncate_string(identity.name(), name_max_len),
            identity,
            playtime_ms,
            minutes_label: minutes_label(playtime_ms),
        })
        .collect()
}
