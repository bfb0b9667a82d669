//! Aggregation of play events into per-day and per-year views.
//!
//! Everything here is a pure function of its input. The day view backs the
//! chart and its detail panel, the year view backs the leaderboard.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PlayEvent, TrackIdentity};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Convert a playtime to (fractional) minutes.
pub fn ms_to_minutes(ms: u64) -> f64 {
    ms as f64 / MS_PER_MINUTE
}

/// Play count and playtime of one track on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub plays: u64,
    pub playtime_ms: u64,
}

/// Rollup of a single calendar date.
///
/// `total_playtime_ms` always equals the sum of `tracks[*].playtime_ms`.
/// Playtimes saturate at `u64::MAX` instead of overflowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAggregate {
    pub date: NaiveDate,
    pub total_playtime_ms: u64,
    pub tracks: HashMap<TrackIdentity, TrackStats>,
}

impl DayAggregate {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_playtime_ms: 0,
            tracks: HashMap::new(),
        }
    }

    fn record(&mut self, event: &PlayEvent) {
        let stats = self.tracks.entry(event.identity.clone()).or_default();
        stats.plays += 1;
        stats.playtime_ms = stats.playtime_ms.saturating_add(event.ms_played);
        self.total_playtime_ms = self.total_playtime_ms.saturating_add(event.ms_played);
    }

    pub fn minutes(&self) -> f64 {
        ms_to_minutes(self.total_playtime_ms)
    }

    pub fn plays(&self) -> u64 {
        self.tracks.values().map(|t| t.plays).sum()
    }
}

/// All day rollups of a dataset, keyed and ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayAggregates {
    days: BTreeMap<NaiveDate, DayAggregate>,
}

impl DayAggregates {
    pub fn get(&self, date: NaiveDate) -> Option<&DayAggregate> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = &DayAggregate> + '_ {
        self.days.values()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Minutes played on `date`, if the date has an entry.
    pub fn minutes(&self, date: NaiveDate) -> Option<f64> {
        self.get(date).map(DayAggregate::minutes)
    }

    pub fn max_daily_minutes(&self) -> f64 {
        self.days
            .values()
            .map(DayAggregate::minutes)
            .fold(0.0, f64::max)
    }

    pub fn total_playtime_ms(&self) -> u64 {
        self.days
            .values()
            .fold(0u64, |acc, d| acc.saturating_add(d.total_playtime_ms))
    }
}

/// Build the day-indexed aggregate of `events`.
pub fn aggregate_by_day(events: &[PlayEvent]) -> DayAggregates {
    let mut days: BTreeMap<NaiveDate, DayAggregate> = BTreeMap::new();
    for event in events {
        days.entry(event.date)
            .or_insert_with(|| DayAggregate::new(event.date))
            .record(event);
    }
    DayAggregates { days }
}

/// One row of a ranked track list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub identity: TrackIdentity,
    pub plays: u64,
    pub playtime_ms: u64,
}

/// The `n` most played tracks of `date`.
///
/// Ordered by play count, then playtime, both descending; remaining ties are
/// ordered by name so the result is deterministic. Returns an empty list when
/// the date has no entry.
pub fn top_tracks_for_day(aggregates: &DayAggregates, date: NaiveDate, n: usize) -> Vec<TrackSummary> {
    let Some(day) = aggregates.get(date) else {
        return Vec::new();
    };

    let mut tracks: Vec<TrackSummary> = day
        .tracks
        .iter()
        .map(|(identity, stats)| TrackSummary {
            identity: identity.clone(),
            plays: stats.plays,
            playtime_ms: stats.playtime_ms,
        })
        .collect();

    tracks.sort_by(|a, b| {
        b.plays
            .cmp(&a.plays)
            .then_with(|| b.playtime_ms.cmp(&a.playtime_ms))
            .then_with(|| a.identity.display_cmp(&b.identity))
    });
    tracks.truncate(n);
    tracks
}

/// Year restriction of the leaderboard. The wire value `0` means all time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum YearFilter {
    AllTime,
    Year(i32),
}

impl YearFilter {
    pub const ALL_TIME_VALUE: i32 = 0;

    pub fn value(self) -> i32 {
        match self {
            YearFilter::AllTime => Self::ALL_TIME_VALUE,
            YearFilter::Year(year) => year,
        }
    }

    pub fn matches(self, year: i32) -> bool {
        match self {
            YearFilter::AllTime => true,
            YearFilter::Year(wanted) => wanted == year,
        }
    }
}

impl From<i32> for YearFilter {
    fn from(value: i32) -> Self {
        if value == Self::ALL_TIME_VALUE {
            YearFilter::AllTime
        } else {
            YearFilter::Year(value)
        }
    }
}

impl From<YearFilter> for i32 {
    fn from(filter: YearFilter) -> Self {
        filter.value()
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::AllTime => f.write_str("All time"),
            YearFilter::Year(year) => write!(f, "{}", year),
        }
    }
}

/// Total playtime per track for the selected year.
///
/// Tracks without a matching event are absent rather than present with zero.
pub fn aggregate_by_year(events: &[PlayEvent], year: YearFilter) -> HashMap<TrackIdentity, u64> {
    let mut totals: HashMap<TrackIdentity, u64> = HashMap::new();
    for event in events.iter().filter(|e| year.matches(e.year())) {
        let total = totals.entry(event.identity.clone()).or_insert(0);
        *total = total.saturating_add(event.ms_played);
    }
    totals
}

/// Distinct years with at least one event, most recent first.
pub fn years_present(events: &[PlayEvent]) -> Vec<i32> {
    let years: BTreeSet<i32> = events.iter().map(PlayEvent::year).collect();
    years.into_iter().rev().collect()
}
