//! Play-event records and their validation.
//!
//! Uploaded history files are trusted to be JSON arrays, but nothing else about
//! their content is. Every element goes through [`ingest`], which turns it into
//! a typed [`PlayEvent`] or quarantines it as a [`RecordRejection`].

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Display name of the sentinel identity.
pub const UNKNOWN_TRACK_NAME: &str = "Unknown";

/// One play record exactly as found in an exported listening-history file.
///
/// Export files use snake-case field names; the camel-case aliases are
/// accepted as well. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlayback {
    #[serde(alias = "timestamp")]
    pub ts: String,
    #[serde(alias = "msPlayed", default)]
    pub ms_played: u64,
    #[serde(alias = "trackName", default)]
    pub master_metadata_track_name: Option<String>,
    #[serde(alias = "episodeName", default)]
    pub episode_name: Option<String>,
}

impl RawPlayback {
    /// Record for a music track.
    pub fn track(ts: impl Into<String>, ms_played: u64, track: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            ms_played,
            master_metadata_track_name: Some(track.into()),
            episode_name: None,
        }
    }

    /// Record for a podcast episode.
    pub fn episode(ts: impl Into<String>, ms_played: u64, episode: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            ms_played,
            master_metadata_track_name: None,
            episode_name: Some(episode.into()),
        }
    }
}

/// The key plays are grouped by: the track name, falling back to the episode
/// name, falling back to [`TrackIdentity::Unknown`].
///
/// A track and an episode with the same name are the same identity. `Unknown`
/// is its own variant so a real track titled "Unknown" is never merged with
/// unidentified plays.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum TrackIdentity {
    Named(String),
    Unknown,
}

/// Empty or blank names count as absent.
fn present(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

impl TrackIdentity {
    /// Resolve the effective identity.
    pub fn resolve(track: Option<&str>, episode: Option<&str>) -> Self {
        present(track)
            .or_else(|| present(episode))
            .map_or(TrackIdentity::Unknown, |name| {
                TrackIdentity::Named(name.to_string())
            })
    }

    pub fn named(name: impl Into<String>) -> Self {
        TrackIdentity::Named(name.into())
    }

    /// Name shown to the user.
    pub fn name(&self) -> &str {
        match self {
            TrackIdentity::Named(name) => name,
            TrackIdentity::Unknown => UNKNOWN_TRACK_NAME,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TrackIdentity::Unknown)
    }

    /// Ordering used to break ties in ranked lists: by display name, then
    /// named before unknown.
    pub fn display_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name().cmp(other.name()).then_with(|| self.cmp(other))
    }
}

impl fmt::Display for TrackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derive the calendar-date key of a timestamp.
///
/// The date is the literal text before the `T` separator. No timezone
/// conversion is applied, so plays are bucketed by the date encoded in the
/// source timestamp rather than the viewer's local date.
pub fn date_key(timestamp: &str) -> Option<NaiveDate> {
    let date_part = timestamp.split('T').next()?;
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()
}

/// A validated play event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayEvent {
    pub timestamp: String,
    pub date: NaiveDate,
    pub ms_played: u64,
    pub identity: TrackIdentity,
}

impl PlayEvent {
    /// Calendar year of the event, in the same timezone-naive sense as [`date_key`].
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl TryFrom<RawPlayback> for PlayEvent {
    type Error = RejectionReason;

    fn try_from(raw: RawPlayback) -> Result<Self, Self::Error> {
        let date =
            date_key(&raw.ts).ok_or_else(|| RejectionReason::InvalidTimestamp(raw.ts.clone()))?;
        let identity = TrackIdentity::resolve(
            raw.master_metadata_track_name.as_deref(),
            raw.episode_name.as_deref(),
        );
        Ok(PlayEvent {
            timestamp: raw.ts,
            date,
            ms_played: raw.ms_played,
            identity,
        })
    }
}

/// Why a record was quarantined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Not an object, or a field of the wrong type (e.g. negative `ms_played`).
    #[error("record does not match the play-event schema: {0}")]
    InvalidShape(String),

    /// The timestamp has no `YYYY-MM-DD` date before its time separator.
    #[error("unparsable timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// A record that was left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRejection {
    /// Position in the uploaded list.
    pub index: usize,
    pub reason: RejectionReason,
}

/// The single active dataset: every valid event plus what was quarantined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub events: Vec<PlayEvent>,
    pub rejected: Vec<RecordRejection>,
}

impl Dataset {
    pub fn from_events(events: Vec<PlayEvent>) -> Self {
        Self {
            events,
            rejected: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_playtime_ms(&self) -> u64 {
        self.events
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.ms_played))
    }
}

/// Validate the `data` array of an upload response.
///
/// Never fails as a whole: records that do not fit the schema are collected in
/// [`Dataset::rejected`] and summarized in a single warning.
pub fn ingest(values: Vec<Value>) -> Dataset {
    let mut dataset = Dataset::default();

    for (index, value) in values.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawPlayback>(value)
            .map_err(|e| RejectionReason::InvalidShape(e.to_string()))
            .and_then(PlayEvent::try_from);

        match parsed {
            Ok(event) => dataset.events.push(event),
            Err(reason) => {
                debug!(index, %reason, "Quarantined play record");
                dataset.rejected.push(RecordRejection { index, reason });
            }
        }
    }

    if !dataset.rejected.is_empty() {
        warn!(
            rejected = dataset.rejected.len(),
            accepted = dataset.events.len(),
            "Some play records were skipped during ingestion"
        );
    }

    dataset
}
