//! Service layer: aggregation, chart layout, leaderboard and the dashboard
//! state container, plus upload handling for the server.
//!
//! Everything except [`upload`] is pure and synchronous; the dashboard client
//! runs it over the `data` array returned by the upload endpoint.

pub mod aggregation;
pub mod chart;
pub mod dashboard;
pub mod format;
pub mod leaderboard;

#[cfg(feature = "http-server")]
pub mod upload;

#[cfg(test)]
mod aggregation_tests;

pub use aggregation::{
    aggregate_by_day, aggregate_by_year, top_tracks_for_day, DayAggregate, DayAggregates,
    TrackStats, TrackSummary, YearFilter,
};
pub use chart::{ChartEvent, ChartInteraction, ChartLayout, DayDetail, Selection};
pub use dashboard::{Dashboard, DashboardError, DashboardState, DashboardView, LoadSummary};
pub use format::truncate_string;
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardError, YearOption, YearRanking};
