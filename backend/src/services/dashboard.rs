//! State container for the dashboard.
//!
//! The dashboard owns the single active dataset and all transient UI state:
//! the selected chart day and the selected leaderboard year. Input events are
//! handled one at a time, each to completion. Renderers only ever see the
//! read-only [`DashboardView`].

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use super::aggregation::{aggregate_by_day, DayAggregates, YearFilter};
use super::chart::{
    day_detail, remap_wheel, ChartEvent, ChartInteraction, ChartLayout, DayDetail,
    HorizontalScroll, Selection,
};
use super::format::rounded_minutes;
use super::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardError, YearOption, YearRanking};
use crate::config::DashboardConfig;
use crate::models::{ingest, Dataset};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("No dataset has been loaded yet")]
    NotLoaded,

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

/// Everything derived from one dataset.
#[derive(Debug, Clone)]
pub struct LoadedDashboard {
    dataset: Dataset,
    days: DayAggregates,
    layout: Option<ChartLayout>,
    interaction: ChartInteraction,
    leaderboard: Leaderboard,
}

impl LoadedDashboard {
    fn build(dataset: Dataset, config: &DashboardConfig) -> Self {
        let days = aggregate_by_day(&dataset.events);
        let layout = ChartLayout::build(&days, config);
        let leaderboard = Leaderboard::new(&dataset.events, config.leaderboard_name_max_len);
        Self {
            dataset,
            days,
            layout,
            interaction: ChartInteraction::default(),
            leaderboard,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn days(&self) -> &DayAggregates {
        &self.days
    }

    pub fn layout(&self) -> Option<&ChartLayout> {
        self.layout.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub enum DashboardState {
    /// No dataset yet; the upload form is shown.
    #[default]
    AwaitingUpload,
    Loaded(Box<LoadedDashboard>),
}

/// Counts reported after a dataset was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub days: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    config: DashboardConfig,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            state: DashboardState::AwaitingUpload,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, DashboardState::Loaded(_))
    }

    fn loaded(&self) -> Option<&LoadedDashboard> {
        match &self.state {
            DashboardState::Loaded(loaded) => Some(&**loaded),
            DashboardState::AwaitingUpload => None,
        }
    }

    fn loaded_mut(&mut self) -> Option<&mut LoadedDashboard> {
        match &mut self.state {
            DashboardState::Loaded(loaded) => Some(&mut **loaded),
            DashboardState::AwaitingUpload => None,
        }
    }

    /// Replace the active dataset with the `data` array of an upload response.
    pub fn load(&mut self, values: Vec<Value>) -> LoadSummary {
        self.load_dataset(ingest(values))
    }

    /// Replace the active dataset. Selection and year state start over.
    pub fn load_dataset(&mut self, dataset: Dataset) -> LoadSummary {
        let loaded = LoadedDashboard::build(dataset, &self.config);
        let summary = LoadSummary {
            accepted: loaded.dataset.events.len(),
            rejected: loaded.dataset.rejected.len(),
            days: loaded.days.len(),
        };
        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            days = summary.days,
            "Dataset loaded"
        );
        self.state = DashboardState::Loaded(Box::new(loaded));
        summary
    }

    /// Record a failed upload. The current state is kept as is; there is no retry.
    pub fn upload_failed(&self, err: &dyn std::error::Error) {
        error!(error = %err, loaded = self.is_loaded(), "Upload failed");
    }

    /// Feed a chart event to the selection state machine.
    pub fn handle_chart_event(&mut self, event: ChartEvent) -> Selection {
        match self.loaded_mut() {
            Some(loaded) => loaded.interaction.handle(event, &loaded.days),
            None => Selection::NoSelection,
        }
    }

    pub fn click_bar(&mut self, date: NaiveDate) -> Selection {
        self.handle_chart_event(ChartEvent::BarClicked(date))
    }

    pub fn click_background(&mut self) -> Selection {
        self.handle_chart_event(ChartEvent::BackgroundClicked)
    }

    /// Click at a plot-relative position: a bar if a hit target is there,
    /// otherwise the background.
    pub fn click_at(&mut self, x: f64, y: f64) -> Selection {
        let hit = self
            .loaded()
            .and_then(|loaded| loaded.layout.as_ref())
            .and_then(|layout| layout.hit_test(x, y));
        match hit {
            Some(date) => self.click_bar(date),
            None => self.click_background(),
        }
    }

    /// Wheel gesture over the chart. Nothing scrolls before a dataset is loaded.
    pub fn wheel(&self, delta_x: f64, delta_y: f64) -> Option<HorizontalScroll> {
        self.loaded()?;
        remap_wheel(delta_x, delta_y)
    }

    pub fn select_year(&mut self, year: YearFilter) -> Result<(), DashboardError> {
        let loaded = self.loaded_mut().ok_or(DashboardError::NotLoaded)?;
        loaded.leaderboard.select(year)?;
        Ok(())
    }

    pub fn selection(&self) -> Selection {
        self.loaded()
            .map_or(Selection::NoSelection, |loaded| loaded.interaction.selection())
    }

    /// Snapshot of everything a renderer needs.
    pub fn view(&self) -> DashboardView {
        match self.loaded() {
            None => DashboardView::AwaitingUpload,
            Some(loaded) => {
                let selection = loaded.interaction.selection();
                let day_details: Vec<DayDetail> = loaded
                    .days
                    .iter()
                    .filter_map(|day| day_detail(&loaded.days, day.date, &self.config))
                    .collect();
                let detail = selection
                    .date()
                    .and_then(|date| day_details.iter().find(|d| d.date == date).cloned());
                let events = &loaded.dataset.events;
                DashboardView::Loaded(Box::new(LoadedView {
                    layout: loaded.layout.clone(),
                    selection,
                    detail,
                    day_details,
                    selected_year: loaded.leaderboard.selected(),
                    year_options: loaded.leaderboard.options(),
                    leaderboard: loaded.leaderboard.entries(events),
                    rankings: loaded.leaderboard.rankings(events),
                    event_count: loaded.dataset.events.len(),
                    rejected_count: loaded.dataset.rejected.len(),
                    total_minutes: rounded_minutes(loaded.dataset.total_playtime_ms()),
                }))
            }
        }
    }
}

/// Read-only data for rendering the loaded dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedView {
    /// `None` when the dataset holds no valid events.
    pub layout: Option<ChartLayout>,
    pub selection: Selection,
    /// Detail panel of the selected day.
    pub detail: Option<DayDetail>,
    /// Detail panels of every day, chronological.
    pub day_details: Vec<DayDetail>,
    pub selected_year: YearFilter,
    pub year_options: Vec<YearOption>,
    /// Ranked list of the selected year.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Ranked lists of every selector option.
    pub rankings: Vec<YearRanking>,
    pub event_count: usize,
    pub rejected_count: usize,
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    AwaitingUpload,
    Loaded(Box<LoadedView>),
}
