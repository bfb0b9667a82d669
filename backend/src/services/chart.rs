//! Chart geometry and interaction for the daily listening-time bar chart.
//!
//! [`ChartLayout::build`] maps the day aggregates onto pixel space: one bar per
//! day along a time axis, bar height proportional to minutes played. The
//! layout is plain data; turning it into SVG is done by [`crate::render`].
//!
//! Coordinates are relative to the plot area, i.e. the chart minus its
//! margins. `y = 0` is the top of the plot.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::aggregation::{top_tracks_for_day, DayAggregates};
use super::format::{date_label, plays_label, rounded_minutes, truncate_string};
use crate::config::DashboardConfig;
use crate::models::TrackIdentity;

/// Maps dates linearly by elapsed time onto a pixel range, rounding to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeScale {
    pub domain: (NaiveDate, NaiveDate),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Dates outside the domain extrapolate linearly.
    pub fn apply(&self, date: NaiveDate) -> f64 {
        let span = (self.domain.1 - self.domain.0).num_days();
        let t = if span == 0 {
            // Single-day domain: everything sits in the middle of the range.
            0.5
        } else {
            (date - self.domain.0).num_days() as f64 / span as f64
        };
        interpolate(self.range, t).round()
    }
}

/// Maps a numeric domain linearly onto a pixel range, rounding to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        interpolate(self.range, t).round()
    }

    /// Round tick values covering the domain, roughly `count` of them.
    ///
    /// Steps are 1, 2 or 5 times a power of ten.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }
        let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };

        let raw_step = (hi - lo) / count as f64;
        let power = raw_step.log10().floor();
        let error = raw_step / 10f64.powf(power);
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };

        // Negative powers divide by an integer increment to avoid
        // accumulating float error (0.1 * 3 != 0.3).
        if power < 0.0 {
            let inc = 10f64.powf(-power) / factor;
            let first = (lo * inc).ceil() as i64;
            let last = (hi * inc).floor() as i64;
            (first..=last).map(|i| i as f64 / inc).collect()
        } else {
            let step = factor * 10f64.powf(power);
            let first = (lo / step).ceil() as i64;
            let last = (hi / step).floor() as i64;
            (first..=last).map(|i| i as f64 * step).collect()
        }
    }
}

fn interpolate((r0, r1): (f64, f64), t: f64) -> f64 {
    r0 + t * (r1 - r0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A day's visible bar and the wider, full-height target that receives clicks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGeometry {
    pub date: NaiveDate,
    pub minutes: f64,
    pub bar: Rect,
    pub hit: Rect,
}

/// Label on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub date: NaiveDate,
    pub x: f64,
    pub label: String,
}

/// Label on the minutes axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueTick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

/// Complete geometry of the chart for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub x_scale: TimeScale,
    pub y_scale: LinearScale,
    /// One per day with data, in date order.
    pub bars: Vec<BarGeometry>,
    pub month_ticks: Vec<AxisTick>,
    pub year_ticks: Vec<AxisTick>,
    pub value_ticks: Vec<ValueTick>,
}

impl ChartLayout {
    /// Lay out the chart. Returns `None` when there are no days to draw.
    pub fn build(days: &DayAggregates, config: &DashboardConfig) -> Option<Self> {
        let min_date = days.first_date()?;
        let max_date = days.last_date()?;
        let margin = config.margin;
        let bar_width = config.bar_width;

        let width = days.len() as f64 * bar_width;
        let height = config.chart_height;
        let inner_width = (width - margin.left - margin.right).max(0.0);
        let inner_height = (height - margin.top - margin.bottom).max(0.0);

        let x_scale = TimeScale::new((min_date, max_date), (0.0, inner_width));
        let max_minutes = days.max_daily_minutes();
        // An all-zero dataset still needs a usable domain.
        let y_max = if max_minutes > 0.0 { max_minutes } else { 1.0 };
        let y_scale = LinearScale::new((0.0, y_max), (inner_height, 0.0));

        let bars = days
            .iter()
            .map(|day| {
                let minutes = day.minutes();
                let x = x_scale.apply(day.date);
                let y = y_scale.apply(minutes);
                BarGeometry {
                    date: day.date,
                    minutes,
                    bar: Rect {
                        x,
                        y,
                        width: bar_width * 0.25,
                        height: inner_height - y,
                    },
                    hit: Rect {
                        x: x - bar_width / 4.0,
                        y: 0.0,
                        width: bar_width * 0.75,
                        height: inner_height,
                    },
                }
            })
            .collect();

        let label_offset = bar_width / 2.0;
        let month_ticks = month_starts(min_date, max_date)
            .into_iter()
            .map(|date| AxisTick {
                date,
                x: x_scale.apply(date) + label_offset,
                label: date.format("%b").to_string(),
            })
            .collect();
        let year_ticks = year_starts(min_date, max_date)
            .into_iter()
            .map(|date| AxisTick {
                date,
                x: x_scale.apply(date) + label_offset,
                label: date.year().to_string(),
            })
            .collect();

        let value_ticks = y_scale
            .ticks(config.value_tick_count)
            .into_iter()
            .filter(|value| *value != 0.0)
            .map(|value| ValueTick {
                value,
                y: y_scale.apply(value),
                label: format!("{} min", value),
            })
            .collect();

        Some(Self {
            width,
            height,
            inner_width,
            inner_height,
            min_date,
            max_date,
            x_scale,
            y_scale,
            bars,
            month_ticks,
            year_ticks,
            value_ticks,
        })
    }

    pub fn bar(&self, date: NaiveDate) -> Option<&BarGeometry> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|i| &self.bars[i])
    }

    /// Date whose hit target contains the plot-relative point, if any.
    ///
    /// Later bars are drawn on top, so they win where targets overlap.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NaiveDate> {
        self.bars
            .iter()
            .rev()
            .find(|b| b.hit.contains(x, y))
            .map(|b| b.date)
    }
}

/// First day of every month from `start`'s month through `end`'s month.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let (Some(mut current), Some(last)) = (start.with_day(1), end.with_day(1)) else {
        return Vec::new();
    };
    let mut months = Vec::new();
    while current <= last {
        months.push(current);
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    months
}

/// January 1st of every year from `start`'s year through `end`'s year.
pub fn year_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    (start.year()..=end.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        .collect()
}

/// Which day, if any, is selected in the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "date", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    NoSelection,
    DaySelected(NaiveDate),
}

impl Selection {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Selection::NoSelection => None,
            Selection::DaySelected(date) => Some(date),
        }
    }
}

/// Pointer input on the chart surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartEvent {
    /// Click on the hit target of a day's bar.
    BarClicked(NaiveDate),
    /// Click on empty chart area.
    BackgroundClicked,
}

/// Selection state machine of the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartInteraction {
    selection: Selection,
}

impl ChartInteraction {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn clear(&mut self) {
        self.selection = Selection::NoSelection;
    }

    /// Apply an event and return the resulting selection.
    ///
    /// Clicking the selected bar again or the background clears the selection;
    /// clicking any other bar selects it. Clicks on dates without a bar are
    /// ignored.
    pub fn handle(&mut self, event: ChartEvent, days: &DayAggregates) -> Selection {
        self.selection = match (self.selection, event) {
            (_, ChartEvent::BackgroundClicked) => Selection::NoSelection,
            (_, ChartEvent::BarClicked(date)) if !days.contains(date) => self.selection,
            (Selection::DaySelected(current), ChartEvent::BarClicked(date)) if current == date => {
                Selection::NoSelection
            }
            (_, ChartEvent::BarClicked(date)) => Selection::DaySelected(date),
        };
        self.selection
    }
}

/// Horizontal page scroll produced by a wheel gesture over the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizontalScroll {
    pub left: f64,
}

/// Redirect wheel deltas to horizontal scrolling.
///
/// Vertical deltas scroll horizontally with inverted sign, native horizontal
/// deltas pass through.
pub fn remap_wheel(delta_x: f64, delta_y: f64) -> Option<HorizontalScroll> {
    let left = delta_x - delta_y;
    (left != 0.0).then_some(HorizontalScroll { left })
}

/// One line of the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub rank: usize,
    pub identity: TrackIdentity,
    pub display_name: String,
    pub plays: u64,
    pub plays_label: String,
}

/// Panel shown while a day is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub date_label: String,
    pub total_minutes: u64,
    pub tracks: Vec<DetailRow>,
}

pub fn day_detail(days: &DayAggregates, date: NaiveDate, config: &DashboardConfig) -> Option<DayDetail> {
    let day = days.get(date)?;
    let tracks = top_tracks_for_day(days, date, config.detail_top_n)
        .into_iter()
        .enumerate()
        .map(|(i, track)| DetailRow {
            rank: i + 1,
            display_name: truncate_string(track.identity.name(), config.detail_name_max_len),
            identity: track.identity,
            plays: track.plays,
            plays_label: plays_label(track.plays),
        })
        .collect();

    Some(DayDetail {
        date,
        date_label: date_label(date),
        total_minutes: rounded_minutes(day.total_playtime_ms),
        tracks,
    })
}
