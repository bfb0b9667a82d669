//! HTML and SVG output for a [`DashboardView`].
//!
//! The page is self-contained: inline styles, two SVG elements (the
//! scrollable chart and a pinned minutes axis), a detail panel per day, a
//! ranked list per leaderboard year, and a script that drives them.
//!
//! Every panel and list is rendered up front; the ones that do not match the
//! current selection carry `hidden`. The script applies the same transitions
//! as [`crate::services::ChartInteraction::handle`]: a hit target toggles its
//! day, anything else in the chart clears the selection, and the year
//! selector shows the matching list. Wheel gestures over the chart scroll it
//! horizontally.

use crate::config::DashboardConfig;
use crate::services::chart::{ChartLayout, DayDetail, Selection};
use crate::services::dashboard::{DashboardView, LoadedView};
use crate::services::leaderboard::YearRanking;

pub const BAR_COLOR: &str = "#1DB954";
pub const SELECTED_BAR_COLOR: &str = "#b91d82";

/// Width of the pinned SVG carrying the minutes axis.
const Y_AXIS_WIDTH: f64 = 70.0;

const STYLE: &str = r#"
body { font-family: sans-serif; background: #121212; color: #fff; margin: 0; padding: 16px; }
.chart-row { display: flex; }
.chart-scroll { overflow-x: auto; flex: 1; }
.y-axis text, .chart text { fill: #fff; }
.detail, .leaderboard { margin-top: 16px; }
.leaderboard ol, .detail ol { padding-left: 24px; }
.muted { color: #b3b3b3; }
"#;

const PAGE_SCRIPT: &str = r#"
(function () {
  var chart = document.getElementById("chart");
  if (chart) {
    chart.addEventListener("wheel", function (e) {
      var left = e.deltaX - e.deltaY;
      if (left === 0) { return; }
      e.preventDefault();
      chart.scrollBy({ left: left });
    }, { passive: false });
    chart.scrollLeft = chart.scrollWidth;
  }

  var svg = document.querySelector("svg.chart");
  if (svg) {
    var selected = svg.getAttribute("data-selected") || null;
    var select = function (date) {
      selected = date;
      svg.querySelectorAll("rect.bar").forEach(function (bar) {
        var on = bar.getAttribute("data-date") === date;
        bar.setAttribute("fill", svg.getAttribute(on ? "data-selected-color" : "data-bar-color"));
      });
      document.querySelectorAll("section.detail").forEach(function (panel) {
        panel.hidden = panel.getAttribute("data-date") !== date;
      });
    };
    svg.addEventListener("click", function (e) {
      var target = e.target;
      if (target.classList.contains("hit")) {
        var date = target.getAttribute("data-date");
        select(date === selected ? null : date);
      } else {
        select(null);
      }
    });
  }

  var year = document.getElementById("year");
  if (year) {
    year.addEventListener("change", function () {
      document.querySelectorAll(".leaderboard ol").forEach(function (list) {
        list.hidden = list.getAttribute("data-year") !== year.value;
      });
    });
  }
})();
"#;

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full HTML document for the current dashboard state.
pub fn render_page(view: &DashboardView, config: &DashboardConfig) -> String {
    let body = match view {
        DashboardView::AwaitingUpload => render_awaiting_upload(),
        DashboardView::Loaded(loaded) => render_loaded(loaded, config),
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Listening history</title>\n<style>{}</style>\n</head>\n<body>\n{}\n\
         <script>{}</script>\n</body>\n</html>\n",
        STYLE, body, PAGE_SCRIPT
    )
}

/// Placeholder shown before any dataset was loaded. Files are uploaded by
/// `playstats-render`, which writes the loaded page in place of this one.
fn render_awaiting_upload() -> String {
    "<section class=\"upload\">\n<h1>Upload your listening history</h1>\n\
     <p class=\"muted\">Run <code>playstats-render &lt;page.html&gt; &lt;history.json&gt;...</code> \
     to upload your exported <code>.json</code> files and render the dashboard.</p>\n</section>"
        .to_string()
}

fn render_loaded(view: &LoadedView, config: &DashboardConfig) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<header>\n<h1>Listening history</h1>\n<p class=\"muted\">{} plays, {} min total",
        view.event_count, view.total_minutes
    ));
    if view.rejected_count > 0 {
        html.push_str(&format!(", {} malformed records skipped", view.rejected_count));
    }
    html.push_str("</p>\n</header>\n");

    match &view.layout {
        Some(layout) => {
            html.push_str("<div class=\"chart-row\">\n");
            html.push_str(&render_y_axis_svg(layout, config));
            html.push_str("\n<div class=\"chart-scroll\" id=\"chart\">\n");
            html.push_str(&render_chart_svg(layout, view.selection, config));
            html.push_str("\n</div>\n</div>\n");
        }
        None => html.push_str("<p class=\"muted\">No listening data in the uploaded files.</p>\n"),
    }

    let selected = view.selection.date();
    for detail in &view.day_details {
        html.push_str(&render_detail(detail, selected == Some(detail.date)));
    }
    html.push_str(&render_leaderboard(view));
    html
}

/// The bar chart: bars, click targets and the month/year axis.
pub fn render_chart_svg(layout: &ChartLayout, selection: Selection, config: &DashboardConfig) -> String {
    let margin = config.margin;
    let selected = selection.date();
    let mut svg = format!(
        "<svg class=\"chart\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
         data-selected=\"{}\" data-bar-color=\"{}\" data-selected-color=\"{}\">\n\
         <g transform=\"translate({},{})\">\n\
         <rect class=\"background\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"transparent\"/>\n",
        layout.width,
        layout.height,
        selected.map(|date| date.to_string()).unwrap_or_default(),
        BAR_COLOR,
        SELECTED_BAR_COLOR,
        margin.left,
        margin.top,
        layout.inner_width,
        layout.inner_height
    );

    for bar in &layout.bars {
        let color = if selected == Some(bar.date) {
            SELECTED_BAR_COLOR
        } else {
            BAR_COLOR
        };
        svg.push_str(&format!(
            "<rect class=\"bar\" data-date=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            bar.date, bar.bar.x, bar.bar.y, bar.bar.width, bar.bar.height, color
        ));
        svg.push_str(&format!(
            "<rect class=\"hit\" data-date=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"transparent\"/>\n",
            bar.date, bar.hit.x, bar.hit.y, bar.hit.width, bar.hit.height
        ));
    }

    for tick in &layout.month_ticks {
        svg.push_str(&format!(
            "<text class=\"month\" x=\"{}\" y=\"{}\" font-size=\"16\" text-anchor=\"middle\">{}</text>\n",
            tick.x,
            layout.inner_height + 20.0,
            escape_html(&tick.label)
        ));
    }
    for tick in &layout.year_ticks {
        svg.push_str(&format!(
            "<text class=\"year\" x=\"{}\" y=\"{}\" font-size=\"20\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>\n",
            tick.x,
            layout.inner_height + 40.0,
            escape_html(&tick.label)
        ));
    }

    svg.push_str("</g>\n</svg>");
    svg
}

/// Minutes axis, drawn separately so it stays visible while the chart scrolls.
pub fn render_y_axis_svg(layout: &ChartLayout, config: &DashboardConfig) -> String {
    let mut svg = format!(
        "<svg class=\"y-axis\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n\
         <g transform=\"translate({},{})\">\n\
         <line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"{}\" stroke=\"#fff\"/>\n",
        Y_AXIS_WIDTH,
        layout.height,
        Y_AXIS_WIDTH - 1.0,
        config.margin.top,
        layout.inner_height
    );
    for tick in &layout.value_ticks {
        svg.push_str(&format!(
            "<g transform=\"translate(0,{})\"><line x1=\"-6\" x2=\"0\" stroke=\"#fff\"/>\
             <text x=\"-9\" dy=\"0.32em\" font-size=\"12\" text-anchor=\"end\">{}</text></g>\n",
            tick.y,
            escape_html(&tick.label)
        ));
    }
    svg.push_str("</g>\n</svg>");
    svg
}

fn render_detail(detail: &DayDetail, visible: bool) -> String {
    let mut html = format!(
        "<section class=\"detail\" data-date=\"{}\"{}>\n<h2>{}</h2>\n<p>{} min</p>\n<ol>\n",
        detail.date,
        hidden_unless(visible),
        escape_html(&detail.date_label),
        detail.total_minutes
    );
    for row in &detail.tracks {
        html.push_str(&format!(
            "<li title=\"{}\">{} <span class=\"muted\">{}</span></li>\n",
            escape_html(row.identity.name()),
            escape_html(&row.display_name),
            row.plays_label
        ));
    }
    html.push_str("</ol>\n</section>\n");
    html
}

fn hidden_unless(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

fn render_leaderboard(view: &LoadedView) -> String {
    let mut html = String::from(
        "<section class=\"leaderboard\">\n<h2>Top songs</h2>\n<select name=\"year\" id=\"year\">\n",
    );
    for option in &view.year_options {
        let selected = if option.value == view.selected_year {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            option.value.value(),
            selected,
            escape_html(&option.label)
        ));
    }
    html.push_str("</select>\n");
    for ranking in &view.rankings {
        html.push_str(&render_ranking(ranking, ranking.year == view.selected_year));
    }
    html.push_str("</section>\n");
    html
}

fn render_ranking(ranking: &YearRanking, visible: bool) -> String {
    let mut html = format!(
        "<ol data-year=\"{}\"{}>\n",
        ranking.year.value(),
        hidden_unless(visible)
    );
    for entry in &ranking.entries {
        html.push_str(&format!(
            "<li title=\"{}\">{} <span class=\"muted\">{}</span></li>\n",
            escape_html(entry.identity.name()),
            escape_html(&entry.display_name),
            entry.minutes_label
        ));
    }
    html.push_str("</ol>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::Dashboard;
    use chrono::NaiveDate;
    use serde_json::json;

    fn loaded_dashboard() -> Dashboard {
        let mut dashboard = Dashboard::default();
        dashboard.load(vec![
            json!({"ts": "2023-12-30T10:00:00Z", "ms_played": 180000, "master_metadata_track_name": "Rock & <Roll>"}),
            json!({"ts": "2024-01-02T10:00:00Z", "ms_played": 60000, "master_metadata_track_name": "Quiet"}),
            json!({"ts": "2024-01-02T11:00:00Z", "ms_played": 0, "episode_name": "Morning Pod"}),
        ]);
        dashboard
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & <b> \"c\" 'd'"), "a &amp; &lt;b&gt; &quot;c&quot; &#39;d&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    fn selected_fill() -> String {
        format!("fill=\"{}\"", SELECTED_BAR_COLOR)
    }

    #[test]
    fn test_awaiting_upload_page_explains_how_to_load() {
        let dashboard = Dashboard::default();
        let html = render_page(&dashboard.view(), dashboard.config());
        assert!(html.contains("playstats-render"));
        assert!(!html.contains("<form"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_loaded_page_has_chart_and_leaderboard() {
        let dashboard = loaded_dashboard();
        let html = render_page(&dashboard.view(), dashboard.config());

        assert_eq!(html.matches("class=\"bar\"").count(), 2);
        assert_eq!(html.matches("class=\"hit\"").count(), 2);
        assert_eq!(html.matches(&format!("fill=\"{}\"", BAR_COLOR)).count(), 2);
        assert!(!html.contains(&selected_fill()));
        assert!(html.contains("data-selected=\"\""));
        assert!(html.contains(">Dec</text>"));
        assert!(html.contains(">Jan</text>"));
        assert!(html.contains("font-weight=\"bold\" text-anchor=\"middle\">2024</text>"));
        assert!(html.contains("<option value=\"2024\" selected>2024</option>"));
        assert!(html.contains("<option value=\"0\">All time</option>"));
        assert!(html.contains(">Quiet <span"));
        assert!(html.contains("deltaX - e.deltaY"));
    }

    #[test]
    fn test_every_panel_and_ranking_is_emitted_hidden_until_selected() {
        let dashboard = loaded_dashboard();
        let html = render_page(&dashboard.view(), dashboard.config());

        assert!(html.contains("<section class=\"detail\" data-date=\"2023-12-30\" hidden>"));
        assert!(html.contains("<section class=\"detail\" data-date=\"2024-01-02\" hidden>"));
        assert!(html.contains("<ol data-year=\"2024\">"));
        assert!(html.contains("<ol data-year=\"0\" hidden>"));
        assert!(html.contains("<ol data-year=\"2023\" hidden>"));
    }

    #[test]
    fn test_script_wires_chart_clicks_and_year_selector() {
        let dashboard = loaded_dashboard();
        let html = render_page(&dashboard.view(), dashboard.config());

        assert!(html.contains("<select name=\"year\" id=\"year\">"));
        assert!(html.contains("year.addEventListener(\"change\""));
        assert!(html.contains("svg.addEventListener(\"click\""));
        assert!(html.contains("select(date === selected ? null : date)"));
        assert!(html.contains(&format!("data-selected-color=\"{}\"", SELECTED_BAR_COLOR)));
    }

    #[test]
    fn test_selected_day_is_highlighted_with_detail() {
        let mut dashboard = loaded_dashboard();
        dashboard.click_bar(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let html = render_page(&dashboard.view(), dashboard.config());

        assert_eq!(html.matches(&selected_fill()).count(), 1);
        assert!(html.contains("data-selected=\"2024-01-02\""));
        assert!(html.contains("<section class=\"detail\" data-date=\"2024-01-02\">"));
        assert!(html.contains("<section class=\"detail\" data-date=\"2023-12-30\" hidden>"));
        assert!(html.contains("<h2>Jan 2, 2024</h2>"));
        assert!(html.contains("<p>1 min</p>"));
        assert!(html.contains("Morning Pod"));
        assert!(html.contains("1 play<"));
    }

    #[test]
    fn test_names_are_escaped() {
        let mut dashboard = loaded_dashboard();
        dashboard
            .select_year(crate::services::YearFilter::Year(2023))
            .unwrap();
        let html = render_page(&dashboard.view(), dashboard.config());
        assert!(html.contains("Rock &amp; &lt;Roll&gt;"));
        assert!(!html.contains("<Roll>"));
    }

    #[test]
    fn test_y_axis_labels() {
        let dashboard = loaded_dashboard();
        let DashboardView::Loaded(view) = dashboard.view() else {
            panic!("dashboard should be loaded");
        };
        let svg = render_y_axis_svg(view.layout.as_ref().unwrap(), dashboard.config());
        assert!(svg.contains(">3 min</text>"));
        assert!(!svg.contains(">0 min</text>"));
    }

    #[test]
    fn test_empty_dataset_page() {
        let mut dashboard = Dashboard::default();
        dashboard.load(Vec::new());
        let html = render_page(&dashboard.view(), dashboard.config());
        assert!(html.contains("No listening data"));
        assert!(!html.contains("<svg"));
    }
}
