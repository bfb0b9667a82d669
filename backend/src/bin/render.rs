//! Playstats dashboard binary.
//!
//! Uploads history files to the upload server, loads the returned records
//! into the dashboard and writes the rendered HTML page.
//!
//! # Usage
//!
//! ```bash
//! playstats-render dashboard.html Streaming_History_2023.json Streaming_History_2024.json
//!
//! # Preselect a chart day and a leaderboard year ("0" is all time)
//! PLAYSTATS_SELECT_DATE=2024-01-01 PLAYSTATS_YEAR=0 playstats-render out.html history.json
//! ```
//!
//! # Environment Variables
//!
//! - `PLAYSTATS_SERVER`: Upload server base URL (default: http://localhost:3000)
//! - `PLAYSTATS_SELECT_DATE`: Day to select in the chart (YYYY-MM-DD)
//! - `PLAYSTATS_YEAR`: Leaderboard year, `0` for all time
//! - `PLAYSTATS_CONFIG`: Optional TOML config file (`[dashboard]` section)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use playstats::client::UploadClient;
use playstats::config::AppConfig;
use playstats::render::render_page;
use playstats::services::{Dashboard, YearFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let mut args = env::args_os().skip(1);
    let Some(output) = args.next().map(PathBuf::from) else {
        bail!("usage: playstats-render <output.html> <history.json>...");
    };
    let files: Vec<PathBuf> = args.map(PathBuf::from).collect();

    let config = AppConfig::load()?;
    let mut dashboard = Dashboard::new(config.dashboard);

    if files.is_empty() {
        warn!("No input files given, writing the upload page");
    } else {
        let client = UploadClient::from_env();
        match client.upload(&files).await {
            Ok(response) => {
                info!(records = response.data.len(), "{}", response.message);
                dashboard.load(response.data);
            }
            Err(err) => {
                dashboard.upload_failed(&err);
                return Err(err.into());
            }
        }
    }

    if let Ok(raw) = env::var("PLAYSTATS_SELECT_DATE") {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("PLAYSTATS_SELECT_DATE must be YYYY-MM-DD, got {:?}", raw))?;
        let selection = dashboard.click_bar(date);
        info!(?selection, "Chart selection applied");
    }
    if let Ok(raw) = env::var("PLAYSTATS_YEAR") {
        let year: i32 = raw
            .trim()
            .parse()
            .with_context(|| format!("PLAYSTATS_YEAR must be a year or 0, got {:?}", raw))?;
        dashboard.select_year(YearFilter::from(year))?;
    }

    let html = render_page(&dashboard.view(), dashboard.config());
    tokio::fs::write(&output, html)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), "Dashboard written");

    Ok(())
}
