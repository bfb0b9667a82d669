//! Playstats upload server binary.
//!
//! Accepts exported listening-history files on `POST /upload` and answers
//! with their merged contents.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin playstats-server
//!
//! # With a config file and a custom port
//! PLAYSTATS_CONFIG=playstats.toml PORT=8080 cargo run --bin playstats-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `UPLOAD_DIR`: Temporary storage for uploads (default: ./uploads)
//! - `UPLOAD_MAX_FILES`: Files per request (default: 5)
//! - `UPLOAD_MAX_FILE_SIZE`: Bytes per file (default: 104857600)
//! - `PLAYSTATS_CONFIG`: Optional TOML config file
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use playstats::config::AppConfig;
use playstats::http::{create_router, AppState};

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

    info!("Starting Playstats upload server");

    let config = AppConfig::load()?.server;
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!(
        upload_dir = %config.upload_dir.display(),
        max_files = config.max_files,
        max_file_size = config.max_file_size,
        "Upload storage ready"
    );

    let addr: SocketAddr = config.bind_address().parse()?;
    let app = create_router(AppState::new(config));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
