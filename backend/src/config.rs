//! Configuration for the upload server and the dashboard.
//!
//! Values come from an optional TOML file and environment variables, with the
//! environment taking precedence.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! upload_dir = "./uploads"
//! max_files = 5
//! max_file_size = 104857600
//!
//! [dashboard]
//! bar_width = 30.0
//! chart_height = 800.0
//! detail_top_n = 100
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "PLAYSTATS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var} must be {expected}, got {value:?}")]
    InvalidEnv {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load the file named by `PLAYSTATS_CONFIG` (if any), then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.server.apply_env()?;
        Ok(config)
    }
}

/// Upload server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Temporary storage for uploaded files while they are parsed.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Per-file limit in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_files() -> usize {
    5
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    /// - `HOST` (default: 0.0.0.0)
    /// - `PORT` (default: 3000)
    /// - `UPLOAD_DIR` (default: ./uploads)
    /// - `UPLOAD_MAX_FILES` (default: 5)
    /// - `UPLOAD_MAX_FILE_SIZE` in bytes (default: 104857600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_env("PORT", "a valid port number")? {
            self.port = port;
        }
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(max_files) = parse_env("UPLOAD_MAX_FILES", "a positive integer")? {
            self.max_files = max_files;
        }
        if let Some(size) = parse_env("UPLOAD_MAX_FILE_SIZE", "a size in bytes")? {
            self.max_file_size = size;
        }
        Ok(())
    }

    /// Address string suitable for `SocketAddr` parsing.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upper bound for a whole multipart request body.
    pub fn max_request_size(&self) -> usize {
        let files = self.max_files as u64 * self.max_file_size;
        // Room for multipart boundaries and part headers.
        usize::try_from(files.saturating_add(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var,
                expected,
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Plot margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            bottom: 100.0,
            left: 20.0,
            right: 20.0,
        }
    }
}

/// Chart and leaderboard presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Horizontal space per day; the chart is `days * bar_width` wide.
    pub bar_width: f64,
    pub chart_height: f64,
    pub margin: Margin,
    /// Requested number of ticks on the minutes axis.
    pub value_tick_count: usize,
    /// Tracks listed in the detail panel of a selected day.
    pub detail_top_n: usize,
    pub detail_name_max_len: usize,
    pub leaderboard_name_max_len: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bar_width: 30.0,
            chart_height: 800.0,
            margin: Margin::default(),
            value_tick_count: 5,
            detail_top_n: 100,
            detail_name_max_len: 30,
            leaderboard_name_max_len: 20,
        }
    }
}
