//! # Playstats
//!
//! Listening-history upload and dashboard.
//!
//! A user exports their streaming history as JSON files. The upload server
//! merges the files into one list of raw play records; everything else
//! happens on the client side of that request: records are validated,
//! aggregated per day and per year, laid out as a bar chart, and rendered as
//! a self-contained HTML dashboard.
//!
//! ## Architecture
//!
//! - [`api`]: wire types shared by server and client
//! - [`config`]: TOML and environment configuration
//! - [`models`]: raw records, validated play events and ingestion
//! - [`services`]: aggregation, chart layout, leaderboard, dashboard state,
//!   and upload handling for the server
//! - [`render`]: HTML/SVG output of a dashboard view
//! - [`http`]: Axum-based upload server (feature `http-server`)
//! - [`client`]: reqwest-based upload client (feature `client`)

pub mod api;
pub mod config;
pub mod models;
pub mod render;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

#[cfg(feature = "client")]
pub mod client;
