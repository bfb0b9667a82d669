//! HTTP server module for the upload service.
//!
//! The server is deliberately thin: it stores the uploaded files, merges
//! their top-level JSON arrays and returns the result. It never aggregates.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Multipart extraction                                   │
//! │  - JSON responses and error bodies                        │
//! │  - CORS, compression, tracing                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  services::upload                                         │
//! │  - Temporary storage and limit checks                     │
//! │  - Merging of JSON lists                                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
