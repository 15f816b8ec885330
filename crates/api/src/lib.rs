//! Subtrack API Library
//!
//! This crate contains the HTTP server components for Subtrack.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
