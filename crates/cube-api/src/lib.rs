//! # cube-api
//!
//! HTTP API layer for Cube built on Axum.
//!
//! Provides the account endpoints, the auth-context middleware that binds
//! sessions and remember-me cookies to each request, extractors, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
