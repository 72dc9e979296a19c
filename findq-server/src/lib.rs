//! findq-server: HTTP boundary for findq
//!
//! Validates input, opens one unit of work per request, drives the
//! repositories and turns rows into plain view objects for clients.

pub mod http;
pub mod state;
pub mod views;

pub use http::{router, run_server, ApiError, ServerConfig};
pub use state::AppState;
