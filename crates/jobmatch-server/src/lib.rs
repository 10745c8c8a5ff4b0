//! # JobMatch Server
//!
//! HTTP API over the [`jobmatch_core::MatchService`]. The binaries
//! `jobmatch-server` (HTTP) and `jobmatch` (CLI) live alongside.

pub mod api;

pub use api::{build_router, serve, AppState};
