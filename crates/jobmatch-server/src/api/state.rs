//! API shared state

use std::sync::Arc;

use jobmatch_core::MatchService;

/// Shared application state for the API
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MatchService>,
}

impl AppState {
    pub fn new(service: Arc<MatchService>) -> Self {
        Self { service }
    }
}
