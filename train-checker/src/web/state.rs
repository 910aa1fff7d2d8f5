//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::StationPair;
use crate::service::TrainService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared with the scheduler
    pub trains: TrainService,

    /// Route checked when a request names no stations
    pub default_pair: Arc<StationPair>,
}

impl AppState {
    pub fn new(trains: TrainService, default_pair: StationPair) -> Self {
        Self {
            trains,
            default_pair: Arc::new(default_pair),
        }
    }
}
