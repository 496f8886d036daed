use std::sync::Arc;

use nh_agent::Orchestrator;

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}
