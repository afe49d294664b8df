use crate::config::Config;
use crate::workflow::WorkflowOrchestrator;

/// Shared handles the driver works against.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: WorkflowOrchestrator,
}
