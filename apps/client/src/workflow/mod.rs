pub mod comparator;
pub mod orchestrator;
pub mod pager;
pub mod pipeline;
pub mod stages;

pub use orchestrator::WorkflowOrchestrator;
