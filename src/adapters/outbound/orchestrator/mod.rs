/// Build orchestration trigger adapters
mod http_orchestrator;
mod simulated_orchestrator;

pub use http_orchestrator::HttpBuildOrchestrator;
pub use simulated_orchestrator::SimulatedBuildOrchestrator;
