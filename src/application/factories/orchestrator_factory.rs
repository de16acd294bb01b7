use crate::adapters::outbound::orchestrator::{HttpBuildOrchestrator, SimulatedBuildOrchestrator};
use crate::ports::outbound::BuildOrchestrator;
use crate::shared::Result;
use std::time::Duration;

/// Factory for creating the build orchestrator adapter
///
/// A configured endpoint selects the HTTP orchestrator; without one, builds
/// are triggered against the in-process simulator.
pub struct OrchestratorFactory;

impl OrchestratorFactory {
    /// # Errors
    /// Returns an error if the endpoint is not a valid http(s) URL
    pub fn create(endpoint: Option<&str>, timeout: Duration) -> Result<Box<dyn BuildOrchestrator>> {
        match endpoint {
            Some(endpoint) => Ok(Box::new(HttpBuildOrchestrator::new(endpoint, timeout)?)),
            None => Ok(Box::new(SimulatedBuildOrchestrator::new())),
        }
    }
}
