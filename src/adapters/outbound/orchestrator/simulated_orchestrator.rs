use crate::lifecycle::domain::BuildEvent;
use crate::ports::outbound::BuildOrchestrator;
use crate::shared::Result;
use async_trait::async_trait;

/// SimulatedBuildOrchestrator adapter used when no builder endpoint is configured
///
/// Accepts every trigger and only logs it. Completion and failure reports
/// are then fed in by hand through the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedBuildOrchestrator;

impl SimulatedBuildOrchestrator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BuildOrchestrator for SimulatedBuildOrchestrator {
    async fn trigger_build(&self, event: &BuildEvent) -> Result<()> {
        tracing::info!(
            build_event_id = %event.id,
            tenant = %event.tenant_namespace,
            trigger_type = %event.trigger_type,
            "simulated builder accepted build"
        );
        Ok(())
    }
}
