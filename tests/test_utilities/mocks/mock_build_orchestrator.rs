use async_trait::async_trait;
use image_lifecycle::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock BuildOrchestrator that records every trigger it receives
#[derive(Default, Clone)]
pub struct MockBuildOrchestrator {
    pub triggered: Arc<Mutex<Vec<BuildEventId>>>,
    pub should_fail: bool,
    pub delay: Option<Duration>,
}

impl MockBuildOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every trigger fails as if the builder were unreachable
    pub fn unreachable() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every trigger hangs for `delay` before succeeding
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn trigger_count(&self) -> usize {
        self.triggered.lock().unwrap().len()
    }
}

#[async_trait]
impl BuildOrchestrator for MockBuildOrchestrator {
    async fn trigger_build(&self, event: &BuildEvent) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.triggered.lock().unwrap().push(event.id);

        if self.should_fail {
            anyhow::bail!("connection refused: builder unreachable");
        }
        Ok(())
    }
}
