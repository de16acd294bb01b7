use crate::application::use_cases::SlaEvaluationUseCase;
use crate::ports::outbound::{
    AuditLogRepository, CustomerRepository, CveFindingRepository, SlaViolationRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// SlaScheduler runs SLA sweeps on a fixed interval until shut down
///
/// The first sweep starts immediately. A sweep that overruns the interval
/// delays the next tick instead of bursting to catch up.
pub struct SlaScheduler<C, F, V, A> {
    evaluator: Arc<SlaEvaluationUseCase<C, F, V, A>>,
    interval: Duration,
}

impl<C, F, V, A> SlaScheduler<C, F, V, A>
where
    C: CustomerRepository,
    F: CveFindingRepository,
    V: SlaViolationRepository,
    A: AuditLogRepository,
{
    pub fn new(evaluator: Arc<SlaEvaluationUseCase<C, F, V, A>>, interval: Duration) -> Self {
        Self {
            evaluator,
            interval,
        }
    }

    /// Runs sweeps until `shutdown` turns true or its sender is dropped
    ///
    /// A shutdown signal arriving mid-sweep takes effect once that sweep
    /// finishes, so a sweep is never cut off halfway through a tenant.
    ///
    /// # Returns
    /// The number of sweeps performed
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweeps = 0;

        tracing::info!(interval_seconds = self.interval.as_secs(), "sla scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    sweeps += 1;
                    match self.evaluator.evaluate().await {
                        Ok(report) => tracing::info!(
                            sweep = sweeps,
                            created = report.created,
                            resolved = report.resolved,
                            failures = report.failures.len(),
                            "sla sweep finished"
                        ),
                        Err(e) => tracing::warn!(sweep = sweeps, error = %e, "sla sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(sweeps, "sla scheduler stopped");
        sweeps
    }
}
