/// Application services shared by several use cases
mod audit_recorder;
mod sla_scheduler;

pub use audit_recorder::AuditRecorder;
pub use sla_scheduler::SlaScheduler;
