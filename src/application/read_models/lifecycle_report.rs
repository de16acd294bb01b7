use super::{ImageDetailView, SlaSweepReport};
use crate::lifecycle::domain::{AuditLogEntry, BuildEvent, Customer, Image, SlaViolation};
use crate::ports::inbound::CompletedBuild;
use serde::Serialize;

/// Anything a command can render
///
/// Serializes as the wrapped value, so JSON output carries no variant tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LifecycleReport {
    Build(BuildEvent),
    Builds(Vec<BuildEvent>),
    Completion(Box<CompletedBuild>),
    Images(Vec<Image>),
    ImageDetail(Box<ImageDetailView>),
    Customer(Customer),
    Customers(Vec<Customer>),
    Violations(Vec<SlaViolation>),
    AuditLog(Vec<AuditLogEntry>),
    SlaSweep(SlaSweepReport),
}
