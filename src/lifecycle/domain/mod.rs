/// Domain model for the build lifecycle
pub mod audit_log;
pub mod build_event;
pub mod completion;
pub mod customer;
pub mod cve_finding;
pub mod image;
pub mod sbom_record;
pub mod sla_violation;

pub use audit_log::{AuditAction, AuditDetails, AuditLogEntry, AuditLogId, NewAuditLogEntry};
pub use build_event::{
    BuildEvent, BuildEventId, BuildState, BuildStatus, BuildTransition, NewBuildEvent, TriggerType,
};
pub use completion::ValidatedCompletion;
pub use customer::{Customer, NewCustomer, SlaTier, TenantNamespace};
pub use cve_finding::{CveDescriptor, CveFinding, CveFindingId, Severity};
pub use image::{Image, ImageDigest, ImageId, NewImage, SlsaLevel};
pub use sbom_record::{SbomDescriptor, SbomRecord, SbomRecordId};
pub use sla_violation::{SlaViolation, SlaViolationId, ViolationState};
