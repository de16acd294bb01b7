/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the lifecycle core uses
/// to interact with storage, the external builder and output destinations.
pub mod audit_log_repository;
pub mod build_event_repository;
pub mod build_orchestrator;
pub mod catalog_repositories;
pub mod customer_repository;
pub mod formatter;
pub mod output_presenter;
pub mod payload_reader;
pub mod sla_violation_repository;
pub mod store_error;
pub mod unit_of_work;

pub use audit_log_repository::AuditLogRepository;
pub use build_event_repository::{BuildEventRepository, TransitionOutcome};
pub use build_orchestrator::BuildOrchestrator;
pub use catalog_repositories::{CveFindingRepository, ImageRepository, SbomRecordRepository};
pub use customer_repository::CustomerRepository;
pub use formatter::ReportFormatter;
pub use output_presenter::OutputPresenter;
pub use payload_reader::PayloadReader;
pub use sla_violation_repository::SlaViolationRepository;
pub use store_error::{StoreError, StoreResult};
pub use unit_of_work::{CompletionUnit, UnitOfWork};
