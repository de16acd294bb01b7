/// Mock implementations for testing
mod mock_audit_log_repository;
mod mock_build_orchestrator;

pub use mock_audit_log_repository::FailingAuditLogRepository;
pub use mock_build_orchestrator::MockBuildOrchestrator;
