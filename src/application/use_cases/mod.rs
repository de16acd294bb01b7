/// Use cases orchestrating the lifecycle domain through outbound ports
pub mod build_lifecycle;
pub mod catalog;
pub mod sla_evaluation;

pub use build_lifecycle::BuildLifecycleUseCase;
pub use catalog::CatalogUseCase;
pub use sla_evaluation::{SlaEvaluationUseCase, SLA_EVALUATOR_ACTOR};
