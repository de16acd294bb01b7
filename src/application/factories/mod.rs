mod formatter_factory;
mod orchestrator_factory;
mod presenter_factory;

pub use formatter_factory::FormatterFactory;
pub use orchestrator_factory::OrchestratorFactory;
pub use presenter_factory::{PresenterFactory, PresenterType};
