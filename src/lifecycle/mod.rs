/// Build lifecycle core: domain model, policies and pure services
pub mod domain;
pub mod policies;
pub mod services;
