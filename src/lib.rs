//! image-lifecycle - build lifecycle tracking for multi-tenant container images
//!
//! This library records container image builds from request to completion,
//! stores the SBOM references and CVE findings each completed build produces,
//! and derives per-tenant SLA violations from those findings. It follows
//! hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`lifecycle`): Pure domain model, SLA policy and reconciliation
//! - **Application Layer** (`application`): Use cases, services, read models and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): SQLite persistence, build orchestrators, formatters, presenters
//! - **Shared** (`shared`): Error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use image_lifecycle::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let store = Arc::new(SqliteStore::open("image-lifecycle.db")?);
//! let lifecycle = BuildLifecycleUseCase::new(
//!     Arc::clone(&store),
//!     Arc::clone(&store),
//!     Arc::new(SimulatedBuildOrchestrator::new()),
//!     AuditRecorder::new(Arc::clone(&store)),
//! );
//!
//! let event = lifecycle
//!     .request_build(BuildRequest::new("acme", "webhook")?)
//!     .await?;
//!
//! let payload = CompletionPayload::from_json(
//!     r#"{"image_digest": "sha256:abc", "slsa_level": 2, "sboms": [], "cves": []}"#,
//! )?;
//! let completed = lifecycle.complete_build(event.id, payload).await?;
//! println!("image {}", completed.image.id);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::filesystem::{
        FileSystemPayloadReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, MarkdownFormatter};
    pub use crate::adapters::outbound::orchestrator::{
        HttpBuildOrchestrator, SimulatedBuildOrchestrator,
    };
    pub use crate::adapters::outbound::persistence::SqliteStore;
    pub use crate::application::dto::{
        BuildRequest, CompletionPayload, CvePayload, OutputFormat, SbomPayload,
    };
    pub use crate::application::read_models::{
        ImageDetailView, LifecycleReport, SeveritySummary, SlaSweepReport,
    };
    pub use crate::application::services::{AuditRecorder, SlaScheduler};
    pub use crate::application::use_cases::{
        BuildLifecycleUseCase, CatalogUseCase, SlaEvaluationUseCase,
    };
    pub use crate::lifecycle::domain::{
        AuditAction, AuditLogEntry, BuildEvent, BuildEventId, BuildState, BuildStatus, Customer,
        CveFinding, Image, ImageId, NewCustomer, Severity, SlaTier, SlaViolation,
        TenantNamespace, TriggerType, ViolationState,
    };
    pub use crate::lifecycle::policies::SlaPolicy;
    pub use crate::ports::inbound::{BuildLifecyclePort, CompletedBuild};
    pub use crate::ports::outbound::{
        AuditLogRepository, BuildEventRepository, BuildOrchestrator, CustomerRepository,
        CveFindingRepository, ImageRepository, OutputPresenter, ReportFormatter,
        SbomRecordRepository, SlaViolationRepository, StoreError, UnitOfWork,
    };
    pub use crate::shared::{LifecycleError, LifecycleResult, Result};
}
