//! Read models for CQRS-lite pattern
//!
//! View-oriented structs assembled from several repositories for display.

pub mod image_detail_view;
pub mod lifecycle_report;
pub mod sla_sweep_report;

pub use image_detail_view::{ImageDetailView, SeveritySummary};
pub use lifecycle_report::LifecycleReport;
pub use sla_sweep_report::{SlaSweepReport, TenantFailure};
