/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (e.g., CLI)
/// use to interact with the lifecycle core.
pub mod build_lifecycle_port;

pub use build_lifecycle_port::{BuildLifecyclePort, CompletedBuild};
