/// Data Transfer Objects for application layer
///
/// DTOs carry data between the transport adapters and the use cases,
/// keeping wire shapes out of the domain layer.
mod build_request;
mod completion_payload;
mod output_format;

pub use build_request::{BuildRequest, DEFAULT_ACTOR};
pub use completion_payload::{CompletionPayload, CvePayload, SbomPayload};
pub use output_format::OutputFormat;
