use crate::ports::outbound::PayloadReader;
use crate::shared::error::AppError;
use crate::shared::Result;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Maximum accepted payload size (16 MiB)
const MAX_PAYLOAD_SIZE: u64 = 16 * 1024 * 1024;

/// Source name that selects standard input
pub const STDIN_SOURCE: &str = "-";

/// FileSystemPayloadReader adapter reading completion payloads from a
/// regular file or from standard input
pub struct FileSystemPayloadReader;

impl FileSystemPayloadReader {
    pub fn new() -> Self {
        Self
    }

    fn error(source: &str, details: impl Into<String>) -> anyhow::Error {
        AppError::PayloadReadError {
            source_name: source.to_string(),
            details: details.into(),
        }
        .into()
    }

    fn read_stdin() -> Result<String> {
        let mut buffer = String::new();
        io::stdin()
            .take(MAX_PAYLOAD_SIZE + 1)
            .read_to_string(&mut buffer)
            .map_err(|e| Self::error("<stdin>", e.to_string()))?;
        if buffer.len() as u64 > MAX_PAYLOAD_SIZE {
            return Err(Self::error(
                "<stdin>",
                format!("payload exceeds {} bytes", MAX_PAYLOAD_SIZE),
            ));
        }
        Ok(buffer)
    }

    fn read_file(source: &str) -> Result<String> {
        let path = Path::new(source);
        let metadata = fs::symlink_metadata(path).map_err(|e| Self::error(source, e.to_string()))?;

        if metadata.is_symlink() {
            return Err(Self::error(source, "symbolic links are not allowed"));
        }
        if !metadata.is_file() {
            return Err(Self::error(source, "not a regular file"));
        }
        if metadata.len() > MAX_PAYLOAD_SIZE {
            return Err(Self::error(
                source,
                format!("{} bytes exceeds the {} byte limit", metadata.len(), MAX_PAYLOAD_SIZE),
            ));
        }

        fs::read_to_string(path).map_err(|e| Self::error(source, e.to_string()))
    }
}

impl Default for FileSystemPayloadReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadReader for FileSystemPayloadReader {
    fn read_payload(&self, source: &str) -> Result<String> {
        if source == STDIN_SOURCE {
            Self::read_stdin()
        } else {
            Self::read_file(source)
        }
    }
}
