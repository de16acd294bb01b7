/// Filesystem adapters for file I/O operations
mod file_writer;
mod payload_reader;

pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use payload_reader::{FileSystemPayloadReader, STDIN_SOURCE};
