use crate::shared::Result;

/// PayloadReader port for loading raw completion reports
pub trait PayloadReader {
    /// Reads the raw payload text
    ///
    /// # Arguments
    /// * `source` - A file path, or `-` for standard input
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or exceeds the size limit
    fn read_payload(&self, source: &str) -> Result<String>;
}
