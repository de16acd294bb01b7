use crate::application::read_models::LifecycleReport;
use crate::shared::Result;

/// ReportFormatter port for rendering command output
///
/// This port abstracts the rendering of read models into a textual
/// representation (JSON, Markdown, etc.).
pub trait ReportFormatter {
    /// Renders a report
    ///
    /// # Arguments
    /// * `report` - The read model to render
    ///
    /// # Returns
    /// Rendered content as a string
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &LifecycleReport) -> Result<String>;
}
