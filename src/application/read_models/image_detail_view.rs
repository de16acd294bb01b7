use crate::lifecycle::domain::{CveFinding, Image, SbomRecord, Severity};
use serde::Serialize;

/// Count of findings per severity for one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Findings with a fix available, across all severities
    pub fixable: usize,
}

impl SeveritySummary {
    pub fn from_findings(findings: &[CveFinding]) -> Self {
        findings.iter().fold(Self::default(), |mut summary, finding| {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            if finding.fix_available {
                summary.fixable += 1;
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// An image together with its compliance artifacts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDetailView {
    pub image: Image,
    pub sbom_records: Vec<SbomRecord>,
    pub cve_findings: Vec<CveFinding>,
    pub severity_summary: SeveritySummary,
}

impl ImageDetailView {
    pub fn new(image: Image, sbom_records: Vec<SbomRecord>, cve_findings: Vec<CveFinding>) -> Self {
        let severity_summary = SeveritySummary::from_findings(&cve_findings);
        Self {
            image,
            sbom_records,
            cve_findings,
            severity_summary,
        }
    }
}
