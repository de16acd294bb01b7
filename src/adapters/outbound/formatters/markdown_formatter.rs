use crate::application::read_models::{ImageDetailView, LifecycleReport, SlaSweepReport};
use crate::lifecycle::domain::{
    AuditLogEntry, BuildEvent, Customer, CveFinding, Image, SbomRecord, SlaViolation,
    ViolationState,
};
use crate::ports::inbound::CompletedBuild;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use chrono::{DateTime, SecondsFormat, Utc};

const BUILD_TABLE_HEADER: &str = "| ID | Tenant | Trigger | Status | Image | Created | Updated |\n";
const BUILD_TABLE_SEPARATOR: &str = "|----|--------|---------|--------|-------|---------|---------|\n";

const IMAGE_TABLE_HEADER: &str = "| ID | Tenant | Digest | Tags | SLSA | Created |\n";
const IMAGE_TABLE_SEPARATOR: &str = "|----|--------|--------|------|------|---------|\n";

const CVE_TABLE_HEADER: &str = "| CVE ID | Severity | Fix Available | Description |\n";
const CVE_TABLE_SEPARATOR: &str = "|--------|----------|---------------|-------------|\n";

/// MarkdownFormatter adapter rendering reports as Markdown tables
///
/// Lists render as one table; single records render as a heading followed
/// by their fields and any child tables.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn empty_notice(output: &mut String, what: &str) {
        output.push_str(&format!("*No {} found.*\n", what));
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper methods for rendering sections
impl MarkdownFormatter {
    fn build_row(event: &BuildEvent) -> String {
        format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            event.id,
            Self::escape_cell(event.tenant_namespace.as_str()),
            Self::escape_cell(event.trigger_type.as_str()),
            event.status(),
            event
                .state
                .image_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            Self::timestamp(&event.created_at),
            Self::timestamp(&event.updated_at)
        )
    }

    fn render_builds(output: &mut String, events: &[BuildEvent]) {
        output.push_str("## Build Events\n\n");
        if events.is_empty() {
            Self::empty_notice(output, "build events");
            return;
        }
        output.push_str(BUILD_TABLE_HEADER);
        output.push_str(BUILD_TABLE_SEPARATOR);
        for event in events {
            output.push_str(&Self::build_row(event));
        }
    }

    fn render_images(output: &mut String, images: &[Image]) {
        output.push_str("## Images\n\n");
        if images.is_empty() {
            Self::empty_notice(output, "images");
            return;
        }
        output.push_str(IMAGE_TABLE_HEADER);
        output.push_str(IMAGE_TABLE_SEPARATOR);
        for image in images {
            output.push_str(&format!(
                "| {} | {} | `{}` | {} | {} | {} |\n",
                image.id,
                Self::escape_cell(image.tenant_namespace.as_str()),
                Self::escape_cell(image.digest.as_str()),
                Self::escape_cell(&image.tags.join(", ")),
                image.slsa_level.get(),
                Self::timestamp(&image.created_at)
            ));
        }
    }

    fn render_findings(output: &mut String, findings: &[CveFinding]) {
        output.push_str("### Vulnerabilities\n\n");
        if findings.is_empty() {
            Self::empty_notice(output, "vulnerabilities");
            return;
        }
        output.push_str(CVE_TABLE_HEADER);
        output.push_str(CVE_TABLE_SEPARATOR);
        for finding in findings {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                Self::escape_cell(&finding.cve_id),
                finding.severity,
                if finding.fix_available { "Yes" } else { "No" },
                Self::escape_cell(&finding.description)
            ));
        }
    }

    fn render_sboms(output: &mut String, sboms: &[SbomRecord]) {
        output.push_str("### SBOMs\n\n");
        if sboms.is_empty() {
            Self::empty_notice(output, "SBOM records");
            return;
        }
        output.push_str("| Format | URI |\n|--------|-----|\n");
        for sbom in sboms {
            output.push_str(&format!(
                "| {} | {} |\n",
                Self::escape_cell(&sbom.format),
                Self::escape_cell(&sbom.uri)
            ));
        }
    }

    fn render_completion(output: &mut String, completed: &CompletedBuild) {
        output.push_str(&format!(
            "# Build {} completed\n\n",
            completed.build_event.id
        ));
        Self::render_builds(output, std::slice::from_ref(&completed.build_event));
        output.push('\n');
        Self::render_images(output, std::slice::from_ref(&completed.image));
        output.push('\n');
        Self::render_sboms(output, &completed.sbom_records);
        output.push('\n');
        Self::render_findings(output, &completed.cve_findings);
    }

    fn render_image_detail(output: &mut String, detail: &ImageDetailView) {
        output.push_str(&format!("# Image {}\n\n", detail.image.id));
        Self::render_images(output, std::slice::from_ref(&detail.image));
        output.push('\n');

        let summary = &detail.severity_summary;
        output.push_str("### Severity Summary\n\n");
        output.push_str("| Critical | High | Medium | Low | Fixable |\n");
        output.push_str("|----------|------|--------|-----|---------|\n");
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n\n",
            summary.critical, summary.high, summary.medium, summary.low, summary.fixable
        ));

        Self::render_sboms(output, &detail.sbom_records);
        output.push('\n');
        Self::render_findings(output, &detail.cve_findings);
    }

    fn render_customers(output: &mut String, customers: &[Customer]) {
        output.push_str("## Customers\n\n");
        if customers.is_empty() {
            Self::empty_notice(output, "customers");
            return;
        }
        output.push_str("| Namespace | Name | Contact | SLA Tier |\n");
        output.push_str("|-----------|------|---------|----------|\n");
        for customer in customers {
            let tier = match customer.sla_tier.as_str() {
                "" => "-",
                other => other,
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                Self::escape_cell(customer.namespace.as_str()),
                Self::escape_cell(&customer.name),
                Self::escape_cell(&customer.contact_info),
                Self::escape_cell(tier)
            ));
        }
    }

    fn render_violations(output: &mut String, violations: &[SlaViolation]) {
        output.push_str("## SLA Violations\n\n");
        if violations.is_empty() {
            Self::empty_notice(output, "SLA violations");
            return;
        }
        output.push_str("| ID | Tenant | CVE Finding | Status | Created | Resolved |\n");
        output.push_str("|----|--------|-------------|--------|---------|----------|\n");
        for violation in violations {
            let resolved = match violation.state {
                ViolationState::Resolved { resolved_at } => {
                    Self::timestamp(&resolved_at)
                }
                ViolationState::Active => "-".to_string(),
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                violation.id,
                Self::escape_cell(violation.tenant_namespace.as_str()),
                violation.cve_finding_id,
                violation.state.label(),
                Self::timestamp(&violation.created_at),
                resolved
            ));
        }
    }

    fn render_audit(output: &mut String, entries: &[AuditLogEntry]) {
        output.push_str("## Audit Log\n\n");
        if entries.is_empty() {
            Self::empty_notice(output, "audit entries");
            return;
        }
        output.push_str("| ID | Time | Action | Actor | Details |\n");
        output.push_str("|----|------|--------|-------|---------|\n");
        for entry in entries {
            let details = serde_json::Value::Object(entry.details.clone()).to_string();
            output.push_str(&format!(
                "| {} | {} | {} | {} | `{}` |\n",
                entry.id.get(),
                Self::timestamp(&entry.created_at),
                Self::escape_cell(&entry.action),
                Self::escape_cell(&entry.actor),
                Self::escape_cell(&details)
            ));
        }
    }

    fn render_sweep(output: &mut String, report: &SlaSweepReport) {
        output.push_str("## SLA Evaluation\n\n");
        output.push_str("| Evaluated | Exempt | Created | Resolved | Failures |\n");
        output.push_str("|-----------|--------|---------|----------|----------|\n");
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            report.evaluated,
            report.exempt,
            report.created,
            report.resolved,
            report.failures.len()
        ));

        if !report.failures.is_empty() {
            output.push_str("\n### Failures\n\n");
            for failure in &report.failures {
                output.push_str(&format!(
                    "- **{}**: {}\n",
                    Self::escape_cell(&failure.tenant_namespace),
                    Self::escape_cell(&failure.error)
                ));
            }
        }
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &LifecycleReport) -> Result<String> {
        let mut output = String::new();

        match report {
            LifecycleReport::Build(event) => {
                output.push_str(&format!("# Build {}\n\n", event.id));
                Self::render_builds(&mut output, std::slice::from_ref(event));
            }
            LifecycleReport::Builds(events) => Self::render_builds(&mut output, events),
            LifecycleReport::Completion(completed) => {
                Self::render_completion(&mut output, completed)
            }
            LifecycleReport::Images(images) => Self::render_images(&mut output, images),
            LifecycleReport::ImageDetail(detail) => {
                Self::render_image_detail(&mut output, detail)
            }
            LifecycleReport::Customer(customer) => {
                output.push_str(&format!("# Customer {}\n\n", customer.namespace));
                Self::render_customers(&mut output, std::slice::from_ref(customer));
            }
            LifecycleReport::Customers(customers) => {
                Self::render_customers(&mut output, customers)
            }
            LifecycleReport::Violations(violations) => {
                Self::render_violations(&mut output, violations)
            }
            LifecycleReport::AuditLog(entries) => Self::render_audit(&mut output, entries),
            LifecycleReport::SlaSweep(sweep) => Self::render_sweep(&mut output, sweep),
        }

        Ok(output)
    }
}
