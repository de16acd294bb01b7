use crate::application::read_models::LifecycleReport;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// JsonFormatter adapter rendering reports as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &LifecycleReport) -> Result<String> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| anyhow::anyhow!("Failed to serialize report to JSON: {}", e))?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::read_models::SlaSweepReport;
    use crate::lifecycle::domain::{
        BuildEvent, BuildEventId, BuildState, ImageId, TenantNamespace, TriggerType,
    };
    use chrono::{TimeZone, Utc};

    fn create_test_event(state: BuildState) -> BuildEvent {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        BuildEvent {
            id: BuildEventId::new(3),
            tenant_namespace: TenantNamespace::new("acme").unwrap(),
            trigger_type: TriggerType::Webhook,
            state,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_format_pending_build() {
        let report = LifecycleReport::Build(create_test_event(BuildState::Pending));
        let json = JsonFormatter::new().format(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["tenant_namespace"], "acme");
        assert_eq!(value["trigger_type"], "webhook");
        assert_eq!(value["status"], "pending");
        assert!(value.get("image_id").is_none());
    }

    #[test]
    fn test_format_completed_build_carries_image_id() {
        let report = LifecycleReport::Build(create_test_event(BuildState::Completed {
            image_id: ImageId::new(11),
        }));
        let json = JsonFormatter::new().format(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(value["image_id"], 11);
    }

    #[test]
    fn test_format_sweep_report() {
        let report = LifecycleReport::SlaSweep(SlaSweepReport {
            evaluated: 2,
            created: 1,
            ..SlaSweepReport::default()
        });
        let json = JsonFormatter::new().format(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["evaluated"], 2);
        assert_eq!(value["created"], 1);
        assert_eq!(value["failures"], serde_json::json!([]));
    }
}
