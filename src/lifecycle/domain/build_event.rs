use super::{ImageId, TenantNamespace};
use crate::shared::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length for integration trigger names
const MAX_INTEGRATION_NAME_LENGTH: usize = 64;

/// Identity of a build event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildEventId(i64);

impl BuildEventId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BuildEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BuildEventId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(BuildEventId)
            .map_err(|_| format!("Invalid build event id: {}", s))
    }
}

/// Status label of a build event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Pending,
    Completed,
    Failed,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Completed => "completed",
            BuildStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, BuildStatus::Pending)
    }

    /// The only legal transitions are `pending -> completed` and `pending -> failed`.
    pub fn can_transition_to(self, next: BuildStatus) -> bool {
        matches!(
            (self, next),
            (BuildStatus::Pending, BuildStatus::Completed)
                | (BuildStatus::Pending, BuildStatus::Failed)
        )
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BuildStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BuildStatus::Pending),
            "completed" => Ok(BuildStatus::Completed),
            "failed" => Ok(BuildStatus::Failed),
            _ => Err(format!("Unknown build status: {}", s)),
        }
    }
}

/// State of a build event
///
/// The image reference only exists in the `Completed` variant, so a completed
/// build without an image (or a pending build with one) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildState {
    Pending,
    Completed { image_id: ImageId },
    Failed,
}

impl BuildState {
    pub fn status(&self) -> BuildStatus {
        match self {
            BuildState::Pending => BuildStatus::Pending,
            BuildState::Completed { .. } => BuildStatus::Completed,
            BuildState::Failed => BuildStatus::Failed,
        }
    }

    pub fn image_id(&self) -> Option<ImageId> {
        match self {
            BuildState::Completed { image_id } => Some(*image_id),
            _ => None,
        }
    }

    /// Rebuilds a state from its stored columns, rejecting inconsistent pairs.
    pub fn from_parts(status: BuildStatus, image_id: Option<ImageId>) -> Result<Self, String> {
        match (status, image_id) {
            (BuildStatus::Pending, None) => Ok(BuildState::Pending),
            (BuildStatus::Completed, Some(image_id)) => Ok(BuildState::Completed { image_id }),
            (BuildStatus::Failed, None) => Ok(BuildState::Failed),
            (status, image_id) => Err(format!(
                "build status '{}' is inconsistent with image reference {:?}",
                status,
                image_id.map(ImageId::get)
            )),
        }
    }
}

/// A requested move out of `pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTransition {
    Complete { image_id: ImageId },
    Fail,
}

impl BuildTransition {
    pub fn target(self) -> BuildState {
        match self {
            BuildTransition::Complete { image_id } => BuildState::Completed { image_id },
            BuildTransition::Fail => BuildState::Failed,
        }
    }

    pub fn target_status(self) -> BuildStatus {
        self.target().status()
    }
}

/// Source that requested a build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Api,
    Webhook,
    /// A named third-party integration (e.g. `github-actions`)
    Integration(String),
}

impl TriggerType {
    pub fn parse(label: &str) -> LifecycleResult<Self> {
        let label = label.trim();
        match label {
            "api" => Ok(TriggerType::Api),
            "webhook" => Ok(TriggerType::Webhook),
            "" => Err(LifecycleError::validation("trigger type cannot be empty")),
            name => {
                if name.len() > MAX_INTEGRATION_NAME_LENGTH {
                    return Err(LifecycleError::validation(format!(
                        "trigger type is too long ({} bytes). Maximum allowed: {} bytes",
                        name.len(),
                        MAX_INTEGRATION_NAME_LENGTH
                    )));
                }
                let valid = name.chars().all(|c| {
                    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
                });
                if !valid {
                    return Err(LifecycleError::validation(format!(
                        "trigger type '{}' is not recognized. Use 'api', 'webhook' or a lowercase integration name.",
                        name
                    )));
                }
                Ok(TriggerType::Integration(name.to_string()))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TriggerType::Api => "api",
            TriggerType::Webhook => "webhook",
            TriggerType::Integration(name) => name,
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TriggerType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The tracked unit of work for one build attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildEvent {
    pub id: BuildEventId,
    pub tenant_namespace: TenantNamespace,
    pub trigger_type: TriggerType,
    #[serde(flatten)]
    pub state: BuildState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuildEvent {
    pub fn status(&self) -> BuildStatus {
        self.state.status()
    }

    /// Checks the state machine before attempting a transition.
    pub fn ensure_transition(&self, next: BuildStatus) -> LifecycleResult<()> {
        let current = self.status();
        if current.can_transition_to(next) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidStateTransition {
                build_event_id: self.id,
                from: current,
                to: next,
            })
        }
    }
}

/// Data for a freshly requested build; always persisted as `pending`
#[derive(Debug, Clone, PartialEq)]
pub struct NewBuildEvent {
    pub tenant_namespace: TenantNamespace,
    pub trigger_type: TriggerType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(state: BuildState) -> BuildEvent {
        let now = Utc::now();
        BuildEvent {
            id: BuildEventId::new(42),
            tenant_namespace: TenantNamespace::new("acme").unwrap(),
            trigger_type: TriggerType::Api,
            state,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_transitions() {
        assert!(BuildStatus::Pending.can_transition_to(BuildStatus::Completed));
        assert!(BuildStatus::Pending.can_transition_to(BuildStatus::Failed));
        assert!(!BuildStatus::Pending.can_transition_to(BuildStatus::Pending));
        assert!(!BuildStatus::Completed.can_transition_to(BuildStatus::Failed));
        assert!(!BuildStatus::Completed.can_transition_to(BuildStatus::Completed));
        assert!(!BuildStatus::Failed.can_transition_to(BuildStatus::Completed));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<BuildStatus>().unwrap(), BuildStatus::Pending);
        assert_eq!(
            "completed".parse::<BuildStatus>().unwrap(),
            BuildStatus::Completed
        );
        assert!("done".parse::<BuildStatus>().is_err());
    }

    #[test]
    fn test_state_from_parts() {
        let image_id = ImageId::new(3);
        assert_eq!(
            BuildState::from_parts(BuildStatus::Completed, Some(image_id)).unwrap(),
            BuildState::Completed { image_id }
        );
        assert_eq!(
            BuildState::from_parts(BuildStatus::Pending, None).unwrap(),
            BuildState::Pending
        );
        assert!(BuildState::from_parts(BuildStatus::Completed, None).is_err());
        assert!(BuildState::from_parts(BuildStatus::Pending, Some(image_id)).is_err());
    }

    #[test]
    fn test_ensure_transition_rejects_completed_event() {
        let event = sample_event(BuildState::Completed {
            image_id: ImageId::new(1),
        });
        let err = event.ensure_transition(BuildStatus::Completed).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidStateTransition {
                from: BuildStatus::Completed,
                to: BuildStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn test_ensure_transition_allows_pending_event() {
        let event = sample_event(BuildState::Pending);
        assert!(event.ensure_transition(BuildStatus::Completed).is_ok());
        assert!(event.ensure_transition(BuildStatus::Failed).is_ok());
    }

    #[test]
    fn test_trigger_type_parse() {
        assert_eq!(TriggerType::parse("api").unwrap(), TriggerType::Api);
        assert_eq!(TriggerType::parse("webhook").unwrap(), TriggerType::Webhook);
        assert_eq!(
            TriggerType::parse("github-actions").unwrap(),
            TriggerType::Integration("github-actions".to_string())
        );
        assert!(TriggerType::parse("").is_err());
        assert!(TriggerType::parse("Git Hub").is_err());
        assert!(TriggerType::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_build_event_serializes_flat_state() {
        let event = sample_event(BuildState::Completed {
            image_id: ImageId::new(5),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["image_id"], 5);
        assert_eq!(json["trigger_type"], "api");
        assert_eq!(json["tenant_namespace"], "acme");
    }
}
