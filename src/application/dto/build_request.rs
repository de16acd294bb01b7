use crate::lifecycle::domain::{TenantNamespace, TriggerType};
use crate::shared::LifecycleResult;

/// Actor recorded for audit entries when the caller does not name one
pub const DEFAULT_ACTOR: &str = "system";

/// BuildRequest - request DTO for starting a build
///
/// Raw labels are validated into domain types by `new`, so a constructed
/// request always names a valid tenant and trigger source.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub tenant_namespace: TenantNamespace,
    pub trigger_type: TriggerType,
    /// Identity recorded as the actor of the `build_triggered` audit entry
    pub actor: String,
}

impl BuildRequest {
    pub fn new(tenant_namespace: &str, trigger_type: &str) -> LifecycleResult<Self> {
        Ok(Self {
            tenant_namespace: TenantNamespace::new(tenant_namespace.trim())?,
            trigger_type: TriggerType::parse(trigger_type)?,
            actor: DEFAULT_ACTOR.to_string(),
        })
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        let actor = actor.into();
        if !actor.trim().is_empty() {
            self.actor = actor;
        }
        self
    }
}
