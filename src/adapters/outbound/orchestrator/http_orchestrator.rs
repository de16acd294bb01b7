use crate::lifecycle::domain::BuildEvent;
use crate::ports::outbound::BuildOrchestrator;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Body posted to the builder for each requested build
#[derive(Debug, Serialize)]
struct TriggerRequest<'a> {
    build_event_id: i64,
    tenant_namespace: &'a str,
    trigger_type: &'a str,
}

/// HttpBuildOrchestrator adapter that notifies the builder over a webhook
///
/// Each trigger is a single `POST {endpoint}/builds/{tenant}`. Failures are
/// returned to the caller as-is; this adapter never retries.
pub struct HttpBuildOrchestrator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBuildOrchestrator {
    /// Creates an orchestrator client for the given builder endpoint
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the builder (`http://` or `https://`)
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    /// Returns an error if the endpoint is not an HTTP(S) URL or the client
    /// cannot be built
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            anyhow::bail!(
                "Orchestrator endpoint must start with http:// or https://, got '{}'",
                endpoint
            );
        }

        let user_agent = format!("image-lifecycle/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn trigger_url(&self, event: &BuildEvent) -> String {
        format!(
            "{}/builds/{}",
            self.endpoint,
            urlencoding::encode(event.tenant_namespace.as_str())
        )
    }
}

#[async_trait]
impl BuildOrchestrator for HttpBuildOrchestrator {
    async fn trigger_build(&self, event: &BuildEvent) -> Result<()> {
        let url = self.trigger_url(event);
        let body = TriggerRequest {
            build_event_id: event.id.get(),
            tenant_namespace: event.tenant_namespace.as_str(),
            trigger_type: event.trigger_type.as_str(),
        };

        tracing::debug!(build_event_id = %event.id, url = %url, "posting build trigger");
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Builder returned status code {}", response.status());
        }

        Ok(())
    }
}
