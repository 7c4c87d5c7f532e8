//! Best-effort audit event sink
//!
//! Terminal transfer outcomes are recorded as structured JSON events. The
//! sink is fire-and-forget: the POST runs on a detached task, failures are
//! logged and discarded, and the transfer result is never blocked or
//! altered by audit problems.

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AuditLogger {
    client: Client,
    endpoint: Option<String>,
}

impl AuditLogger {
    pub fn new(endpoint: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }

    /// Sink that only writes to tracing, used when no endpoint is configured
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Emit an event. Returns immediately; delivery happens on a detached
    /// task whose failure is swallowed.
    pub fn emit(&self, mut event: Value) {
        if let Some(obj) = event.as_object_mut() {
            obj.insert("ts".to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        let Some(endpoint) = self.endpoint.clone() else {
            info!(target: "audit", event = %event, "audit event");
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.post(&endpoint).json(&event).send().await {
                warn!("audit event delivery failed: {}", e);
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
