// src/watch/reload.rs

//! Best-effort reload notifications.
//!
//! After a monitored asset rebuilds, a small JSON payload is PUT to the
//! configured listener so a running consumer can hot-swap the artifact. The
//! call is bounded by a request timeout so a dead listener cannot stall the
//! drain loop; failures of any kind are logged and never retried.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::errors::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ReloadNotifier {
    client: reqwest::Client,
    url: String,
}

impl ReloadNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(anyhow::Error::from)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The notification body for a rebuilt resource.
    pub fn payload(resource: &str) -> serde_json::Value {
        json!({
            "type": "file_modified",
            "resource": resource,
        })
    }

    /// Notify the listener that `resource` (relative to the destination
    /// root) was rebuilt. Never fails the caller.
    pub async fn notify(&self, resource: &str) {
        debug!(resource, url = %self.url, "sending reload notification");

        match self
            .client
            .put(&self.url)
            .json(&Self::payload(resource))
            .send()
            .await
        {
            Ok(response) => match response.status().as_u16() {
                200 | 204 => debug!(resource, "reload listener acknowledged"),
                code => warn!(
                    code,
                    url = %self.url,
                    "reload listener rejected notification"
                ),
            },
            Err(err) => {
                warn!(url = %self.url, error = %err, "reload notification failed");
            }
        }
    }
}
