//! HTTP client for the neuroplayd daemon.

use anyhow::{Context, Result};
use neuroplay_common::{HealthResponse, JobStatusResponse, RegisterStudentRequest, SubmitAck};
use serde_json::Value;
use std::time::Duration;

/// Thin wrapper over the daemon's HTTP API.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn submit(&self, session: &Value) -> Result<SubmitAck> {
        let url = format!("{}/v1/gameplay/sync", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(session)
            .send()
            .await
            .with_context(|| format!("daemon unreachable at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("submission rejected ({status}): {body}");
        }
        Ok(response.json().await.context("malformed submit response")?)
    }

    /// Poll a job. Non-2xx statuses still carry a tagged body (e.g. 404
    /// for a job the daemon does not know), so decode unconditionally.
    pub async fn status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let url = format!("{}/v1/gameplay/session/{job_id}/status", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("daemon unreachable at {}", self.base_url))?;
        Ok(response.json().await.context("malformed status response")?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/v1/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("daemon unreachable at {}", self.base_url))?;
        Ok(response.json().await.context("malformed health response")?)
    }

    pub async fn register(&self, request: &RegisterStudentRequest) -> Result<Value> {
        let url = format!("{}/v1/students", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("daemon unreachable at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("registration rejected ({status}): {body}");
        }
        Ok(response.json().await.context("malformed register response")?)
    }
}
