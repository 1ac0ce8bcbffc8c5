//! Orchestrator profile feeds: the public explorer endpoint, or a payload
//! saved to disk.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::error::SpotlightError;
use crate::source::ProfileSource;

pub const DEFAULT_ENDPOINT: &str = "https://explorer.livepeer.org/api/ens-data";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.livepeer.org";

/// Unauthenticated GET against the explorer's profile endpoint.
pub struct ExplorerClient {
    endpoint: String,
    http: Client,
}

impl ExplorerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }
}

impl ProfileSource for ExplorerClient {
    fn origin(&self) -> String {
        self.endpoint.clone()
    }

    async fn fetch_profiles(&self) -> Result<Value> {
        debug!(endpoint = %self.endpoint, "GET");
        let resp = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error requesting {}: {e}", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpotlightError::Http {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        // A body that is not JSON at all is a shape failure, not a transport one.
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("Failed to read body from {}", self.endpoint))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            SpotlightError::MalformedResponse {
                origin: self.endpoint.clone(),
                detail: format!("body is not JSON: {e}"),
            }
            .into()
        })
    }
}

/// A payload previously saved to disk, read instead of hitting the network.
pub struct PayloadFile {
    path: PathBuf,
}

impl PayloadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProfileSource for PayloadFile {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_profiles(&self) -> Result<Value> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_slice(&raw).map_err(|e| {
            SpotlightError::MalformedResponse {
                origin: self.origin(),
                detail: format!("file is not JSON: {e}"),
            }
            .into()
        })
    }
}
