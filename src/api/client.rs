//! Synchronous HTTP client for the bot status API.
//!
//! Uses `ureq` with JSON decoding. Every call is a single attempt: network
//! failures, non-2xx responses and undecodable bodies all surface as errors
//! and are handled by the fetcher, which never retries within a cycle.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::DashboardApi;
use crate::config::schema::ApiConfig;
use crate::model::{GuildsResponse, HealthResponse, StatusResponse};

const STATUS_PATH: &str = "/api/status";
const GUILDS_PATH: &str = "/api/guilds";
const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    /// `None` keeps the transport default.
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Build a client from the resolved `[api]` config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Base URL without a trailing slash, for display.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let mut request = ureq::get(&url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let resp = request
            .call()
            .with_context(|| format!("request to {path} failed"))?;

        resp.into_json()
            .with_context(|| format!("failed to parse {path} response"))
    }
}

impl DashboardApi for ApiClient {
    fn fetch_status(&self) -> Result<StatusResponse> {
        self.get_json(STATUS_PATH)
    }

    fn fetch_guilds(&self) -> Result<GuildsResponse> {
        self.get_json(GUILDS_PATH)
    }

    fn fetch_health(&self) -> Result<HealthResponse> {
        self.get_json(HEALTH_PATH)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
