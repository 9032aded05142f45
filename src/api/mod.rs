//! Access to the remote bot status API.
//!
//! [`DashboardApi`] is the seam the fetcher depends on; [`ApiClient`] is the
//! HTTP implementation.

pub mod client;

use anyhow::Result;

use crate::model::{GuildsResponse, HealthResponse, StatusResponse};

pub use client::ApiClient;

/// The three endpoints polled every cycle.
pub trait DashboardApi {
    /// `GET /api/status`
    fn fetch_status(&self) -> Result<StatusResponse>;
    /// `GET /api/guilds`
    fn fetch_guilds(&self) -> Result<GuildsResponse>;
    /// `GET /health`
    fn fetch_health(&self) -> Result<HealthResponse>;
}
