/// Client for the Scavenger statistics and donation API
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

use super::statistics::{StatisticsResponse, WalletStatistics};
use crate::config::ConsolidateConfig;
use crate::error::ApiError;

/// Result of a donation request the server accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonateStatus {
    Accepted,
    /// 409: the server already holds this assignment
    AlreadyProcessed,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct ScavengerClient {
    client: Client,
    base_url: String,
    statistics_timeout: Duration,
    donate_timeout: Duration,
}

impl ScavengerClient {
    pub fn new(config: &ConsolidateConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("night-consolidate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            statistics_timeout: config.statistics_timeout,
            donate_timeout: config.donate_timeout,
        })
    }

    /// Fetch accrued NIGHT and receipt count for an address
    pub async fn fetch_statistics(&self, address: &str) -> Result<WalletStatistics, ApiError> {
        let url = format!("{}/statistics/{}", self.base_url, address);
        trace!(%url, "fetching statistics");

        let response = self
            .client
            .get(&url)
            .timeout(self.statistics_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("Request failed with status code {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        let parsed: StatisticsResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        parsed.into_statistics()
    }

    /// Submit a signed assignment of `source`'s rights to `destination`
    pub async fn donate_to(
        &self,
        destination: &str,
        source: &str,
        signature_hex: &str,
    ) -> Result<DonateStatus, ApiError> {
        let url = format!(
            "{}/donate_to/{}/{}/{}",
            self.base_url, destination, source, signature_hex
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.donate_timeout)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(source, destination, "donation accepted");
            return Ok(DonateStatus::Accepted);
        }
        if status == StatusCode::CONFLICT {
            debug!(source, destination, "donation already recorded");
            return Ok(DonateStatus::AlreadyProcessed);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
