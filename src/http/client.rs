use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::BackendConfig;
use crate::pledge::{ApplicationRecord, ApplicationRecordWriter, BackendError};

/// HTTP client for the backend that mirrors pledge applications
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    applications_path: String,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        applications_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            applications_path: applications_path.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(
            config.api_base_url.clone(),
            config.applications_path.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    /// Endpoint receiving new applications
    pub fn applications_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.applications_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ApplicationRecordWriter for BackendClient {
    async fn persist(&self, record: &ApplicationRecord) -> Result<(), BackendError> {
        let url = self.applications_url();
        debug!(url = %url, applicant = %record.applicant_address, "Posting application record");

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(status = status.as_u16(), "Application record accepted");
        Ok(())
    }
}
