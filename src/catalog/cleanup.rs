//! Third-Party Cleanup
//!
//! Removes the external copy of a generation held by the image-generation
//! provider, keyed by the generation's external id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::{AppError, Result};

/// Best-effort removal of an externally hosted generation.
#[async_trait]
pub trait CleanupHook: Send + Sync {
    async fn cleanup(&self, external_id: &str) -> Result<()>;
}

// == HTTP Cleanup ==
/// Issues `DELETE {base_url}/{external_id}`.
#[derive(Debug, Clone)]
pub struct HttpCleanup {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpCleanup {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Internal(format!("invalid cleanup url '{}': {}", base_url, e))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build cleanup client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, external_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Internal(format!("cleanup url {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(external_id);
        Ok(url)
    }
}

#[async_trait]
impl CleanupHook for HttpCleanup {
    async fn cleanup(&self, external_id: &str) -> Result<()> {
        let url = self.endpoint(external_id)?;
        debug!("Cleanup DELETE {}", url);

        let mut request = self.client.delete(url.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Backend(format!(
                "cleanup DELETE {} returned {}",
                url,
                response.status()
            )))
        }
    }
}
