//! Backend Client
//!
//! HTTP client for the companion backend service, used as the fallback
//! source for reads and as the second target of generation deletes. Every
//! call is bounded by the client's request timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::page::{AssetFilter, GenerationQuery, PageRequest, SourcePage, SourceTag};
use crate::catalog::record::{AssetRecord, GenerationRecord, RecordId};
use crate::catalog::source::CatalogSource;
use crate::error::{AppError, Result};

/// Asset listing as the backend returns it.
#[derive(Debug, Deserialize)]
struct BackendAssetPage {
    #[serde(default)]
    assets: Vec<AssetRecord>,
    #[serde(default)]
    total_assets: Option<u64>,
}

// == Backend Client ==
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Internal(format!("invalid backend url '{}': {}", base_url, e))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build backend client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Internal(format!("backend url {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        debug!("Backend GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        read_json(response).await
    }

    async fn delete(&self, url: Url) -> Result<bool> {
        debug!("Backend DELETE {}", url);
        let response = self.client.delete(url.clone()).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(AppError::Backend(format!(
                "DELETE {} returned {}",
                url, status
            ))),
        }
    }
}

/// 404 means absent; any other non-2xx status is an error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(AppError::Backend(format!(
            "GET {} returned {}",
            response.url(),
            status
        )));
    }
    Ok(Some(response.json().await?))
}

#[async_trait]
impl CatalogSource for BackendClient {
    fn tag(&self) -> SourceTag {
        SourceTag::Fallback
    }

    fn name(&self) -> &str {
        "backend"
    }

    async fn list_assets(
        &self,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<SourcePage<AssetRecord>> {
        let mut query = vec![
            ("page", page.page().to_string()),
            ("page_size", page.page_size().to_string()),
        ];
        if let Some(asset_type) = &filter.asset_type {
            query.push(("type", asset_type.clone()));
        }

        let body: Option<BackendAssetPage> =
            self.get_json(self.endpoint(&["assets"])?, &query).await?;
        Ok(match body {
            Some(body) => SourcePage {
                total: body.total_assets.unwrap_or(body.assets.len() as u64),
                items: body.assets,
            },
            None => SourcePage {
                items: Vec::new(),
                total: 0,
            },
        })
    }

    async fn get_asset(&self, id: &RecordId) -> Result<Option<AssetRecord>> {
        self.get_json(self.endpoint(&["assets", id.as_str()])?, &[])
            .await
    }

    async fn delete_asset(&self, id: &RecordId) -> Result<bool> {
        self.delete(self.endpoint(&["assets", id.as_str()])?).await
    }

    async fn list_generations(&self, query: &GenerationQuery) -> Result<Vec<GenerationRecord>> {
        let mut params = vec![
            ("skip", query.skip.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(character_id) = &query.character_id {
            params.push(("character_id", character_id.clone()));
        }

        let body: Option<Vec<GenerationRecord>> = self
            .get_json(self.endpoint(&["generations"])?, &params)
            .await?;
        Ok(body.unwrap_or_default())
    }

    async fn get_generation(&self, id: &RecordId) -> Result<Option<GenerationRecord>> {
        self.get_json(self.endpoint(&["generations", id.as_str()])?, &[])
            .await
    }

    async fn delete_generation(&self, id: &RecordId) -> Result<bool> {
        self.delete(self.endpoint(&["generations", id.as_str()])?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = BackendClient::new("http://backend:8000/api/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["generations", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/api/generations/abc");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let client = BackendClient::new("http://backend:8000", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["assets"]).unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/assets");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            BackendClient::new("::nope::", Duration::from_secs(1)),
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = client
            .list_assets(&AssetFilter::default(), PageRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::Backend(_))));
    }
}
