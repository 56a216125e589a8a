//! Response DTOs for the asset service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::catalog::{AssetPage, AssetRecord, SourceTag};

/// Response body for `GET /assets`
#[derive(Debug, Clone, Serialize)]
pub struct AssetPageResponse {
    pub assets: Vec<AssetRecord>,
    pub total_assets: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
    /// Collaborator that produced the page
    pub source: SourceTag,
}

impl From<AssetPage> for AssetPageResponse {
    fn from(page: AssetPage) -> Self {
        Self {
            assets: page.items,
            total_assets: page.total_items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            page_size: page.page_size,
            source: page.source,
        }
    }
}

/// Response body for `GET /images`
///
/// `loaded == false` with an empty `data_uri` means the image was not
/// served from the cache and the client should load `url` itself.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub url: String,
    pub loaded: bool,
    pub data_uri: String,
}

impl ImageResponse {
    pub fn new(url: impl Into<String>, data_uri: String) -> Self {
        Self {
            url: url.into(),
            loaded: !data_uri.is_empty(),
            data_uri,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
