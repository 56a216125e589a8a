//! Request DTOs for the asset service API
//!
//! Query strings accepted by the listing and image endpoints.

use serde::Deserialize;

use crate::catalog::{AssetFilter, GenerationQuery, PageRequest};

/// Query for `GET /assets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAssetsParams {
    /// Optional asset type filter
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 30, clamped to 100)
    pub page_size: Option<u32>,
}

impl ListAssetsParams {
    pub fn filter(&self) -> AssetFilter {
        AssetFilter::new(self.asset_type.clone())
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Query for `GET /generations`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListGenerationsParams {
    pub character_id: Option<String>,
    pub skip: Option<u64>,
    /// Default 50, clamped to 100
    pub limit: Option<u32>,
}

impl ListGenerationsParams {
    pub fn query(&self) -> GenerationQuery {
        GenerationQuery::new(self.character_id.clone(), self.skip, self.limit)
    }
}

/// Query for `GET /images`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageParams {
    /// Image URL, also the cache key
    pub url: String,
    /// Priority loads bypass the admission limit
    #[serde(default)]
    pub priority: bool,
}
