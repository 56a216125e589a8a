//! Pagination Module
//!
//! Page requests, page arithmetic and the page shapes providers return.

use serde::{Deserialize, Serialize};

use crate::catalog::record::AssetRecord;

pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_GENERATION_LIMIT: u32 = 50;
pub const MAX_GENERATION_LIMIT: u32 = 100;

// == Source Tag ==
/// Which collaborator produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "primary")]
    Primary,
    #[serde(rename = "backend_fallback", alias = "fallback")]
    Fallback,
}

// == Page Request ==
/// A clamped page position: `page >= 1`, `page_size` in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Applies defaults (page 1, size 30) and clamps out-of-range values.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of matching records before this page.
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// `ceil(total / page_size)`.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    total.div_ceil(page_size.max(1) as u64)
}

// == Filters ==
/// Asset listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub asset_type: Option<String>,
}

impl AssetFilter {
    /// Blank type strings mean "no filter".
    pub fn new(asset_type: Option<String>) -> Self {
        Self {
            asset_type: asset_type
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// Generation listing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationQuery {
    pub character_id: Option<String>,
    pub skip: u64,
    pub limit: u32,
}

impl GenerationQuery {
    /// Applies defaults (skip 0, limit 50) and clamps the limit to `[1, 100]`.
    pub fn new(character_id: Option<String>, skip: Option<u64>, limit: Option<u32>) -> Self {
        Self {
            character_id: character_id
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            skip: skip.unwrap_or(0),
            limit: limit
                .unwrap_or(DEFAULT_GENERATION_LIMIT)
                .clamp(1, MAX_GENERATION_LIMIT),
        }
    }
}

impl Default for GenerationQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

// == Pages ==
/// One provider's answer: the requested slice plus the unpaged match count.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// One page of the asset listing, with the collaborator that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPage {
    pub items: Vec<AssetRecord>,
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub source: SourceTag,
}

impl AssetPage {
    pub fn from_source(page: SourcePage<AssetRecord>, request: PageRequest, source: SourceTag) -> Self {
        Self {
            total_pages: total_pages(page.total, request.page_size()),
            total_items: page.total,
            items: page.items,
            current_page: request.page(),
            page_size: request.page_size(),
            source,
        }
    }

    /// The degraded answer when no collaborator had data.
    pub fn empty(request: PageRequest, source: SourceTag) -> Self {
        Self::from_source(
            SourcePage {
                items: Vec::new(),
                total: 0,
            },
            request,
            source,
        )
    }
}
