//! Catalog Source Trait
//!
//! The seam between the catalog service and the collaborators that hold
//! asset and generation records.

use async_trait::async_trait;

use crate::catalog::page::{AssetFilter, GenerationQuery, PageRequest, SourcePage, SourceTag};
use crate::catalog::record::{AssetRecord, GenerationRecord, RecordId};
use crate::error::Result;

/// A collaborator holding catalog records.
///
/// Implementations return records already projected: string ids, base64
/// image payloads, no embeddings.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Tag stamped on results this source produces.
    fn tag(&self) -> SourceTag;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// One page of assets matching `filter`, plus the unpaged match count.
    async fn list_assets(
        &self,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<SourcePage<AssetRecord>>;

    async fn get_asset(&self, id: &RecordId) -> Result<Option<AssetRecord>>;

    /// `Ok(false)` when the record was not there.
    async fn delete_asset(&self, id: &RecordId) -> Result<bool>;

    async fn list_generations(&self, query: &GenerationQuery) -> Result<Vec<GenerationRecord>>;

    async fn get_generation(&self, id: &RecordId) -> Result<Option<GenerationRecord>>;

    async fn delete_generation(&self, id: &RecordId) -> Result<bool>;
}
