//! In-Memory Document Store
//!
//! Primary store holding asset and generation documents in insertion order.
//! Queries filter, count and slice under a single lock, so the count and the
//! page always describe the same snapshot.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::page::{AssetFilter, GenerationQuery, PageRequest, SourcePage, SourceTag};
use crate::catalog::record::{
    AssetDocument, AssetRecord, GenerationDocument, GenerationRecord, RecordId,
};
use crate::catalog::source::CatalogSource;
use crate::error::{AppError, Result};

/// Shape of a seed file.
#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    assets: Vec<AssetDocument>,
    #[serde(default)]
    generations: Vec<GenerationDocument>,
}

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    assets: RwLock<Vec<AssetDocument>>,
    generations: RwLock<Vec<GenerationDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from seed JSON: `{"assets": [...], "generations": [...]}`.
    pub fn from_seed_json(json: &str) -> Result<Self> {
        let seed: SeedFile = serde_json::from_str(json)
            .map_err(|e| AppError::Internal(format!("invalid catalog seed: {}", e)))?;
        Ok(Self {
            assets: RwLock::new(seed.assets),
            generations: RwLock::new(seed.generations),
        })
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let store = Self::from_seed_json(&json)?;
        info!(
            "Seeded catalog from {}: {} assets, {} generations",
            path.display(),
            store.assets.read().await.len(),
            store.generations.read().await.len()
        );
        Ok(store)
    }

    pub async fn insert_asset(&self, document: AssetDocument) {
        self.assets.write().await.push(document);
    }

    pub async fn insert_generation(&self, document: GenerationDocument) {
        self.generations.write().await.push(document);
    }

    pub async fn asset_count(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn generation_count(&self) -> usize {
        self.generations.read().await.len()
    }
}

fn matches_filter(document: &AssetDocument, filter: &AssetFilter) -> bool {
    match &filter.asset_type {
        Some(wanted) => document.asset_type.as_deref() == Some(wanted.as_str()),
        None => true,
    }
}

#[async_trait]
impl CatalogSource for MemoryStore {
    fn tag(&self) -> SourceTag {
        SourceTag::Primary
    }

    fn name(&self) -> &str {
        "memory-store"
    }

    async fn list_assets(
        &self,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<SourcePage<AssetRecord>> {
        let assets = self.assets.read().await;
        let matching: Vec<&AssetDocument> = assets
            .iter()
            .filter(|doc| matches_filter(doc, filter))
            .collect();

        let items = matching
            .iter()
            .skip(page.skip() as usize)
            .take(page.page_size() as usize)
            .map(|doc| doc.project())
            .collect();

        Ok(SourcePage {
            items,
            total: matching.len() as u64,
        })
    }

    async fn get_asset(&self, id: &RecordId) -> Result<Option<AssetRecord>> {
        let assets = self.assets.read().await;
        Ok(assets
            .iter()
            .find(|doc| doc.id.eq_ignore_ascii_case(id.as_str()))
            .map(AssetDocument::project))
    }

    async fn delete_asset(&self, id: &RecordId) -> Result<bool> {
        let mut assets = self.assets.write().await;
        let before = assets.len();
        assets.retain(|doc| !doc.id.eq_ignore_ascii_case(id.as_str()));
        Ok(assets.len() < before)
    }

    async fn list_generations(&self, query: &GenerationQuery) -> Result<Vec<GenerationRecord>> {
        let generations = self.generations.read().await;
        Ok(generations
            .iter()
            .filter(|doc| match &query.character_id {
                Some(wanted) => doc.character_id.as_deref() == Some(wanted.as_str()),
                None => true,
            })
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .map(GenerationDocument::project)
            .collect())
    }

    async fn get_generation(&self, id: &RecordId) -> Result<Option<GenerationRecord>> {
        let generations = self.generations.read().await;
        Ok(generations
            .iter()
            .find(|doc| doc.id.eq_ignore_ascii_case(id.as_str()))
            .map(GenerationDocument::project))
    }

    async fn delete_generation(&self, id: &RecordId) -> Result<bool> {
        let mut generations = self.generations.write().await;
        let before = generations.len();
        generations.retain(|doc| !doc.id.eq_ignore_ascii_case(id.as_str()));
        Ok(generations.len() < before)
    }
}
