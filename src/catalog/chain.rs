//! Source Chain
//!
//! Ordered list of catalog sources, tried front to back. A source "answers"
//! when it has data; errors and empty results move on to the next source.
//! Listings never fail: when nobody answers they degrade to an empty result.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::page::{AssetFilter, AssetPage, GenerationQuery, PageRequest, SourceTag};
use crate::catalog::record::{AssetRecord, GenerationRecord, RecordId};
use crate::catalog::source::CatalogSource;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct SourceChain {
    sources: Vec<Arc<dyn CatalogSource>>,
}

impl SourceChain {
    /// `sources[0]` is the primary store.
    pub fn new(sources: Vec<Arc<dyn CatalogSource>>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[Arc<dyn CatalogSource>] {
        &self.sources
    }

    pub fn primary(&self) -> Option<&Arc<dyn CatalogSource>> {
        self.sources.first()
    }

    fn primary_tag(&self) -> SourceTag {
        self.primary()
            .map(|source| source.tag())
            .unwrap_or(SourceTag::Primary)
    }

    // == List Assets ==
    /// First source whose filtered set is non-empty wins.
    ///
    /// A source with matches but nothing on the requested page still wins:
    /// an out-of-range page is a legitimate empty answer.
    pub async fn list_assets(&self, filter: &AssetFilter, page: PageRequest) -> AssetPage {
        for source in &self.sources {
            match source.list_assets(filter, page).await {
                Ok(result) if result.total > 0 || !result.items.is_empty() => {
                    return AssetPage::from_source(result, page, source.tag());
                }
                Ok(_) => debug!("{} has no assets matching {:?}", source.name(), filter),
                Err(e) => warn!("{} failed to list assets: {}", source.name(), e),
            }
        }

        info!("No source had assets for {:?}, serving an empty page", filter);
        AssetPage::empty(page, self.primary_tag())
    }

    // == List Generations ==
    /// First source returning at least one record wins. Records from a
    /// fallback source are tagged with their origin.
    pub async fn list_generations(&self, query: &GenerationQuery) -> Vec<GenerationRecord> {
        for source in &self.sources {
            match source.list_generations(query).await {
                Ok(mut records) if !records.is_empty() => {
                    if source.tag() == SourceTag::Fallback {
                        for record in &mut records {
                            record.source = Some(SourceTag::Fallback);
                        }
                    }
                    return records;
                }
                Ok(_) => debug!("{} has no generations for {:?}", source.name(), query),
                Err(e) => warn!("{} failed to list generations: {}", source.name(), e),
            }
        }

        info!("No source had generations for {:?}, serving an empty list", query);
        Vec::new()
    }

    // == Find ==
    /// First source holding the asset wins. `NotFound` if every source
    /// answered "absent", otherwise the last error.
    pub async fn find_asset(&self, id: &RecordId) -> Result<AssetRecord> {
        let mut last_error = None;
        for source in &self.sources {
            match source.get_asset(id).await {
                Ok(Some(record)) => return Ok(record),
                Ok(None) => {}
                Err(e) => {
                    warn!("{} failed to fetch asset {}: {}", source.name(), id, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| AppError::NotFound(format!("asset {}", id))))
    }

    pub async fn find_generation(&self, id: &RecordId) -> Result<GenerationRecord> {
        let mut last_error = None;
        for source in &self.sources {
            match source.get_generation(id).await {
                Ok(Some(record)) => return Ok(record),
                Ok(None) => {}
                Err(e) => {
                    warn!("{} failed to fetch generation {}: {}", source.name(), id, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| AppError::NotFound(format!("generation {}", id))))
    }
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|source| source.name()))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scriptable sources for exercising the chain and the service.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::page::SourcePage;

    /// What a [`ScriptedSource`] does for every call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Behavior {
        Serve,
        Fail,
    }

    /// Source backed by fixed records, optionally failing every call.
    pub struct ScriptedSource {
        pub tag: SourceTag,
        pub behavior: Behavior,
        pub assets: Vec<AssetRecord>,
        pub generations: Mutex<Vec<GenerationRecord>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(tag: SourceTag, behavior: Behavior) -> Self {
            Self {
                tag,
                behavior,
                assets: Vec::new(),
                generations: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_assets(mut self, count: usize) -> Self {
            self.assets = (0..count).map(|i| asset(&format!("asset-{}", i))).collect();
            self
        }

        pub fn with_generations(self, records: Vec<GenerationRecord>) -> Self {
            *self.generations.lock().unwrap() = records;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn enter(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Serve => Ok(()),
                Behavior::Fail => Err(match self.tag {
                    SourceTag::Primary => AppError::Store("store unavailable".to_string()),
                    SourceTag::Fallback => AppError::Backend("backend unavailable".to_string()),
                }),
            }
        }
    }

    pub fn asset(id: &str) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            asset_type: None,
            name: None,
            description: None,
            prompt: None,
            image_url: None,
            image_data_base64: None,
            image_content_type: None,
            model_url: None,
            tags: None,
            created_at: None,
        }
    }

    pub fn generation(id: &str, leo_id: Option<&str>) -> GenerationRecord {
        GenerationRecord {
            id: id.to_string(),
            character_id: None,
            prompt: None,
            status: None,
            image_url: None,
            image_data_base64: None,
            image_content_type: None,
            leo_id: leo_id.map(str::to_string),
            meshy: None,
            created_at: None,
            source: None,
        }
    }

    #[async_trait]
    impl CatalogSource for ScriptedSource {
        fn tag(&self) -> SourceTag {
            self.tag
        }

        fn name(&self) -> &str {
            match self.tag {
                SourceTag::Primary => "scripted-primary",
                SourceTag::Fallback => "scripted-fallback",
            }
        }

        async fn list_assets(
            &self,
            _filter: &AssetFilter,
            page: PageRequest,
        ) -> Result<SourcePage<AssetRecord>> {
            self.enter()?;
            Ok(SourcePage {
                items: self
                    .assets
                    .iter()
                    .skip(page.skip() as usize)
                    .take(page.page_size() as usize)
                    .cloned()
                    .collect(),
                total: self.assets.len() as u64,
            })
        }

        async fn get_asset(&self, id: &RecordId) -> Result<Option<AssetRecord>> {
            self.enter()?;
            Ok(self.assets.iter().find(|a| a.id == id.as_str()).cloned())
        }

        async fn delete_asset(&self, id: &RecordId) -> Result<bool> {
            self.enter()?;
            Ok(self.assets.iter().any(|a| a.id == id.as_str()))
        }

        async fn list_generations(&self, query: &GenerationQuery) -> Result<Vec<GenerationRecord>> {
            self.enter()?;
            Ok(self
                .generations
                .lock()
                .unwrap()
                .iter()
                .skip(query.skip as usize)
                .take(query.limit as usize)
                .cloned()
                .collect())
        }

        async fn get_generation(&self, id: &RecordId) -> Result<Option<GenerationRecord>> {
            self.enter()?;
            Ok(self
                .generations
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == id.as_str())
                .cloned())
        }

        async fn delete_generation(&self, id: &RecordId) -> Result<bool> {
            self.enter()?;
            let mut generations = self.generations.lock().unwrap();
            let before = generations.len();
            generations.retain(|g| g.id != id.as_str());
            Ok(generations.len() < before)
        }
    }
}
