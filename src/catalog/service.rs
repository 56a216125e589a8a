//! Catalog Service
//!
//! Entry point for asset and generation operations. Ids are validated here
//! before any collaborator is touched.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::catalog::chain::SourceChain;
use crate::catalog::cleanup::CleanupHook;
use crate::catalog::page::{AssetFilter, AssetPage, GenerationQuery, PageRequest};
use crate::catalog::record::{AssetRecord, GenerationRecord, RecordId};
use crate::error::{AppError, Result};

/// Result of a delete that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

pub struct CatalogService {
    chain: SourceChain,
    cleanup: Option<Arc<dyn CleanupHook>>,
}

impl CatalogService {
    pub fn new(chain: SourceChain, cleanup: Option<Arc<dyn CleanupHook>>) -> Self {
        Self { chain, cleanup }
    }

    pub fn chain(&self) -> &SourceChain {
        &self.chain
    }

    // == Assets ==
    /// One page of assets. Never fails; see [`SourceChain::list_assets`].
    pub async fn list_assets(&self, filter: &AssetFilter, page: PageRequest) -> AssetPage {
        self.chain.list_assets(filter, page).await
    }

    pub async fn get_asset_by_id(&self, raw_id: &str) -> Result<AssetRecord> {
        let id = RecordId::parse(raw_id)?;
        self.chain.find_asset(&id).await
    }

    /// Assets only live in the primary store.
    pub async fn delete_asset(&self, raw_id: &str) -> Result<DeleteOutcome> {
        let id = RecordId::parse(raw_id)?;
        let primary = self
            .chain
            .primary()
            .ok_or_else(|| AppError::Internal("no primary store configured".to_string()))?;

        if primary.delete_asset(&id).await? {
            info!("Deleted asset {}", id);
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    // == Generations ==
    /// Generations for a character window. Never fails.
    pub async fn list_generations(&self, query: &GenerationQuery) -> Vec<GenerationRecord> {
        self.chain.list_generations(query).await
    }

    /// Deletes a generation from every source that may hold it, then asks
    /// the third-party provider to drop its copy.
    ///
    /// Succeeds if any source confirmed the delete. The third-party call
    /// never affects the outcome.
    pub async fn delete_generation(&self, raw_id: &str) -> Result<DeleteOutcome> {
        let id = RecordId::parse(raw_id)?;

        let external_id = match self.chain.find_generation(&id).await {
            Ok(record) => record.leo_id,
            Err(AppError::NotFound(_)) => None,
            Err(e) => {
                warn!("Could not look up generation {} before delete: {}", id, e);
                None
            }
        };

        let id_ref = &id;
        let results = join_all(self.chain.sources().iter().map(|source| async move {
            (
                source.name().to_string(),
                source.delete_generation(id_ref).await,
            )
        }))
        .await;

        let mut deleted = false;
        let mut last_error = None;
        for (name, result) in results {
            match result {
                Ok(true) => {
                    info!("Deleted generation {} from {}", id, name);
                    deleted = true;
                }
                Ok(false) => debug!("Generation {} was not in {}", id, name),
                Err(e) => {
                    warn!("Failed to delete generation {} from {}: {}", id, name, e);
                    last_error = Some(e);
                }
            }
        }

        if let (Some(hook), Some(external_id)) = (&self.cleanup, external_id.as_deref()) {
            match hook.cleanup(external_id).await {
                Ok(()) => info!("Removed external copy {} of generation {}", external_id, id),
                Err(e) => warn!(
                    "External cleanup of {} for generation {} failed: {}",
                    external_id, id, e
                ),
            }
        }

        match (deleted, last_error) {
            (true, _) => Ok(DeleteOutcome::Deleted),
            (false, Some(e)) => Err(e),
            (false, None) => Ok(DeleteOutcome::NotFound),
        }
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("chain", &self.chain)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}
