//! Catalog Module
//!
//! Paged retrieval, lookup and deletion of asset and generation records
//! across the primary store and the fallback backend.

pub mod backend;
pub mod chain;
pub mod cleanup;
pub mod memory;
pub mod page;
pub mod record;
pub mod service;
pub mod source;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::BackendClient;
pub use chain::SourceChain;
pub use cleanup::{CleanupHook, HttpCleanup};
pub use memory::MemoryStore;
pub use page::{
    total_pages, AssetFilter, AssetPage, GenerationQuery, PageRequest, SourcePage, SourceTag,
};
pub use record::{
    AssetDocument, AssetRecord, GenerationDocument, GenerationRecord, MeshyTask, RecordId,
};
pub use service::{CatalogService, DeleteOutcome};
pub use source::CatalogSource;
