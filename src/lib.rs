//! Asset Vault - asset catalog service with a coalescing image cache
//!
//! Pages asset and generation records out of a primary store with fallback
//! to a companion backend, and serves images through a bounded cache.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::ImageCache;
pub use catalog::CatalogService;
pub use config::Config;
