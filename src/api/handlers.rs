//! API Handlers
//!
//! HTTP request handlers for each asset service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::cache::{
    parse_image_url, ImageCache, ImageCacheConfig, ImageCacheStats, ImageFetcher,
};
use crate::catalog::{
    AssetRecord, BackendClient, CatalogService, CatalogSource, CleanupHook, DeleteOutcome,
    GenerationRecord, HttpCleanup, MemoryStore, SourceChain,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AssetPageResponse, HealthResponse, ImageParams, ImageResponse, ListAssetsParams,
    ListGenerationsParams,
};

/// Application state shared across all handlers.
///
/// The image cache and catalog are built once here and handed to every
/// handler; clones share the same instances.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub images: ImageCache,
    pub fetcher: ImageFetcher,
}

impl AppState {
    pub fn new(catalog: CatalogService, images: ImageCache, fetcher: ImageFetcher) -> Self {
        Self {
            catalog: Arc::new(catalog),
            images,
            fetcher,
        }
    }

    /// Wires the primary store, backend fallback, cleanup hook and image
    /// cache from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let primary = match &config.catalog_seed_path {
            Some(path) => MemoryStore::from_seed_file(path).await?,
            None => MemoryStore::new(),
        };
        let backend = BackendClient::new(&config.backend_url, config.backend_timeout())?;
        let chain = SourceChain::new(vec![
            Arc::new(primary) as Arc<dyn CatalogSource>,
            Arc::new(backend) as Arc<dyn CatalogSource>,
        ]);

        let cleanup = match &config.cleanup_api_url {
            Some(url) => Some(Arc::new(HttpCleanup::new(
                url,
                config.cleanup_api_key.clone(),
                config.backend_timeout(),
            )?) as Arc<dyn CleanupHook>),
            None => None,
        };

        let images = ImageCache::new(ImageCacheConfig {
            max_size: config.image_cache_max_entries,
            max_age: config.image_max_age(),
            load_limit: config.image_load_limit,
        });
        let fetcher =
            ImageFetcher::new(std::time::Duration::from_secs(config.image_fetch_timeout))?;

        Ok(Self::new(
            CatalogService::new(chain, cleanup),
            images,
            fetcher,
        ))
    }
}

/// Handler for GET /assets
///
/// Never fails: an empty page means "no data yet".
pub async fn list_assets_handler(
    State(state): State<AppState>,
    Query(params): Query<ListAssetsParams>,
) -> Json<AssetPageResponse> {
    let page = state
        .catalog
        .list_assets(&params.filter(), params.page_request())
        .await;
    Json(AssetPageResponse::from(page))
}

/// Handler for GET /assets/:id
pub async fn get_asset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssetRecord>> {
    let record = state.catalog.get_asset_by_id(&id).await?;
    Ok(Json(record))
}

/// Handler for DELETE /assets/:id
pub async fn delete_asset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    match state.catalog.delete_asset(&id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("asset {}", id))),
    }
}

/// Handler for GET /generations
pub async fn list_generations_handler(
    State(state): State<AppState>,
    Query(params): Query<ListGenerationsParams>,
) -> Json<Vec<GenerationRecord>> {
    Json(state.catalog.list_generations(&params.query()).await)
}

/// Handler for DELETE /generations/:id
///
/// 204 when any collaborator deleted the record, 500 when every
/// collaborator failed.
pub async fn delete_generation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    match state.catalog.delete_generation(&id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("generation {}", id))),
    }
}

/// Handler for GET /images
///
/// Serves the image through the cache. A declined or failed load answers
/// 200 with `loaded: false` so the client falls back to a direct load.
pub async fn image_handler(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
) -> Result<Json<ImageResponse>> {
    let url = parse_image_url(&params.url)?;
    let key = url.to_string();
    let fetcher = state.fetcher.clone();

    let data_uri = state
        .images
        .get_image(&key, move || async move { fetcher.fetch(url).await }, params.priority)
        .await;

    Ok(Json(ImageResponse::new(key, data_uri)))
}

/// Handler for GET /images/stats
pub async fn image_stats_handler(State(state): State<AppState>) -> Json<ImageCacheStats> {
    Json(state.images.stats())
}

/// Handler for DELETE /images
pub async fn clear_images_handler(State(state): State<AppState>) -> StatusCode {
    state.images.clear();
    info!("Image cache cleared");
    StatusCode::NO_CONTENT
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AssetDocument, GenerationDocument};
    use std::time::Duration;

    const ID: &str = "65f1a2b3c4d5e6f708192a3b";

    async fn state_with(store: MemoryStore) -> AppState {
        let chain = SourceChain::new(vec![Arc::new(store) as Arc<dyn CatalogSource>]);
        AppState::new(
            CatalogService::new(chain, None),
            ImageCache::new(ImageCacheConfig::default()),
            ImageFetcher::new(Duration::from_secs(1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_list_assets_handler_pages() {
        let store = MemoryStore::new();
        for _ in 0..12 {
            store.insert_asset(AssetDocument::default()).await;
        }
        let state = state_with(store).await;

        let params = ListAssetsParams {
            page: Some(2),
            page_size: Some(5),
            ..Default::default()
        };
        let response = list_assets_handler(State(state), Query(params)).await;

        assert_eq!(response.assets.len(), 5);
        assert_eq!(response.total_assets, 12);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.current_page, 2);
    }

    #[tokio::test]
    async fn test_get_asset_handler() {
        let store = MemoryStore::new();
        store
            .insert_asset(AssetDocument {
                id: ID.to_string(),
                name: Some("Paladin".to_string()),
                ..Default::default()
            })
            .await;
        let state = state_with(store).await;

        let found = get_asset_handler(State(state.clone()), Path(ID.to_string()))
            .await
            .unwrap();
        assert_eq!(found.name.as_deref(), Some("Paladin"));

        let malformed = get_asset_handler(State(state), Path("nope".to_string())).await;
        assert!(matches!(malformed, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_numeric_asset_id_can_be_fetched_and_deleted() {
        let store = MemoryStore::from_seed_json(r#"{"assets": [{"id": 42, "type": "prop"}]}"#)
            .unwrap();
        let state = state_with(store).await;

        let found = get_asset_handler(State(state.clone()), Path("42".to_string()))
            .await
            .unwrap();
        assert_eq!(found.id, "42");

        let status = delete_asset_handler(State(state.clone()), Path("42".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let gone = get_asset_handler(State(state), Path("42".to_string())).await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_generation_handler() {
        let store = MemoryStore::new();
        store
            .insert_generation(GenerationDocument {
                id: ID.to_string(),
                ..Default::default()
            })
            .await;
        let state = state_with(store).await;

        let status = delete_generation_handler(State(state.clone()), Path(ID.to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let again = delete_generation_handler(State(state), Path(ID.to_string())).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_image_handler_rejects_non_http_url() {
        let state = state_with(MemoryStore::new()).await;
        let params = ImageParams {
            url: "ftp://x/a.png".to_string(),
            priority: false,
        };

        let result = image_handler(State(state), Query(params)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_image_handler_serves_cached_entry() {
        let state = state_with(MemoryStore::new()).await;
        state.images.set("https://cdn.example.com/a.png", "AA==", "image/png");

        let params = ImageParams {
            url: "https://cdn.example.com/a.png".to_string(),
            priority: false,
        };
        let response = image_handler(State(state), Query(params)).await.unwrap();

        assert!(response.loaded);
        assert_eq!(response.data_uri, "data:image/png;base64,AA==");
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
