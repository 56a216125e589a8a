//! API Routes
//!
//! Configures the Axum router with all asset service endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_images_handler, delete_asset_handler, delete_generation_handler, get_asset_handler,
    health_handler, image_handler, image_stats_handler, list_assets_handler,
    list_generations_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /assets` - Page through assets
/// - `GET /assets/:id` / `DELETE /assets/:id` - Single asset
/// - `GET /generations` - List generations
/// - `DELETE /generations/:id` - Delete a generation everywhere
/// - `GET /images` - Image through the cache
/// - `GET /images/stats` - Image cache statistics
/// - `DELETE /images` - Clear the image cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, method and header
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assets", get(list_assets_handler))
        .route(
            "/assets/:id",
            get(get_asset_handler).delete(delete_asset_handler),
        )
        .route("/generations", get(list_generations_handler))
        .route("/generations/:id", delete(delete_generation_handler))
        .route("/images", get(image_handler).delete(clear_images_handler))
        .route("/images/stats", get(image_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
