//! API Module
//!
//! HTTP handlers and routing for the asset service REST API.
//!
//! # Endpoints
//! - `GET /assets`, `GET|DELETE /assets/:id`
//! - `GET /generations`, `DELETE /generations/:id`
//! - `GET|DELETE /images`, `GET /images/stats`
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
