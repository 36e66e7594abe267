//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the ship service over a [`ShipStore`]
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: query-string DTOs and their mapping to domain values
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use shipyard_infra::store::ShipStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(store: Arc<dyn ShipStore>) -> Router {
    let services = Arc::new(services::ShipService::new(store));

    let api = routes::router().layer(Extension(services));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::trace_requests)))
}
