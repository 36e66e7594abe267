use axum::Router;

pub mod ships;
pub mod system;

/// Router for the ship resource endpoints.
pub fn router() -> Router {
    Router::new().nest("/rest/ships", ships::router())
}
