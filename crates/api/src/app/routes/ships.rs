use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use shipyard_core::ShipId;
use shipyard_ships::ShipPayload;

use crate::app::dto::ShipQuery;
use crate::app::errors;
use crate::app::services::ShipService;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_ships).post(create_ship))
        .route("/count", get(count_ships))
        .route("/:id", get(get_ship).post(update_ship).delete(delete_ship))
}

pub async fn list_ships(
    Extension(services): Extension<Arc<ShipService>>,
    query: Result<Query<ShipQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection_to_response(e),
    };
    let params = match query.filter_params() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let page = match query.page() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.list(&params, query.order(), page).await {
        Ok(ships) => (StatusCode::OK, Json(ships)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn count_ships(
    Extension(services): Extension<Arc<ShipService>>,
    query: Result<Query<ShipQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection_to_response(e),
    };
    let params = match query.filter_params() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.count(&params).await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_ship(
    Extension(services): Extension<Arc<ShipService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShipId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.get(id).await {
        Ok(ship) => (StatusCode::OK, Json(ship)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_ship(
    Extension(services): Extension<Arc<ShipService>>,
    body: Result<Json<ShipPayload>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.create(body).await {
        Ok(ship) => (StatusCode::OK, Json(ship)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_ship(
    Extension(services): Extension<Arc<ShipService>>,
    Path(id): Path<String>,
    body: Result<Json<ShipPayload>, JsonRejection>,
) -> axum::response::Response {
    let id: ShipId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.update(id, patch).await {
        Ok(ship) => (StatusCode::OK, Json(ship)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_ship(
    Extension(services): Extension<Arc<ShipService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShipId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.delete(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
