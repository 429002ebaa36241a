use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::ItemId;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_history))
        .route("/:product_id", get(item_history))
}

/// Every stock change, newest first, with the item name when it still exists.
pub async fn list_history(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.mutator.all_history().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn item_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id(),
    };
    match services.mutator.item_history(&id).await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}
