use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, Query, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use stockroom_core::ItemId;
use stockroom_infra::export::{CSV_CONTENT_TYPE, EXPORT_FILENAME, export_csv};
use stockroom_infra::import::UploadedFile;
use stockroom_inventory::{ItemPatch, NewItem};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ActorContext;

/// Multipart field that carries the CSV upload.
pub const UPLOAD_FIELD: &str = "file";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/categories", get(list_categories))
        .route("/export", get(export_products))
        .route("/import", post(import_products))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

fn parse_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse().map_err(|_| errors::invalid_id())
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListProductsParams>,
) -> axum::response::Response {
    let query = match params.into_query() {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    match services.mutator.list_items(&query).await {
        Ok(page) => (StatusCode::OK, Json(dto::ProductListResponse::from(page))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let fragment = params.name.unwrap_or_default();
    match services.mutator.search_items(&fragment).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.mutator.categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.mutator.get_item(&id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewItem>,
) -> axum::response::Response {
    match services.mutator.create_item(body).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<ItemPatch>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.mutator.update_item(&id, body, actor.actor()).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.mutator.delete_item(&id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(dto::MessageResponse::new("Product deleted successfully")),
        )
            .into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn export_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match export_csv(services.catalog().as_ref()).await {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILENAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn import_products(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> axum::response::Response {
    let upload = match multipart {
        Ok(mut multipart) => match spool_upload(&services, &mut multipart).await {
            Ok(upload) => upload,
            Err(resp) => return resp,
        },
        Err(_) => None,
    };

    match services.importer.run(upload).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::import_error_to_response(e),
    }
}

/// Stream the `file` field into a temp file. Other fields are ignored.
async fn spool_upload(
    services: &AppServices,
    multipart: &mut Multipart,
) -> Result<Option<UploadedFile>, axum::response::Response> {
    let limits = &services.config.import;
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(errors::json_error(e.status(), "invalid_multipart", e.body_text())),
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let mut upload = UploadedFile::create(
            limits.temp_dir.as_deref(),
            field.file_name().map(str::to_string),
            limits.max_upload_bytes,
        )
        .map_err(errors::import_error_to_response)?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => upload.append(&chunk).map_err(errors::import_error_to_response)?,
                Ok(None) => break,
                Err(e) => return Err(errors::json_error(e.status(), "invalid_multipart", e.body_text())),
            }
        }
        info!(bytes = upload.len(), file = upload.original_name().unwrap_or(""), "upload received");
        return Ok(Some(upload));
    }
}
