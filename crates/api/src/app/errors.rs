use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use stockroom_infra::StoreError;
use stockroom_infra::import::ImportError;
use stockroom_infra::mutator::MutationError;

pub const DUPLICATE_NAME_MESSAGE: &str = "Product name must be unique";
pub const NO_FILE_MESSAGE: &str = "No file uploaded";

pub fn mutation_error_to_response(err: MutationError) -> axum::response::Response {
    match err {
        MutationError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        MutationError::DuplicateName(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_name", DUPLICATE_NAME_MESSAGE)
        }
        MutationError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        e @ MutationError::PartialDelete { .. } => {
            error!(error = %e, "delete left orphaned history");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "partial_delete", e.to_string())
        }
        MutationError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        StoreError::DuplicateName(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_name", DUPLICATE_NAME_MESSAGE)
        }
        e @ StoreError::Backend { .. } => {
            error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn import_error_to_response(err: ImportError) -> axum::response::Response {
    match err {
        ImportError::MissingFile => json_error(StatusCode::BAD_REQUEST, "missing_file", NO_FILE_MESSAGE),
        e @ ImportError::TooLarge { .. } => {
            json_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", e.to_string())
        }
        e @ ImportError::Parse(_) => json_error(StatusCode::BAD_REQUEST, "invalid_csv", e.to_string()),
        e @ ImportError::Io(_) => {
            error!(error = %e, "upload spooling failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "upload_error", e.to_string())
        }
    }
}

pub fn invalid_id() -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
