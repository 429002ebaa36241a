use axum::Router;

pub mod history;
pub mod products;
pub mod system;

/// Router for all `/api` endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/products", products::router())
        .nest("/api/history", history::router())
}
