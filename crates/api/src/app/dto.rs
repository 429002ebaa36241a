use serde::{Deserialize, Serialize};

use stockroom_infra::catalog_store::{ItemPage, ItemQuery, Pagination, Sort};
use stockroom_inventory::Item;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /api/products`. Numbers are taken leniently: anything
/// that does not parse falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    pub name: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

impl ListProductsParams {
    pub fn into_query(self) -> Result<ItemQuery, axum::response::Response> {
        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<Sort>().map_err(|e| {
                errors::json_error(axum::http::StatusCode::BAD_REQUEST, "invalid_sort", e.to_string())
            })?,
            None => Sort::default(),
        };

        Ok(ItemQuery {
            name: self.name,
            category: self.category,
            sort,
            pagination: Pagination::new(lenient_u32(self.page), lenient_u32(self.limit)),
        })
    }
}

fn lenient_u32(raw: Option<String>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Item>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

impl From<ItemPage> for ProductListResponse {
    fn from(page: ItemPage) -> Self {
        Self {
            products: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_pagination_falls_back_to_defaults() {
        let params = ListProductsParams {
            page: Some("abc".into()),
            limit: Some("5".into()),
            sort: Some("-stock".into()),
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.pagination.page, 1);
        assert_eq!(query.pagination.limit, 5);
        assert!(query.sort.descending);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let params = ListProductsParams {
            sort: Some("price".into()),
            ..Default::default()
        };
        assert!(params.into_query().is_err());
    }

    #[test]
    fn list_response_uses_camel_case() {
        let page = ItemPage::new(Vec::new(), 0, Pagination::default());
        let json = serde_json::to_value(ProductListResponse::from(page)).unwrap();
        assert_eq!(json["totalPages"], 0);
        assert_eq!(json["currentPage"], 1);
        assert!(json["products"].as_array().unwrap().is_empty());
    }
}
