//! Filtering, sorting and pagination for catalog scans.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_inventory::Item;

/// Category value that means "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Pagination parameters for catalog queries (1-based pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(10).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    Stock,
    Category,
    CreatedAt,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Stock => "stock",
            SortKey::Category => "category",
            SortKey::CreatedAt => "created_at",
        }
    }
}

/// Sort order. Parsed from `name`, `-stock`, `createdAt`, ...; a leading `-`
/// means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::Name,
            descending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported sort key: {0}")]
pub struct InvalidSort(pub String);

impl FromStr for Sort {
    type Err = InvalidSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let key = match key.to_ascii_lowercase().replace('_', "").as_str() {
            "name" => SortKey::Name,
            "stock" => SortKey::Stock,
            "category" => SortKey::Category,
            "createdat" => SortKey::CreatedAt,
            _ => return Err(InvalidSort(s.to_string())),
        };
        Ok(Self { key, descending })
    }
}

impl Sort {
    pub fn compare(&self, a: &Item, b: &Item) -> core::cmp::Ordering {
        let primary = match self.key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Stock => a.stock.cmp(&b.stock),
            SortKey::Category => a.category.cmp(&b.category),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = if self.descending { primary.reverse() } else { primary };
        primary.then_with(|| a.name.cmp(&b.name)).then_with(|| a.id.cmp(&b.id))
    }
}

/// Catalog scan parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Case-insensitive substring match on `name`.
    pub name: Option<String>,
    /// Exact category match; `None` or [`ALL_CATEGORIES`] disables the filter.
    pub category: Option<String>,
    pub sort: Sort,
    pub pagination: Pagination,
}

impl ItemQuery {
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }

    pub fn matches(&self, item: &Item) -> bool {
        let name_ok = self
            .name_filter()
            .is_none_or(|needle| contains_ignore_case(&item.name, needle));
        let category_ok = self.category_filter().is_none_or(|c| item.category == c);
        name_ok && category_ok
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of catalog results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl ItemPage {
    pub fn new(items: Vec<Item>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            total_pages: total.div_ceil(u64::from(pagination.limit)),
            current_page: pagination.page,
        }
    }
}
