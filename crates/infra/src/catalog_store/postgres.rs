//! Postgres-backed catalog store.
//!
//! The unique index on `items.name` is what enforces name uniqueness; a
//! `23505` violation on insert or update maps to `StoreError::DuplicateName`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stockroom_core::ItemId;
use stockroom_inventory::{Item, ItemDraft, ItemStatus};

use super::query::{ItemPage, ItemQuery, Sort};
use super::r#trait::CatalogStore;
use crate::error::{StoreError, map_sqlx_error};

const ITEM_COLUMNS: &str =
    "id, name, unit, category, brand, stock, status, image, created_at, updated_at";

/// Postgres-backed catalog store.
///
/// `Clone` is cheap: `PgPool` is reference counted.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn order_by(sort: Sort) -> String {
        let direction = if sort.descending { "DESC" } else { "ASC" };
        format!("{} {direction}, name ASC, id ASC", sort.key.column())
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally by `ILIKE`.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn insert(&self, draft: ItemDraft) -> Result<Item, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items (id, name, unit, category, brand, stock, status, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(ItemId::new().as_uuid())
        .bind(&draft.name)
        .bind(&draft.unit)
        .bind(&draft.category)
        .bind(&draft.brand)
        .bind(draft.stock)
        .bind(draft.status.label())
        .bind(&draft.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", Some(&draft.name), e))?;

        item_from_row(&row)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", None, e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_item_by_name", None, e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn update(&self, item: Item) -> Result<Item, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE items
            SET name = $2, unit = $3, category = $4, brand = $5,
                stock = $6, status = $7, image = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.unit)
        .bind(&item.category)
        .bind(&item.brand)
        .bind(item.stock)
        .bind(item.status.label())
        .bind(&item.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", Some(&item.name), e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("DELETE FROM items WHERE id = $1 RETURNING {ITEM_COLUMNS}"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", None, e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn query(&self, query: &ItemQuery) -> Result<ItemPage, StoreError> {
        let name_pattern = query.name_filter().map(like_pattern);
        let category = query.category_filter();

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM items
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR category = $2)
            "#,
        )
        .bind(name_pattern.as_deref())
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .and_then(|row| row.try_get("total"))
        .map_err(|e| map_sqlx_error("count_items", None, e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM items
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR category = $2)
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            Self::order_by(query.sort)
        ))
        .bind(name_pattern.as_deref())
        .bind(category)
        .bind(i64::from(query.pagination.limit))
        .bind(i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_items", None, e))?;

        let items = rows.iter().map(item_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(ItemPage::new(items, total.max(0) as u64, query.pagination))
    }

    #[instrument(skip(self), err)]
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE name ILIKE $1 ESCAPE '\\' ORDER BY name ASC"
        ))
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_items", None, e))?;
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_all_by_name(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items", None, e))?;
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar("SELECT DISTINCT category FROM items ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", None, e))
    }
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    id: uuid::Uuid,
    name: String,
    unit: String,
    category: String,
    brand: String,
    stock: i64,
    status: String,
    image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            unit: row.try_get("unit")?,
            category: row.try_get("category")?,
            brand: row.try_get("brand")?,
            stock: row.try_get("stock")?,
            status: row.try_get("status")?,
            image: row.try_get("image")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn item_from_row(row: &sqlx::postgres::PgRow) -> Result<Item, StoreError> {
    let r = ItemRow::from_row(row)
        .map_err(|e| StoreError::backend("decode_item", format!("failed to decode item row: {e}")))?;
    // Unknown labels are re-derived rather than failing the read.
    let status = ItemStatus::parse_label(&r.status).unwrap_or_else(|| ItemStatus::from_stock(r.stock));
    Ok(Item {
        id: ItemId::from_uuid(r.id),
        name: r.name,
        unit: r.unit,
        category: r.category,
        brand: r.brand,
        stock: r.stock,
        status,
        image: r.image,
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pen"), "%pen%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn order_by_is_whitelisted() {
        let sort: Sort = "-createdAt".parse().unwrap();
        assert_eq!(
            PostgresCatalogStore::order_by(sort),
            "created_at DESC, name ASC, id ASC"
        );
    }
}
