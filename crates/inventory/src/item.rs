use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

/// Display status of an item, derived from its stock quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

/// Map a stock quantity to its status: positive stock is `InStock`, zero and
/// negative stock are `OutOfStock`.
pub fn derive_status(stock: i64) -> ItemStatus {
    if stock > 0 {
        ItemStatus::InStock
    } else {
        ItemStatus::OutOfStock
    }
}

impl ItemStatus {
    pub fn from_stock(stock: i64) -> Self {
        derive_status(stock)
    }

    /// Human-readable label, also used as the CSV representation.
    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::InStock => "In Stock",
            ItemStatus::OutOfStock => "Out of Stock",
        }
    }

    /// Parse a label as found in uploads. Accepts the display labels and the
    /// common identifier spellings, case-insensitively.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "instock" => Some(ItemStatus::InStock),
            "outofstock" => Some(ItemStatus::OutOfStock),
            _ => None,
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog entry as persisted by the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    pub status: ItemStatus,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Item {
    /// Materialize a draft into a stored record.
    pub fn from_draft(id: ItemId, draft: ItemDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            unit: draft.unit,
            category: draft.category,
            brand: draft.brand,
            stock: draft.stock,
            status: draft.status,
            image: draft.image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute `status` from the current `stock`.
    pub fn refresh_status(&mut self) {
        self.status = derive_status(self.stock);
    }

    pub fn is_in_stock(&self) -> bool {
        self.status == ItemStatus::InStock
    }
}

/// Validated field set ready to be inserted as a new item.
///
/// Built either from a [`NewItem`] (status always derived) or by the bulk
/// import path (which may carry a status supplied by the upload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub unit: String,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    pub status: ItemStatus,
    pub image: String,
}

impl ItemDraft {
    /// Draft for an imported row. `status` falls back to the derived value.
    pub fn imported(
        name: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
        brand: impl Into<String>,
        stock: i64,
        status: Option<ItemStatus>,
        image: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            category: category.into(),
            brand: brand.into(),
            stock,
            status: status.unwrap_or_else(|| derive_status(stock)),
            image: image.unwrap_or_default(),
        }
    }
}

/// Caller input for creating an item.
///
/// There is deliberately no `status` field: incoming payloads that carry one
/// have it dropped at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
        brand: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            category: category.into(),
            brand: brand.into(),
            stock: None,
            image: None,
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Validate required fields and derive the status.
    pub fn into_draft(self) -> DomainResult<ItemDraft> {
        ensure_required(&[
            ("name", Some(&self.name)),
            ("unit", Some(&self.unit)),
            ("category", Some(&self.category)),
            ("brand", Some(&self.brand)),
        ])?;
        let stock = self.stock.unwrap_or(0);
        Ok(ItemDraft {
            name: self.name,
            unit: self.unit,
            category: self.category,
            brand: self.brand,
            stock,
            status: derive_status(stock),
            image: self.image.unwrap_or_default(),
        })
    }
}

/// Partial update of an item. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ItemPatch {
    pub fn stock(stock: i64) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// The new stock value, if this patch changes it relative to `current`.
    pub fn stock_change(&self, current: i64) -> Option<i64> {
        self.stock.filter(|s| *s != current)
    }

    pub fn validate(&self) -> DomainResult<()> {
        ensure_required(&[
            ("name", self.name.as_ref()),
            ("unit", self.unit.as_ref()),
            ("category", self.category.as_ref()),
            ("brand", self.brand.as_ref()),
        ])
    }

    /// Apply the patch and re-derive `status` from the resulting stock.
    pub fn apply_to(&self, item: &mut Item) -> DomainResult<()> {
        self.validate()?;
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(unit) = &self.unit {
            item.unit = unit.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(brand) = &self.brand {
            item.brand = brand.clone();
        }
        if let Some(stock) = self.stock {
            item.stock = stock;
        }
        if let Some(image) = &self.image {
            item.image = image.clone();
        }
        item.refresh_status();
        Ok(())
    }
}

/// `true` when the value is absent or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn ensure_required(fields: &[(&str, Option<&String>)]) -> DomainResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| matches!(value, Some(v) if v.trim().is_empty()))
        .map(|(field, _)| *field)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "required field(s) empty: {}",
            missing.join(", ")
        )))
    }
}
