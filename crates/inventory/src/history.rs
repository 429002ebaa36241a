//! Stock change history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, EventId, ItemId};

/// Actor recorded when a history event is built without one.
pub const DEFAULT_CHANGED_BY: &str = "System";

/// Immutable record of one stock quantity transition for one item.
///
/// `item_id` is a weak reference: the event does not keep the item alive and
/// is removed together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChangeEvent {
    pub id: EventId,
    #[serde(rename = "productId")]
    pub item_id: ItemId,
    pub old_quantity: i64,
    pub new_quantity: i64,
    pub changed_by: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for StockChangeEvent {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl StockChangeEvent {
    /// Record a transition from `old_quantity` to `new_quantity`.
    ///
    /// A blank or absent actor falls back to [`DEFAULT_CHANGED_BY`].
    pub fn record(
        item_id: ItemId,
        old_quantity: i64,
        new_quantity: i64,
        changed_by: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let changed_by = changed_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHANGED_BY)
            .to_string();
        Self {
            id: EventId::new(),
            item_id,
            old_quantity,
            new_quantity,
            changed_by,
            created_at,
        }
    }

    pub fn delta(&self) -> i64 {
        self.new_quantity - self.old_quantity
    }
}

/// Sort events for display: newest first.
pub fn sort_newest_first(events: &mut [StockChangeEvent]) {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// A history event joined with the name of the item it refers to.
///
/// `item_name` is `None` when the item no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub event: StockChangeEvent,
    pub item_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn blank_actor_falls_back_to_default() {
        let e = StockChangeEvent::record(ItemId::new(), 1, 2, Some("   "), Utc::now());
        assert_eq!(e.changed_by, DEFAULT_CHANGED_BY);
        let e = StockChangeEvent::record(ItemId::new(), 1, 2, None, Utc::now());
        assert_eq!(e.changed_by, DEFAULT_CHANGED_BY);
        let e = StockChangeEvent::record(ItemId::new(), 5, 0, Some("alice"), Utc::now());
        assert_eq!(e.changed_by, "alice");
        assert_eq!(e.delta(), -5);
    }

    #[test]
    fn newest_first_ordering() {
        let item = ItemId::new();
        let t0 = Utc::now();
        let older = StockChangeEvent::record(item, 0, 1, None, t0);
        let newer = StockChangeEvent::record(item, 1, 2, None, t0 + Duration::seconds(5));
        let mut events = vec![older.clone(), newer.clone()];
        sort_newest_first(&mut events);
        assert_eq!(events, vec![newer, older]);
    }

    #[test]
    fn serializes_with_product_id_key() {
        let e = StockChangeEvent::record(ItemId::new(), 5, 0, Some("alice"), Utc::now());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["productId"], e.item_id.to_string());
        assert_eq!(json["oldQuantity"], 5);
        assert_eq!(json["changedBy"], "alice");
    }
}
