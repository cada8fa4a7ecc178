use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockWriteGuard},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{CartItemId, ItemCategory, Zar};
use tokio::sync::broadcast;
use tracing::{debug, info};

const CART_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub name: String,
    pub price: Zar,
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub added_at: DateTime<Utc>,
}

/// Point-in-time copy of the cart handed to observers and readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total: Zar,
}

impl CartSnapshot {
    fn of(items: &[CartItem]) -> Self {
        Self {
            items: items.to_vec(),
            total: items.iter().map(|item| item.price).sum(),
        }
    }
}

/// Session-scoped cart. Items keep insertion order and the total is always
/// computed from them, never stored.
pub struct CartStore {
    items: RwLock<Vec<CartItem>>,
    events: broadcast::Sender<CartSnapshot>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CART_EVENT_CAPACITY);
        Self {
            items: RwLock::new(Vec::new()),
            events,
        }
    }

    pub fn add_to_cart(
        &self,
        name: impl Into<String>,
        price: Zar,
        category: impl Into<ItemCategory>,
        metadata: Option<BTreeMap<String, String>>,
    ) -> CartItemId {
        let item = CartItem {
            id: CartItemId::generate(),
            name: name.into(),
            price,
            category: category.into(),
            metadata: metadata.unwrap_or_default(),
            added_at: Utc::now(),
        };
        let id = item.id;

        let mut items = self.write();
        info!(item_id = %id, name = %item.name, price = %item.price, category = %item.category, "added to cart");
        items.push(item);
        self.notify(&items);
        id
    }

    /// Returns whether an item was removed. Unknown ids leave the cart and
    /// its observers untouched.
    pub fn remove_from_cart(&self, id: CartItemId) -> bool {
        let mut items = self.write();
        let Some(position) = items.iter().position(|item| item.id == id) else {
            debug!(item_id = %id, "remove ignored, item not in cart");
            return false;
        };
        let removed = items.remove(position);
        info!(item_id = %id, name = %removed.name, "removed from cart");
        self.notify(&items);
        true
    }

    pub fn clear_cart(&self) {
        let mut items = self.write();
        let dropped = items.len();
        items.clear();
        info!(dropped, "cart cleared");
        self.notify(&items);
    }

    pub fn total(&self) -> Zar {
        self.read(|items| items.iter().map(|item| item.price).sum())
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.read(<[CartItem]>::to_vec)
    }

    pub fn get(&self, id: CartItemId) -> Option<CartItem> {
        self.read(|items| items.iter().find(|item| item.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.read(<[CartItem]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.read(CartSnapshot::of)
    }

    /// Subtotals per category, in order of each category's first appearance.
    pub fn totals_by_category(&self) -> Vec<(ItemCategory, Zar)> {
        self.read(|items| {
            let mut totals: Vec<(ItemCategory, Zar)> = Vec::new();
            for item in items {
                match totals.iter_mut().find(|(category, _)| *category == item.category) {
                    Some((_, subtotal)) => *subtotal = *subtotal + item.price,
                    None => totals.push((item.category.clone(), item.price)),
                }
            }
            totals
        })
    }

    /// Every successful mutation publishes a fresh [`CartSnapshot`].
    pub fn subscribe(&self) -> broadcast::Receiver<CartSnapshot> {
        self.events.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&[CartItem]) -> T) -> T {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        f(items.as_slice())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CartItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Sent while the write guard is held so observers see mutations in order.
    fn notify(&self, items: &[CartItem]) {
        let _ = self.events.send(CartSnapshot::of(items));
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
