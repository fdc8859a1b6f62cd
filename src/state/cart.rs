//! Client-local shopping cart.
//!
//! DESIGN
//! ======
//! The cart is an ordered list unique by product id, mirrored to storage
//! after every mutation. There is no server cart, no expiry and no sync
//! between devices. The item count (sum of quantities) is published on a
//! `watch` channel so badges can follow it.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::net::types::{Product, deserialize_id};
use crate::storage::{self, CART_KEY, KeyValueStore, StorageError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            image: product.image.clone(),
        }
    }
}

pub struct CartService {
    store: Rc<dyn KeyValueStore>,
    items: Vec<CartItem>,
    count: watch::Sender<u32>,
}

fn count_of(items: &[CartItem]) -> u32 {
    items.iter().map(|i| i.quantity).fold(0, u32::saturating_add)
}

impl CartService {
    /// Load the cart persisted in `store`, or start empty.
    #[must_use]
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let items: Vec<CartItem> = storage::load_json(store.as_ref(), CART_KEY).unwrap_or_default();
        let (count, _) = watch::channel(count_of(&items));
        Self { store, items, count }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn count(&self) -> u32 {
        *self.count.borrow()
    }

    #[must_use]
    pub fn subscribe_count(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `item`.
    ///
    /// An existing line is incremented by one. A new line always starts at
    /// quantity 1, whatever `item.quantity` says.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_to_cart(&mut self, item: CartItem) -> Result<(), StorageError> {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem { quantity: 1, ..item });
        }
        self.commit()
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<(), StorageError> {
        self.items.retain(|i| i.product_id != product_id);
        self.commit()
    }

    /// Set a line's quantity; zero removes the line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), StorageError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = quantity;
        }
        self.commit()
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.commit()
    }

    fn commit(&self) -> Result<(), StorageError> {
        let count = count_of(&self.items);
        self.count.send_replace(count);
        tracing::debug!(lines = self.items.len(), count, "cart updated");
        storage::save_json(self.store.as_ref(), CART_KEY, &self.items)
    }
}
