//! # Inventory Ledger
//!
//! The running list of captured items, newest first.
//!
//! ## Ledger Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Operations                                    │
//! │                                                                         │
//! │  Trigger                  Session Method          Ledger Change         │
//! │  ───────                  ──────────────          ─────────────         │
//! │                                                                         │
//! │  Barcode admitted ───────► on_barcode_detected ──► push_front(item)    │
//! │                                                                         │
//! │  Shutter pressed ────────► capture_manual ───────► push_front(item)    │
//! │                                                                         │
//! │  Swipe → Delete ─────────► request_delete ───────► remove(idx)         │
//! │                                                                         │
//! │  List render ────────────► current_items ────────► (snapshot only)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every item has a unique id
//! - Order is reverse-chronological; only deletion changes relative order
//! - No size bound

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{Item, ItemId};

/// Ordered, in-memory collection of inventory items.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    items: VecDeque<Item>,
}

impl InventoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        InventoryLedger {
            items: VecDeque::new(),
        }
    }

    /// Prepends an item. O(1), never rejects.
    pub fn add(&mut self, item: Item) {
        debug_assert!(
            self.get(&item.id).is_none(),
            "duplicate item id {}",
            item.id
        );
        debug!(item_id = %item.id, label = %item.label, "Item added to ledger");
        self.items.push_front(item);
    }

    /// Removes the item with `id`, keeping the order of the rest.
    ///
    /// Returns whether an item was removed, so a repeated delete gesture is
    /// harmless.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        match self.items.iter().position(|item| &item.id == id) {
            Some(index) => {
                self.items.remove(index);
                debug!(item_id = %id, "Item removed from ledger");
                true
            }
            None => {
                debug!(item_id = %id, "Delete requested for unknown item");
                false
            }
        }
    }

    /// Returns a snapshot of the items in display order.
    pub fn list(&self) -> Vec<Item> {
        self.items.iter().cloned().collect()
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Like [`InventoryLedger::get`], but absence is an error.
    pub fn require(&self, id: &ItemId) -> CoreResult<&Item> {
        self.get(id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Iterates in display order without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
