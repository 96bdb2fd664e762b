use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use slipkeep_core::{InventoryItem, InventoryUpdate, NewInventoryItem};

use crate::StoreError;

const DEFAULT_CATEGORY: &str = "other";

#[derive(Debug, Default)]
struct Inner {
    items: Vec<InventoryItem>,
    next_id: u64,
}

/// Mutex-guarded inventory collection with ids assigned from 1 upward.
/// Items created from a slip carry an `expense_id` back-reference; deleting
/// that expense leaves them in place.
#[derive(Debug)]
pub struct InventoryStore {
    inner: Mutex<Inner>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { items: Vec::new(), next_id: 1 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<InventoryItem> {
        self.lock().items.clone()
    }

    pub fn get(&self, id: u64) -> Result<InventoryItem, StoreError> {
        self.lock()
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Create an item. Only the name is required; quantity defaults to 1 and
    /// category to "other".
    pub fn create(&self, new: NewInventoryItem) -> Result<InventoryItem, StoreError> {
        let Some(name) = new.name.filter(|s| !s.is_empty()) else {
            return Err(StoreError::Validation("Name is required"));
        };

        let mut inner = self.lock();
        let item = InventoryItem {
            id: inner.next_id,
            name,
            quantity: new.quantity.unwrap_or(1),
            category: new
                .category
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            expense_id: new.expense_id,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.items.push(item.clone());
        Ok(item)
    }

    /// Create a batch of items tagged with the expense they came from.
    /// Unnamed entries are dropped rather than failing the whole submission.
    pub fn create_for_expense(
        &self,
        expense_id: u64,
        items: Vec<NewInventoryItem>,
    ) -> Vec<InventoryItem> {
        items
            .into_iter()
            .filter_map(|mut item| {
                item.expense_id = Some(expense_id);
                self.create(item).ok()
            })
            .collect()
    }

    pub fn update(&self, id: u64, update: InventoryUpdate) -> Result<InventoryItem, StoreError> {
        let mut inner = self.lock();
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = update.name.filter(|s| !s.is_empty()) {
            item.name = name;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        if let Some(category) = update.category.filter(|s| !s.is_empty()) {
            item.category = category;
        }
        Ok(item.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let pos = inner
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(StoreError::NotFound)?;
        inner.items.remove(pos);
        Ok(())
    }
}
