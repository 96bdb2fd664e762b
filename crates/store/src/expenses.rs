use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;
use slipkeep_core::{Expense, ExpenseStats, ExpenseUpdate, NewExpense};

use crate::StoreError;

#[derive(Debug, Default)]
struct Inner {
    expenses: Vec<Expense>,
    next_id: u64,
}

/// Mutex-guarded expense collection with ids assigned from 1 upward.
#[derive(Debug)]
pub struct ExpenseStore {
    inner: Mutex<Inner>,
}

impl Default for ExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { expenses: Vec::new(), next_id: 1 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<Expense> {
        self.lock().expenses.clone()
    }

    pub fn get(&self, id: u64) -> Result<Expense, StoreError> {
        self.lock()
            .expenses
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Create an expense. Description, amount and category are required;
    /// a zero amount counts as missing, as does an empty string.
    pub fn create(&self, new: NewExpense) -> Result<Expense, StoreError> {
        let description = new.description.filter(|s| !s.is_empty());
        let category = new.category.filter(|s| !s.is_empty());
        let amount = new.amount.filter(|a| !a.is_zero());

        let (Some(description), Some(amount), Some(category)) = (description, amount, category)
        else {
            return Err(StoreError::Validation("Missing required fields"));
        };

        let mut inner = self.lock();
        let expense = Expense {
            id: inner.next_id,
            description,
            amount,
            category,
            date: new.date.filter(|s| !s.is_empty()).unwrap_or_else(|| Utc::now().to_rfc3339()),
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.expenses.push(expense.clone());
        Ok(expense)
    }

    /// Partial update; absent or empty fields keep their old values.
    pub fn update(&self, id: u64, update: ExpenseUpdate) -> Result<Expense, StoreError> {
        let mut inner = self.lock();
        let expense = inner
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(description) = update.description.filter(|s| !s.is_empty()) {
            expense.description = description;
        }
        if let Some(amount) = update.amount {
            expense.amount = amount;
        }
        if let Some(category) = update.category.filter(|s| !s.is_empty()) {
            expense.category = category;
        }
        if let Some(date) = update.date.filter(|s| !s.is_empty()) {
            expense.date = date;
        }
        Ok(expense.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let pos = inner
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;
        inner.expenses.remove(pos);
        Ok(())
    }

    pub fn stats(&self) -> ExpenseStats {
        let inner = self.lock();
        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut total = Decimal::ZERO;
        for e in &inner.expenses {
            total += e.amount;
            *by_category.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount;
        }
        ExpenseStats { total, count: inner.expenses.len(), by_category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn new_expense(description: &str, amount: &str, category: &str) -> NewExpense {
        NewExpense {
            description: Some(description.to_string()),
            amount: Some(Decimal::from_str(amount).unwrap()),
            category: Some(category.to_string()),
            date: None,
        }
    }

    #[test]
    fn ids_start_at_one_and_increment() {
        let store = ExpenseStore::new();
        let a = store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        let b = store.create(new_expense("Taxi", "12.00", "transportation")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let store = ExpenseStore::new();
        let a = store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        store.delete(a.id).unwrap();
        let b = store.create(new_expense("Tea", "3.00", "food")).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn create_rejects_missing_fields() {
        let store = ExpenseStore::new();
        let missing = NewExpense { description: Some("x".into()), ..Default::default() };
        assert_eq!(
            store.create(missing),
            Err(StoreError::Validation("Missing required fields"))
        );
    }

    #[test]
    fn create_rejects_empty_strings_and_zero_amount() {
        let store = ExpenseStore::new();
        assert!(store.create(new_expense("", "4.50", "food")).is_err());
        assert!(store.create(new_expense("Coffee", "0", "food")).is_err());
        assert!(store.create(new_expense("Coffee", "4.50", "")).is_err());
    }

    #[test]
    fn create_defaults_date_to_now() {
        let store = ExpenseStore::new();
        let e = store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        assert!(!e.date.is_empty());
    }

    #[test]
    fn get_returns_not_found_for_unknown_id() {
        let store = ExpenseStore::new();
        assert_eq!(store.get(99), Err(StoreError::NotFound));
    }

    #[test]
    fn update_is_partial() {
        let store = ExpenseStore::new();
        let e = store.create(new_expense("Coffee", "4.50", "food")).unwrap();

        let updated = store
            .update(e.id, ExpenseUpdate {
                amount: Some(Decimal::from_str("5.00").unwrap()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.description, "Coffee");
        assert_eq!(updated.amount, Decimal::from_str("5.00").unwrap());
        assert_eq!(updated.category, "food");
    }

    #[test]
    fn update_ignores_empty_strings() {
        let store = ExpenseStore::new();
        let e = store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        let updated = store
            .update(e.id, ExpenseUpdate {
                description: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.description, "Coffee");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = ExpenseStore::new();
        assert_eq!(
            store.update(1, ExpenseUpdate::default()),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn delete_removes_record() {
        let store = ExpenseStore::new();
        let e = store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        store.delete(e.id).unwrap();
        assert_eq!(store.get(e.id), Err(StoreError::NotFound));
        assert_eq!(store.delete(e.id), Err(StoreError::NotFound));
    }

    #[test]
    fn stats_sum_totals_and_categories() {
        let store = ExpenseStore::new();
        store.create(new_expense("Coffee", "4.50", "food")).unwrap();
        store.create(new_expense("Lunch", "10.00", "food")).unwrap();
        store.create(new_expense("Taxi", "7.25", "transportation")).unwrap();

        let stats = store.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Decimal::from_str("21.75").unwrap());
        assert_eq!(stats.by_category["food"], Decimal::from_str("14.50").unwrap());
        assert_eq!(
            stats.by_category["transportation"],
            Decimal::from_str("7.25").unwrap()
        );
    }

    #[test]
    fn stats_on_empty_store() {
        let stats = ExpenseStore::new().stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, Decimal::ZERO);
        assert!(stats.by_category.is_empty());
    }
}
