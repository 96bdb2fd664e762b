//! In-memory expense and inventory collections.
//!
//! Each store owns its records behind a mutex together with a monotonically
//! increasing id counter, so request handlers receive an explicit handle
//! rather than touching ambient module state. Nothing here persists across
//! process restarts.

pub mod expenses;
pub mod inventory;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("record not found")]
    NotFound,
}

pub use expenses::ExpenseStore;
pub use inventory::InventoryStore;
