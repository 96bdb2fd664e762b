pub mod coerce;
pub mod expense;
pub mod inventory;

pub use expense::{Expense, ExpenseStats, ExpenseUpdate, NewExpense};
pub use inventory::{InventoryItem, InventoryUpdate, NewInventoryItem};
