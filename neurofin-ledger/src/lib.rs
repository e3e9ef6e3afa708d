//! neurofin-ledger: transaction CSV loader, category rules, and the demo dataset

pub mod csv_loader;
pub mod category_rules;
pub mod sample;

pub use csv_loader::load_transactions_csv;
pub use category_rules::{categorize, CategoryGuess};
