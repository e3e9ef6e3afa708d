//! Category aggregation: group transactions into per-category totals.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::transaction::Transaction;

/// Per-category spending total, derived on demand and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    /// Sum of amounts, rounded to 2 decimals
    pub value: f64,
    pub emoji: String,
}

/// Round to cents.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Group expenses by category, sorted by total descending.
///
/// Income rows are skipped. Ties keep the order in which the categories first
/// appeared, and the emoji comes from the first transaction of each category.
pub fn aggregate(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64, &str)> = Vec::new();

    for t in transactions.iter().filter(|t| t.is_expense()) {
        match index.get(t.category.as_str()) {
            Some(&i) => sums[i].1 += t.amount,
            None => {
                index.insert(t.category.as_str(), sums.len());
                sums.push((t.category.as_str(), t.amount, t.emoji.as_str()));
            }
        }
    }

    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(name, sum, emoji)| CategoryTotal {
            name: name.to_string(),
            value: round2(sum),
            emoji: emoji.to_string(),
        })
        .collect();

    // sort_by is stable; NaN totals compare as equal and stay in place
    totals.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    tracing::debug!(
        transactions = transactions.len(),
        categories = totals.len(),
        "aggregated spending"
    );
    totals
}

/// Total for a named category, or 0.0 when the category is absent.
pub fn category_value(categories: &[CategoryTotal], name: &str) -> f64 {
    categories
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.value)
        .unwrap_or(0.0)
}
