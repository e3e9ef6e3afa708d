//! Transaction and saving goal records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single spending (or income) entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    /// Date of the transaction (YYYY-MM-DD)
    pub date: NaiveDate,
    /// User-facing spending bucket ("Food Delivery", "Groceries", ...)
    pub category: String,
    /// Positive = expense
    pub amount: f64,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TxnKind>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TxnKind::Income),
            "expense" => Some(TxnKind::Expense),
            _ => None,
        }
    }
}

impl Transaction {
    pub fn new(
        id: u64,
        date: NaiveDate,
        category: impl Into<String>,
        amount: f64,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date,
            category: category.into(),
            amount,
            emoji: emoji.into(),
            description: None,
            kind: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_kind(mut self, kind: TxnKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Untyped transactions count as expenses.
    pub fn is_expense(&self) -> bool {
        self.kind != Some(TxnKind::Income)
    }
}

/// Monthly savings target and progress toward it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SavingGoal {
    pub current: f64,
    pub target: f64,
    /// Week streak shown next to the goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<u32>,
}

impl SavingGoal {
    pub fn new(current: f64, target: f64) -> Self {
        Self {
            current,
            target,
            weeks: None,
        }
    }

    /// Amount still missing. Negative once the goal is exceeded.
    pub fn remaining(&self) -> f64 {
        self.target - self.current
    }

    /// Share of the target already saved, in the 0.0.. range (unclamped).
    pub fn ratio(&self) -> f64 {
        self.current / self.target
    }

    pub(crate) fn deposit(&mut self, amount: f64) {
        self.current += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn test_untyped_is_expense() {
        let t = Transaction::new(1, day(3), "Groceries", 30.0, "🛒");
        assert!(t.is_expense());
        let income = t.clone().with_kind(TxnKind::Income);
        assert!(!income.is_expense());
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let t = Transaction::new(7, day(4), "Salary", 2100.0, "💼").with_kind(TxnKind::Income);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "income");
        assert!(json.get("description").is_none());

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_goal_remaining() {
        let goal = SavingGoal::new(140.0, 200.0);
        assert_eq!(goal.remaining(), 60.0);
        assert_eq!(goal.ratio(), 0.7);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(TxnKind::parse(" Income "), Some(TxnKind::Income));
        assert_eq!(TxnKind::parse("expense"), Some(TxnKind::Expense));
        assert_eq!(TxnKind::parse("refund"), None);
    }
}
