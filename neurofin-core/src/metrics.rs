//! Derived dashboard metrics: totals, averages and goal progress.

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, CategoryTotal};
use crate::error::{CoachError, Result};
use crate::transaction::{SavingGoal, Transaction};

/// Whether goal progress is capped at 100%.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPolicy {
    /// Report progress within [0, 100]
    #[default]
    Clamped,
    /// Report the raw rounded percentage (may exceed 100 or go negative)
    Unclamped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub total_spent: f64,
    pub avg_transaction: f64,
    pub goal_progress_pct: i64,
    pub top_category: String,
}

/// Rounded goal progress percentage under the given policy.
pub fn goal_progress(goal: &SavingGoal, policy: ProgressPolicy) -> Result<i64> {
    if !goal.target.is_finite() || goal.target <= 0.0 {
        return Err(CoachError::InvalidGoal {
            target: goal.target,
        });
    }
    let pct = (goal.ratio() * 100.0).round() as i64;
    Ok(match policy {
        ProgressPolicy::Clamped => pct.clamp(0, 100),
        ProgressPolicy::Unclamped => pct,
    })
}

/// Compute dashboard metrics from aggregated categories.
///
/// `transaction_count` is the number of transactions the categories were
/// built from; it drives the average.
pub fn compute_metrics(
    categories: &[CategoryTotal],
    goal: &SavingGoal,
    transaction_count: usize,
    policy: ProgressPolicy,
) -> Result<Metrics> {
    let Some(top) = categories.first() else {
        return Err(CoachError::EmptyDataset);
    };
    if transaction_count == 0 {
        return Err(CoachError::EmptyDataset);
    }

    let total_spent: f64 = categories.iter().map(|c| c.value).sum();
    let goal_progress_pct = goal_progress(goal, policy)?;

    Ok(Metrics {
        total_spent,
        avg_transaction: total_spent / transaction_count as f64,
        goal_progress_pct,
        top_category: top.name.clone(),
    })
}

/// Everything the insight templates read, derived once per dataset.
///
/// Only [`InsightContext::build`] creates one, so a context always holds at
/// least one category.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightContext {
    categories: Vec<CategoryTotal>,
    metrics: Metrics,
    goal: SavingGoal,
    transaction_count: usize,
}

impl InsightContext {
    pub fn build(
        transactions: &[Transaction],
        goal: SavingGoal,
        policy: ProgressPolicy,
    ) -> Result<Self> {
        let categories = aggregate(transactions);
        let transaction_count = transactions.iter().filter(|t| t.is_expense()).count();
        let metrics = compute_metrics(&categories, &goal, transaction_count, policy)?;
        Ok(Self {
            categories,
            metrics,
            goal,
            transaction_count,
        })
    }

    /// Category totals, largest first. Never empty.
    pub fn categories(&self) -> &[CategoryTotal] {
        &self.categories
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn goal(&self) -> &SavingGoal {
        &self.goal
    }

    /// Number of expense transactions behind the totals.
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Percentage share of total spending, 0 when nothing was spent.
    pub fn share_pct(&self, value: f64) -> f64 {
        if self.metrics.total_spent > 0.0 {
            value / self.metrics.total_spent * 100.0
        } else {
            0.0
        }
    }

    pub fn category_value(&self, name: &str) -> f64 {
        crate::aggregate::category_value(&self.categories, name)
    }

    pub fn top(&self) -> &CategoryTotal {
        // non-empty: build() rejects empty category lists
        &self.categories[0]
    }
}
