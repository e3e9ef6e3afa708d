//! Built-in demo dataset, used when no transactions CSV is configured.

use chrono::NaiveDate;
use neurofin_core::{GuardStats, SavingGoal, Transaction};

/// A canned purchase the guard demo can fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoPurchase {
    pub merchant: &'static str,
    pub amount: f64,
    pub emoji: &'static str,
    pub category: &'static str,
}

pub const DEMO_PURCHASES: [DemoPurchase; 4] = [
    DemoPurchase { merchant: "Amazon", amount: 87.0, emoji: "📦", category: "Shopping" },
    DemoPurchase { merchant: "Uber Eats", amount: 45.0, emoji: "🍔", category: "Food Delivery" },
    DemoPurchase { merchant: "Nike Store", amount: 150.0, emoji: "👟", category: "Shopping" },
    DemoPurchase { merchant: "Spotify", amount: 15.0, emoji: "🎵", category: "Subscriptions" },
];

const ROWS: [(u32, &str, f64, &str, &str); 14] = [
    (1, "Food Delivery", 24.50, "🍕", "Deliveroo pizza night"),
    (2, "Groceries", 38.20, "🛒", "Lidl weekly shop"),
    (3, "Transport", 12.00, "🚗", "Uber to the station"),
    (3, "Food Delivery", 18.90, "🍕", "Uber Eats sushi"),
    (4, "Shopping", 45.99, "🛍️", "Zalando sneakers"),
    (5, "Entertainment", 14.00, "🎬", "Cinema tickets"),
    (6, "Food Delivery", 31.40, "🍕", "Wolt burgers"),
    (7, "Groceries", 22.75, "🛒", "Aldi top-up"),
    (8, "Subscriptions", 10.99, "🎵", "Spotify Premium"),
    (9, "Transport", 8.40, "🚗", "Bolt ride home"),
    (10, "Food Delivery", 27.10, "🍕", "Lieferando curry"),
    (11, "Shopping", 19.99, "🛍️", "Amazon phone case"),
    (12, "Entertainment", 22.00, "🎬", "Concert pre-sale"),
    (13, "Groceries", 29.60, "🛒", "Rewe groceries"),
];

/// Two weeks of student-budget spending.
pub fn transactions() -> Vec<Transaction> {
    ROWS.iter()
        .enumerate()
        .filter_map(|(i, &(day, category, amount, emoji, description))| {
            let date = NaiveDate::from_ymd_opt(2025, 10, day)?;
            Some(Transaction::new(i as u64 + 1, date, category, amount, emoji).with_description(description))
        })
        .collect()
}

/// €145 of a €200 monthly target, three weeks running.
pub fn saving_goal() -> SavingGoal {
    SavingGoal {
        weeks: Some(3),
        ..SavingGoal::new(145.0, 200.0)
    }
}

pub fn guard_stats() -> GuardStats {
    GuardStats {
        saved: 340.0,
        prevented: 7,
        streak_days: 12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurofin_core::{aggregate, InsightContext, ProgressPolicy};

    #[test]
    fn test_sample_is_consistent() {
        let txns = transactions();
        assert_eq!(txns.len(), ROWS.len());
        let ids: Vec<u64> = txns.iter().map(|t| t.id).collect();
        assert_eq!(ids, (1..=ROWS.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_delivery_tops_the_sample() {
        let cats = aggregate(&transactions());
        assert_eq!(cats[0].name, "Food Delivery");
        assert_eq!(cats[0].value, 101.90);
    }

    #[test]
    fn test_sample_builds_context() {
        let ctx = InsightContext::build(&transactions(), saving_goal(), ProgressPolicy::Clamped).unwrap();
        assert_eq!(ctx.metrics().goal_progress_pct, 73);
        assert_eq!(ctx.transaction_count(), 14);
    }
}
