//! Dashboard insight cards derived from the current dataset.

use serde::{Deserialize, Serialize};

use crate::metrics::InsightContext;
use crate::router::eur;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Tip,
    Trend,
    Opportunity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightCard {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    pub impact: String,
}

/// Goal counts as "almost there" from this share of the target on.
pub const NEAR_GOAL_RATIO: f64 = 0.7;

pub fn dashboard_insights(ctx: &InsightContext) -> Vec<InsightCard> {
    vec![delivery_vs_groceries(ctx), spending_pattern(ctx), goal_proximity(ctx)]
}

fn delivery_vs_groceries(ctx: &InsightContext) -> InsightCard {
    let delivery = ctx.category_value("Food Delivery");
    let groceries = ctx.category_value("Groceries");

    if delivery > groceries {
        InsightCard {
            kind: InsightKind::Warning,
            title: "Food Delivery Alert!".to_string(),
            description: format!(
                "You're spending {} on delivery vs {} on groceries. Cooking at home could save you {}/month!",
                eur(delivery),
                eur(groceries),
                eur(delivery * 0.6)
            ),
            suggestion: "Try home-cooked meals twice a week to reduce delivery costs.".to_string(),
            impact: "€60/month".to_string(),
        }
    } else {
        InsightCard {
            kind: InsightKind::Tip,
            title: "Great Job!".to_string(),
            description: "You're prioritizing groceries over delivery. That's smart budgeting!"
                .to_string(),
            suggestion: "Maintain this balance, it's keeping your finances stable!".to_string(),
            impact: "€120/year saved".to_string(),
        }
    }
}

fn spending_pattern(ctx: &InsightContext) -> InsightCard {
    InsightCard {
        kind: InsightKind::Trend,
        title: "Spending Pattern Detected".to_string(),
        description: format!(
            "Your average transaction is {}. Most of your spending happens on {}.",
            eur(ctx.metrics().avg_transaction),
            ctx.top().name.to_lowercase()
        ),
        suggestion: "You might benefit from setting a limit per category next month.".to_string(),
        impact: "Moderate Impact".to_string(),
    }
}

fn goal_proximity(ctx: &InsightContext) -> InsightCard {
    let goal = ctx.goal();
    let near = goal.current >= goal.target * NEAR_GOAL_RATIO;
    InsightCard {
        kind: if near { InsightKind::Opportunity } else { InsightKind::Tip },
        title: if near { "Almost There!" } else { "Keep Pushing!" }.to_string(),
        description: format!(
            "You're {}% of the way to your {} goal.",
            ctx.metrics().goal_progress_pct,
            eur(goal.target)
        ),
        suggestion: "Add an extra €10/week and you'll hit your target one week early!".to_string(),
        impact: format!("{} remaining", eur(goal.remaining().max(0.0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ProgressPolicy;
    use crate::transaction::{SavingGoal, Transaction};
    use chrono::NaiveDate;

    fn ctx(delivery: f64, groceries: f64, goal: SavingGoal) -> InsightContext {
        let date = NaiveDate::from_ymd_opt(2025, 10, 9).unwrap();
        let txns = vec![
            Transaction::new(1, date, "Food Delivery", delivery, "🍕"),
            Transaction::new(2, date, "Groceries", groceries, "🛒"),
        ];
        InsightContext::build(&txns, goal, ProgressPolicy::Clamped).unwrap()
    }

    #[test]
    fn test_three_cards() {
        let cards = dashboard_insights(&ctx(50.0, 30.0, SavingGoal::new(145.0, 200.0)));
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1].kind, InsightKind::Trend);
    }

    #[test]
    fn test_delivery_warning() {
        let cards = dashboard_insights(&ctx(50.0, 30.0, SavingGoal::new(145.0, 200.0)));
        assert_eq!(cards[0].kind, InsightKind::Warning);
        assert!(cards[0].description.contains("€50.00 on delivery vs €30.00"));
        assert!(cards[0].description.contains("€30.00/month"));
    }

    #[test]
    fn test_groceries_first_is_praised() {
        let cards = dashboard_insights(&ctx(20.0, 30.0, SavingGoal::new(145.0, 200.0)));
        assert_eq!(cards[0].kind, InsightKind::Tip);
        assert_eq!(cards[0].title, "Great Job!");
    }

    #[test]
    fn test_goal_proximity_threshold() {
        let near = dashboard_insights(&ctx(20.0, 30.0, SavingGoal::new(150.0, 200.0)));
        assert_eq!(near[2].kind, InsightKind::Opportunity);
        assert_eq!(near[2].impact, "€50.00 remaining");
        assert!(near[2].description.contains("75%"));

        let far = dashboard_insights(&ctx(20.0, 30.0, SavingGoal::new(100.0, 200.0)));
        assert_eq!(far[2].kind, InsightKind::Tip);
        assert_eq!(far[2].title, "Keep Pushing!");
    }

    #[test]
    fn test_pattern_mentions_top_category() {
        let cards = dashboard_insights(&ctx(20.0, 30.0, SavingGoal::new(1.0, 2.0)));
        assert!(cards[1].description.contains("groceries"));
        assert!(cards[1].description.contains("€25.00"));
    }
}
