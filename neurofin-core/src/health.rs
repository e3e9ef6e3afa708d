//! Financial health score: equal-weight mean over scored dimensions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthDimension {
    pub subject: String,
    /// Score out of 100
    pub value: f64,
    pub description: String,
}

impl HealthDimension {
    pub fn new(subject: impl Into<String>, value: f64, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            value,
            description: description.into(),
        }
    }
}

/// Dimensions scored when the caller supplies none.
pub fn default_dimensions() -> Vec<HealthDimension> {
    vec![
        HealthDimension::new("Savings", 90.0, "Emergency fund and savings rate"),
        HealthDimension::new("Spending", 78.0, "Budget adherence and control"),
        HealthDimension::new("Debt", 95.0, "Debt-to-income ratio"),
        HealthDimension::new("Investments", 72.0, "Portfolio diversification"),
        HealthDimension::new("Emergency", 80.0, "Emergency fund coverage"),
        HealthDimension::new("Goals", 75.0, "Financial goal progress"),
    ]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthTier {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl HealthTier {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 85 => HealthTier::Excellent,
            s if s >= 70 => HealthTier::Good,
            s if s >= 50 => HealthTier::Fair,
            _ => HealthTier::NeedsWork,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthTier::Excellent => "Excellent",
            HealthTier::Good => "Good",
            HealthTier::Fair => "Fair",
            HealthTier::NeedsWork => "Needs Work",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            HealthTier::Excellent => "Outstanding financial health! Your disciplined approach to savings and spending is paying off. Keep it up.",
            HealthTier::Good => "Your finances are in solid shape. Focus on investment diversification and your emergency fund to reach excellent.",
            HealthTier::Fair => "You're on the right track with room for growth. Prioritize reducing debt and increasing your savings rate.",
            HealthTier::NeedsWork => "Let's strengthen your financial foundation. Start with budgeting and tracking your spending consistently.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub overall: i64,
    pub tier: HealthTier,
    pub dimensions: Vec<HealthDimension>,
}

impl HealthReport {
    /// Score the given dimensions; an empty slice scores the defaults.
    pub fn from_dimensions(dimensions: &[HealthDimension]) -> Self {
        let dimensions = if dimensions.is_empty() {
            default_dimensions()
        } else {
            dimensions.to_vec()
        };
        let mean = dimensions.iter().map(|d| d.value).sum::<f64>() / dimensions.len() as f64;
        let overall = mean.round() as i64;
        Self {
            overall,
            tier: HealthTier::from_score(overall),
            dimensions,
        }
    }

    pub fn weakest(&self) -> Option<&HealthDimension> {
        self.dimensions
            .iter()
            .min_by(|a, b| a.value.total_cmp(&b.value))
    }
}
