//! Canned dock-topic briefings at three depths, navigated with chips.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoachError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DockTopic {
    Spending,
    Savings,
    Portfolio,
    Health,
    Budget,
    Goals,
    Alerts,
}

impl DockTopic {
    pub const ALL: [DockTopic; 7] = [
        DockTopic::Spending,
        DockTopic::Savings,
        DockTopic::Portfolio,
        DockTopic::Health,
        DockTopic::Budget,
        DockTopic::Goals,
        DockTopic::Alerts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DockTopic::Spending => "spending",
            DockTopic::Savings => "savings",
            DockTopic::Portfolio => "portfolio",
            DockTopic::Health => "health",
            DockTopic::Budget => "budget",
            DockTopic::Goals => "goals",
            DockTopic::Alerts => "alerts",
        }
    }
}

impl fmt::Display for DockTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DockTopic {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        DockTopic::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| CoachError::UnknownTopic(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Insights,
    Explanation,
    Actions,
}

impl Depth {
    pub const ALL: [Depth; 3] = [Depth::Insights, Depth::Explanation, Depth::Actions];

    pub fn chip(&self) -> &'static str {
        match self {
            Depth::Insights => "Show insights",
            Depth::Explanation => "Explain more",
            Depth::Actions => "Give me actions",
        }
    }

    pub fn from_chip(chip: &str) -> Option<Self> {
        let chip = chip.trim();
        Depth::ALL.into_iter().find(|d| d.chip().eq_ignore_ascii_case(chip))
    }
}

impl FromStr for Depth {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insights" | "insight" => Ok(Depth::Insights),
            "explain" | "explanation" => Ok(Depth::Explanation),
            "actions" | "action" => Ok(Depth::Actions),
            other => Depth::from_chip(other).ok_or_else(|| CoachError::UnknownTopic(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Briefing {
    pub topic: DockTopic,
    pub depth: Depth,
    pub title: String,
    pub text: String,
    /// The other two depths, offered as follow-ups
    pub chips: Vec<String>,
}

pub fn briefing(topic: DockTopic, depth: Depth) -> Briefing {
    let title = match depth {
        Depth::Insights => "Key Insights",
        Depth::Explanation => "Detailed Breakdown",
        Depth::Actions => "Recommended Actions",
    };
    Briefing {
        topic,
        depth,
        title: title.to_string(),
        text: content(topic, depth).to_string(),
        chips: Depth::ALL
            .into_iter()
            .filter(|d| *d != depth)
            .map(|d| d.chip().to_string())
            .collect(),
    }
}

fn content(topic: DockTopic, depth: Depth) -> &'static str {
    use DockTopic::*;
    use Depth::*;
    match (topic, depth) {
        (Spending, Insights) => "- 37% of spending is non-essential (delivery + entertainment)\n- Weekend spending runs 62% above weekdays\n- You're €60 over budget this month\n\nCutting non-essential spend by 30% saves ~€120/month.",
        (Spending, Explanation) => "Week 2 spiked (+€90): weekend delivery €65, cinema and a concert €95, impulse buys €50.\nBudget capacity is a steady €450/week; last month averaged €413/week against €445/week now.",
        (Spending, Actions) => "1. Weekly cap of €400 with a mid-week checkpoint\n2. Delivery limit: max 2x/week (~€100/month)\n3. Flag entertainment over €50 for review\n4. Sunday 5-minute budget check\n\nStart with #2: highest impact, easiest to do.",
        (Savings, Insights) => "- 3 unused subscriptions (€47/month)\n- Meal prepping saves ~€80/month on dining\n- Insurance comparison: ~€35/month\n\nTotal potential: €162/month.",
        (Savings, Explanation) => "Opportunities come from subscriptions unused for 30+ days, comparison with similar profiles, and frequent low-value transactions. Dining has the most room because of premium-priced delivery orders.",
        (Savings, Actions) => "1. Cancel unused subscriptions\n2. Cook 4 dinners on Sundays\n3. Auto-transfer €150/week to high-yield savings\n4. Spend 15 minutes comparing insurance\n\nStart with #1: €47/month immediately.",
        (Portfolio, Insights) => "- Equities-heavy allocation (50%) adds volatility\n- Risk-adjusted return 1.8% vs market 2.1%\n- Diversification score 68/100\n\nRebalance toward 40/30/20/10 (equities/funds/bonds/cash).",
        (Portfolio, Explanation) => "Equities 50% drive growth and volatility; funds 25% are balanced; bonds 15% anchor stability; cash 10% is the liquidity buffer. The bond gap leaves you under-protected in downturns.",
        (Portfolio, Actions) => "1. Move 10% from equities to bonds\n2. Turn on dividend reinvestment\n3. Rebalance quarterly\n4. Harvest losses before year-end\n\nStart with #2: passive compounding.",
        (Health, Insights) => "- Overall score 68.5/100 (Good)\n- Strength: savings rate 78%\n- Weakness: credit utilization 42%, aim for under 30%\n\nQuick win: pay down €500 on the card for about +8 points.",
        (Health, Explanation) => "Four equally weighted dimensions: savings rate (78), budget adherence (83), credit utilization (42), goal momentum (71). Credit utilization drags the score and is the fastest to fix.",
        (Health, Actions) => "1. Pay €500 extra on the credit card\n2. Put every bill on auto-pay\n3. Add €100/month to the emergency fund\n4. Raise retirement contributions 2%\n\nStart with #1: fastest improvement.",
        (Budget, Insights) => "- Dining at 73% of budget, the highest\n- Groceries 62% and shopping 58% on track\n- Transport 48%, well controlled\n\nYou tend to overspend dining by week 3.",
        (Budget, Explanation) => "Utilization of a €500 monthly budget per category: groceries €310, transport €240, dining €365, shopping €290. Dining passes 70% by mid-month, so weekly sub-limits help.",
        (Budget, Actions) => "1. Split dining into weekly sub-budgets (€112.50/week)\n2. Alerts at 50%, 75% and 90%\n3. Freeze shopping at 100%\n4. Roll unused budget into savings\n\nStart with #1.",
        (Goals, Insights) => "- Emergency fund 75% (2 months ahead)\n- Home down payment 35% (on track)\n- Retirement 45% (needs +€150/month)\n\nPriority: raise retirement contributions before the employer match deadline.",
        (Goals, Explanation) => "Emergency fund €7,500 of €10,000; vacation €3,600 of €6,000; down payment €17,500 of €50,000; retirement €45,000 of €100,000. Only retirement is behind pace.",
        (Goals, Actions) => "1. Weekly auto-transfers to each goal\n2. Send 50% of windfalls to goals\n3. Put freelance income toward the down payment\n4. Push the vacation 3 months, redirect to retirement\n\nStart with #1: consistency wins.",
        (Alerts, Insights) => "- Alerts peak Wed-Fri\n- 60% are budget threshold warnings\n- 3 unusual transactions flagged this week\n\nConsider spending caps for Thu-Sat.",
        (Alerts, Explanation) => "Mon-Tue quiet (1-2), Wednesday mid-week dining spike (4), Thu-Fri weekend prep (3-5), weekend quiet again. Most alerts are preventive warnings, not overspend reports.",
        (Alerts, Actions) => "1. Per-category alert thresholds\n2. Extra scrutiny Thu-Sat\n3. Merchant alerts for impulse triggers\n4. A Sunday digest instead of daily pings\n\nStart with #2.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_topic_and_depth_has_content() {
        for t in DockTopic::ALL {
            for d in Depth::ALL {
                let b = briefing(t, d);
                assert!(!b.text.is_empty(), "{t} {d:?}");
                assert_eq!(b.chips.len(), 2);
                assert!(!b.chips.contains(&d.chip().to_string()));
            }
        }
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!("Savings".parse::<DockTopic>().unwrap(), DockTopic::Savings);
        let err = "crypto".parse::<DockTopic>().unwrap_err();
        assert_eq!(err, CoachError::UnknownTopic("crypto".to_string()));
    }

    #[test]
    fn test_chip_navigation() {
        let first = briefing(DockTopic::Budget, Depth::Insights);
        let next = Depth::from_chip(&first.chips[0]).unwrap();
        assert_eq!(next, Depth::Explanation);
        assert_eq!(Depth::from_chip("give me ACTIONS"), Some(Depth::Actions));
        assert_eq!(Depth::from_chip("more please"), None);
    }

    #[test]
    fn test_depth_parse() {
        assert_eq!("explain".parse::<Depth>().unwrap(), Depth::Explanation);
        assert_eq!("Show insights".parse::<Depth>().unwrap(), Depth::Insights);
        assert!("deeper".parse::<Depth>().is_err());
    }
}
