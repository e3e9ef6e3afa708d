//! Keyword-routed coach replies.
//!
//! Input is lowercased and checked against an ordered rule table; the first
//! rule with a keyword contained in the input picks the topic. Order matters:
//! "analyze my food spending" is a spending question, not a food one.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::aggregate::round2;
use crate::metrics::InsightContext;

/// Canned questions offered as quick actions; they go through the router
/// exactly like typed input.
pub const QUICK_QUESTIONS: [&str; 4] = [
    "Give me a breakdown",
    "How can I save more?",
    "Analyze my food spending",
    "Tips to reach my goal",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Spending,
    Food,
    Goal,
    Tips,
    Transport,
    Default,
}

/// Graphic attached to a reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Welcome,
    Spending,
    Food,
    Goal,
    Tips,
    Transport,
    General,
}

impl Topic {
    pub fn chart(&self) -> ChartKind {
        match self {
            Topic::Spending => ChartKind::Spending,
            Topic::Food => ChartKind::Food,
            Topic::Goal => ChartKind::Goal,
            Topic::Tips => ChartKind::Tips,
            Topic::Transport => ChartKind::Transport,
            Topic::Default => ChartKind::General,
        }
    }
}

/// One routing rule: any keyword as a substring selects the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

impl Rule {
    pub const fn new(topic: Topic, keywords: &'static [&'static str]) -> Self {
        Self { topic, keywords }
    }

    /// `normalized` must already be lowercase.
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k))
    }
}

pub const DEFAULT_RULES: [Rule; 5] = [
    Rule::new(Topic::Spending, &["breakdown", "spending", "analysis"]),
    Rule::new(Topic::Food, &["food", "delivery", "restaurant"]),
    Rule::new(Topic::Goal, &["goal", "save", "saving"]),
    Rule::new(Topic::Tips, &["tip", "advice", "help"]),
    Rule::new(Topic::Transport, &["transport", "car", "uber"]),
];

/// A routed answer, ready to append to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub topic: Topic,
    pub title: String,
    pub text: String,
    pub chart: ChartKind,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<Rule>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl Router {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Evaluation order of the rule table.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn classify(&self, input: &str) -> Topic {
        let normalized = input.to_lowercase();
        let topic = self
            .rules
            .iter()
            .find(|r| r.matches(&normalized))
            .map(|r| r.topic)
            .unwrap_or(Topic::Default);
        tracing::debug!(?topic, input, "routed input");
        topic
    }

    /// Route `input` and render its template. `rng` is only consulted for
    /// the default fallback, which picks one of three canned variants.
    pub fn respond<R: Rng + ?Sized>(&self, input: &str, ctx: &InsightContext, rng: &mut R) -> Reply {
        let topic = self.classify(input);
        let (title, text) = match topic {
            Topic::Spending => spending(ctx),
            Topic::Food => food(ctx),
            Topic::Goal => goal(ctx),
            Topic::Tips => tips(ctx),
            Topic::Transport => transport(ctx),
            Topic::Default => fallback(ctx, rng.gen_range(0..3)),
        };
        Reply {
            topic,
            title: title.to_string(),
            text,
            chart: topic.chart(),
            chips: chips_for(topic),
        }
    }
}

pub(crate) fn eur(v: f64) -> String {
    format!("€{:.2}", v)
}

fn chips_for(topic: Topic) -> Vec<String> {
    let picks = match topic {
        Topic::Spending | Topic::Tips => vec![QUICK_QUESTIONS[3], QUICK_QUESTIONS[2]],
        Topic::Food | Topic::Transport => vec![QUICK_QUESTIONS[1], QUICK_QUESTIONS[0]],
        Topic::Goal => vec!["Give me some tips", QUICK_QUESTIONS[0]],
        Topic::Default => QUICK_QUESTIONS.to_vec(),
    };
    picks.into_iter().map(String::from).collect()
}

fn spending(ctx: &InsightContext) -> (&'static str, String) {
    let total = ctx.metrics().total_spent;
    let top3: Vec<String> = ctx
        .categories()
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. {} {}: {} ({:.0}%)",
                i + 1,
                c.emoji,
                c.name,
                eur(c.value),
                ctx.share_pct(c.value)
            )
        })
        .collect();

    let text = format!(
        "Your total spending this month is {} across {} transactions.\n\n\
Top categories:\n{}\n\n\
Insight: {} is your biggest expense category. Consider setting a budget limit here!",
        eur(total),
        ctx.transaction_count(),
        top3.join("\n"),
        ctx.top().name
    );
    ("Spending Breakdown", text)
}

fn food(ctx: &InsightContext) -> (&'static str, String) {
    let delivery = ctx.category_value("Food Delivery");
    let potential = delivery * 0.6;
    let trips = (potential / 20.0).floor() as i64;
    let text = format!(
        "You've spent {} on food delivery this month.\n\n\
If you cooked at home instead:\n\
- Potential savings: {}\n\
- That's enough for {} extra grocery trips!\n\n\
Challenge: try cutting delivery orders by 2 per week. That alone could save €40-50/month.",
        eur(delivery),
        eur(round2(potential)),
        trips
    );
    ("Food Delivery Analysis", text)
}

fn goal(ctx: &InsightContext) -> (&'static str, String) {
    let g = ctx.goal();
    let text = format!(
        "Current progress: {} / {}\n\
That's {}% complete!\n\n\
Remaining: {}\n\n\
Ways to get there faster:\n\
- Cut 2 food deliveries = save €60\n\
- Use public transport twice = save €10\n\
- Skip one shopping trip = save €45",
        eur(g.current),
        eur(g.target),
        ctx.metrics().goal_progress_pct,
        eur(g.remaining())
    );
    ("Your Saving Goal", text)
}

fn tips(ctx: &InsightContext) -> (&'static str, String) {
    let shopping = ctx.category_value("Shopping");
    let weekly = ctx.metrics().total_spent / 4.0;
    let text = format!(
        "Based on your spending patterns:\n\n\
1. Meal prep Sundays: cook in bulk to avoid delivery temptation\n\
2. 30-day rule: wait 30 days before big purchases (Shopping: {})\n\
3. Round-up savings: round transactions to the nearest €5 and save the difference\n\
4. Weekly budget: set a {}/week limit\n\n\
Pick one to start with!",
        eur(shopping),
        eur(weekly)
    );
    ("Smart Money Tips", text)
}

fn transport(ctx: &InsightContext) -> (&'static str, String) {
    let spent = ctx.category_value("Transport");
    let text = format!(
        "You've spent {} on transport.\n\n\
Ways to save:\n\
- Monthly public transport pass ≈ €50 (vs your {})\n\
- Bike for short trips: free and healthy\n\
- Carpool with colleagues: save 50%\n\n\
Small changes add up!",
        eur(spent),
        eur(spent)
    );
    ("Transport Spending", text)
}

fn fallback(ctx: &InsightContext, variant: u32) -> (&'static str, String) {
    let text = match variant {
        0 => format!(
            "I analyzed your data! Your spending is concentrated in {} ({:.0}%). Want specific tips for this category?",
            ctx.top().name,
            ctx.share_pct(ctx.top().value)
        ),
        1 => format!(
            "Great question! Your average transaction is {}. You're {}% toward your goal. Need help optimizing?",
            eur(ctx.metrics().avg_transaction),
            ctx.metrics().goal_progress_pct
        ),
        _ => format!(
            "Looking at your patterns, you could save {}/month by meal prepping! Want a breakdown?",
            eur(ctx.category_value("Food Delivery") * 0.4)
        ),
    };
    ("AI Coach", text)
}
