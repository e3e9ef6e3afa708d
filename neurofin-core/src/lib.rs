//! neurofin-core: spending insight engine for the NeuroFin coach
//!
//! Pure logic only. Loading data, terminal I/O and timers live in the
//! ledger and CLI crates.

pub mod error;
pub mod transaction;
pub mod aggregate;
pub mod metrics;
pub mod router;
pub mod chat;
pub mod guard;
pub mod events;
pub mod insights;
pub mod briefing;
pub mod health;

pub use error::{CoachError, Result};
pub use transaction::{SavingGoal, Transaction, TxnKind};
pub use aggregate::{aggregate, category_value, round2, CategoryTotal};
pub use metrics::{compute_metrics, goal_progress, InsightContext, Metrics, ProgressPolicy};
pub use router::{ChartKind, Reply, Router, Rule, Topic, DEFAULT_RULES, QUICK_QUESTIONS};
pub use chat::{ChatMessage, Conversation, MessageId, Sender};
pub use guard::{
    GuardEvent, GuardState, GuardStats, ImpulseGuard, InterventionSession, Outcome, Reason,
    Reflection, StressReading, Transition,
};
pub use events::{AppEvent, EventBus, Subscription};
pub use insights::{dashboard_insights, InsightCard, InsightKind};
pub use briefing::{briefing, Briefing, Depth, DockTopic};
pub use health::{HealthDimension, HealthReport, HealthTier};
