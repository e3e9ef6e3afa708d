//! Impulse guard: the purchase intervention flow.
//!
//! ```text
//! Idle --trigger--> Intervention --continue--> Checkin --save--> Saved --(delay)--> Idle
//!                                                   \--proceed_anyway--> Idle
//! ```
//!
//! Triggers are swallowed while the guard is disabled. Stress readings are
//! simulated from the injected random source, never from a sensor.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{CoachError, Result};
use crate::transaction::SavingGoal;

pub const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_secs(3);
pub const BASELINE_HEART_RATE: u32 = 70;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuardState {
    Idle,
    Intervention,
    Checkin,
    Saved,
    /// Passed through on the way back to `Idle`; never held.
    Proceeded,
}

impl GuardState {
    pub fn name(&self) -> &'static str {
        match self {
            GuardState::Idle => "idle",
            GuardState::Intervention => "intervention",
            GuardState::Checkin => "checkin",
            GuardState::Saved => "saved",
            GuardState::Proceeded => "proceeded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressReading {
    pub heart_rate: u32,
    pub baseline: u32,
    pub stress_score: u32,
    pub trigger: String,
}

impl StressReading {
    /// Heart rate in 85..105 bpm, stress score in 60..100.
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            heart_rate: rng.gen_range(85..105),
            baseline: BASELINE_HEART_RATE,
            stress_score: rng.gen_range(60..100),
            trigger: "Purchase attempt detected".to_string(),
        }
    }

    pub fn pct_above_baseline(&self) -> i64 {
        let delta = self.heart_rate as f64 - self.baseline as f64;
        (delta / self.baseline as f64 * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    pub amount: f64,
    pub merchant: String,
}

/// Answer to "why are you buying this?"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Stressed,
    Need,
    Deal,
    Want,
}

impl Reason {
    pub const ALL: [Reason; 4] = [Reason::Stressed, Reason::Need, Reason::Deal, Reason::Want];

    pub fn label(&self) -> &'static str {
        match self {
            Reason::Stressed => "I'm stressed/emotional",
            Reason::Need => "I genuinely need this",
            Reason::Deal => "It's a great deal I've been waiting for",
            Reason::Want => "I just want it",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Reason::Stressed => "😰",
            Reason::Need => "✅",
            Reason::Deal => "💰",
            Reason::Want => "🤷",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "stressed" | "emotional" | "1" => Some(Reason::Stressed),
            "need" | "2" => Some(Reason::Need),
            "deal" | "3" => Some(Reason::Deal),
            "want" | "4" => Some(Reason::Want),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reflection {
    pub reason: Option<Reason>,
    /// "How will you feel about this tomorrow?" 0 = regret, 100 = happy
    pub regret: Option<u8>,
}

/// Lives from a successful trigger until the guard is idle again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterventionSession {
    pub stress: StressReading,
    pub purchase: Purchase,
    pub reflection: Reflection,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GuardStats {
    pub saved: f64,
    pub prevented: u32,
    pub streak_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardEvent {
    Trigger { amount: f64, merchant: String },
    Continue,
    Reflect { reason: Reason, regret: Option<u8> },
    Save,
    ProceedAnyway,
    Tick,
}

impl GuardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GuardEvent::Trigger { .. } => "trigger",
            GuardEvent::Continue => "continue",
            GuardEvent::Reflect { .. } => "reflect",
            GuardEvent::Save => "save",
            GuardEvent::ProceedAnyway => "proceed anyway",
            GuardEvent::Tick => "tick",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Saved { amount: f64 },
    Proceeded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Nothing changed (disabled trigger, tick before the delay elapsed).
    Ignored,
    /// Session data was updated without a state change.
    Recorded,
    Entered(GuardState),
    /// The flow finished; the guard is in `Saved` or already back in `Idle`.
    Completed(Outcome),
}

pub struct ImpulseGuard<R> {
    enabled: bool,
    state: GuardState,
    session: Option<InterventionSession>,
    stats: GuardStats,
    display_delay: Duration,
    saved_at: Option<Instant>,
    rng: R,
}

impl<R: Rng> ImpulseGuard<R> {
    pub fn new(rng: R) -> Self {
        Self {
            enabled: true,
            state: GuardState::Idle,
            session: None,
            stats: GuardStats::default(),
            display_delay: DEFAULT_DISPLAY_DELAY,
            saved_at: None,
            rng,
        }
    }

    pub fn with_stats(mut self, stats: GuardStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_display_delay(mut self, delay: Duration) -> Self {
        self.display_delay = delay;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling mid-flow abandons the current session.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.state != GuardState::Idle {
            tracing::info!(from = self.state.name(), "guard disabled, dropping session");
            self.reset();
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn session(&self) -> Option<&InterventionSession> {
        self.session.as_ref()
    }

    pub fn stats(&self) -> GuardStats {
        self.stats
    }

    pub fn display_delay(&self) -> Duration {
        self.display_delay
    }

    pub fn trigger(&mut self, amount: f64, merchant: impl Into<String>) -> Result<Transition> {
        if !self.enabled {
            tracing::debug!("guard disabled, trigger ignored");
            return Ok(Transition::Ignored);
        }
        self.expect(GuardState::Idle, "trigger")?;

        let merchant = merchant.into();
        let stress = StressReading::simulate(&mut self.rng);
        tracing::info!(amount, %merchant, heart_rate = stress.heart_rate, "intervention started");
        self.session = Some(InterventionSession {
            stress,
            purchase: Purchase { amount, merchant },
            reflection: Reflection::default(),
        });
        Ok(self.enter(GuardState::Intervention))
    }

    pub fn continue_to_checkin(&mut self) -> Result<Transition> {
        self.expect(GuardState::Intervention, "continue")?;
        Ok(self.enter(GuardState::Checkin))
    }

    /// Record check-in answers. `regret` is capped at 100.
    pub fn reflect(&mut self, reason: Reason, regret: Option<u8>) -> Result<Transition> {
        self.expect(GuardState::Checkin, "reflect")?;
        if let Some(session) = self.session.as_mut() {
            session.reflection = Reflection {
                reason: Some(reason),
                regret: regret.map(|r| r.min(100)),
            };
        }
        Ok(Transition::Recorded)
    }

    /// Divert the purchase amount into the goal. The guard stays in `Saved`
    /// until `tick` sees the display delay elapse.
    pub fn save(&mut self, goal: &mut SavingGoal, now: Instant) -> Result<Transition> {
        self.expect(GuardState::Checkin, "save")?;
        let amount = self.session.as_ref().map(|s| s.purchase.amount).unwrap_or(0.0);

        goal.deposit(amount);
        self.stats.saved += amount;
        self.stats.prevented += 1;
        self.saved_at = Some(now);
        self.enter(GuardState::Saved);
        tracing::info!(amount, goal_current = goal.current, "purchase saved for later");
        Ok(Transition::Completed(Outcome::Saved { amount }))
    }

    pub fn proceed_anyway(&mut self) -> Result<Transition> {
        self.expect(GuardState::Checkin, "proceed anyway")?;
        self.enter(GuardState::Proceeded);
        self.reset();
        Ok(Transition::Completed(Outcome::Proceeded))
    }

    /// Return from `Saved` to `Idle` once the display delay has passed.
    pub fn tick(&mut self, now: Instant) -> Transition {
        match (self.state, self.saved_at) {
            (GuardState::Saved, Some(at)) if now.saturating_duration_since(at) >= self.display_delay => {
                self.reset();
                Transition::Entered(GuardState::Idle)
            }
            _ => Transition::Ignored,
        }
    }

    pub fn handle(&mut self, event: GuardEvent, goal: &mut SavingGoal, now: Instant) -> Result<Transition> {
        match event {
            GuardEvent::Trigger { amount, merchant } => self.trigger(amount, merchant),
            GuardEvent::Continue => self.continue_to_checkin(),
            GuardEvent::Reflect { reason, regret } => self.reflect(reason, regret),
            GuardEvent::Save => self.save(goal, now),
            GuardEvent::ProceedAnyway => self.proceed_anyway(),
            GuardEvent::Tick => Ok(self.tick(now)),
        }
    }

    /// Nudge shown during check-in when the buyer admits to stress.
    pub fn reflection_insight(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        if session.reflection.reason != Some(Reason::Stressed) {
            return None;
        }
        Some(format!(
            "You've prevented {} emotional purchases this month, saving €{:.2}. Your wallet will thank you tomorrow!",
            self.stats.prevented, self.stats.saved
        ))
    }

    fn expect(&self, state: GuardState, event: &'static str) -> Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(CoachError::InvalidTransition {
                state: self.state.name(),
                event,
            })
        }
    }

    fn enter(&mut self, next: GuardState) -> Transition {
        tracing::debug!(from = self.state.name(), to = next.name(), "guard transition");
        self.state = next;
        Transition::Entered(next)
    }

    fn reset(&mut self) {
        self.state = GuardState::Idle;
        self.session = None;
        self.saved_at = None;
    }
}
