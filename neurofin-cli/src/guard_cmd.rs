use anyhow::{bail, Context, Result};
use neurofin_core::{
    goal_progress, AppEvent, GuardState, ImpulseGuard, Outcome, ProgressPolicy, Reason,
    SavingGoal, Subscription, Transition,
};
use rand::Rng;
use std::io::{BufRead, Write};
use std::time::Instant;

fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> Result<String> {
    write!(out, "{}: ", label)?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        bail!("input closed during the intervention");
    }
    Ok(s.trim().to_string())
}

/// Walk the guard through every app event published since the last call.
/// Returns the outcome of the last intervention, if one completed.
pub fn run_guard<R: Rng>(
    guard: &mut ImpulseGuard<R>,
    goal: &mut SavingGoal,
    policy: ProgressPolicy,
    sub: &Subscription<AppEvent>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<Outcome>> {
    let mut outcome = None;
    for ev in sub.drain() {
        match ev {
            AppEvent::PurchaseAttempt { amount, merchant } => {
                outcome = intervene(guard, goal, policy, amount, &merchant, input, out)?;
            }
            AppEvent::GuardToggled { enabled } => guard.set_enabled(enabled),
        }
    }
    Ok(outcome)
}

fn intervene<R: Rng>(
    guard: &mut ImpulseGuard<R>,
    goal: &mut SavingGoal,
    policy: ProgressPolicy,
    amount: f64,
    merchant: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<Outcome>> {
    if guard.trigger(amount, merchant)? == Transition::Ignored {
        writeln!(out, "Impulse guard is off. €{amount:.2} at {merchant} goes through.")?;
        return Ok(None);
    }

    let session = guard.session().context("intervention without a session")?;
    let s = &session.stress;
    writeln!(out, "\n⚠️  Hold on: €{:.2} at {}", session.purchase.amount, session.purchase.merchant)?;
    writeln!(out, "   {}", s.trigger)?;
    writeln!(
        out,
        "   Heart rate {} bpm ({}% above your {} bpm baseline), stress {}/100",
        s.heart_rate,
        s.pct_above_baseline(),
        s.baseline,
        s.stress_score
    )?;
    prompt(input, out, "Press Enter to pause and reflect")?;
    guard.continue_to_checkin()?;

    writeln!(out, "\nWhy are you buying this?")?;
    for (i, r) in Reason::ALL.iter().enumerate() {
        writeln!(out, "  {}. {} {}", i + 1, r.emoji(), r.label())?;
    }
    let reason = loop {
        let answer = prompt(input, out, "Reason (1-4)")?;
        match Reason::parse(&answer) {
            Some(r) => break r,
            None => writeln!(out, "Pick 1-4.")?,
        }
    };
    let regret = prompt(input, out, "How will you feel about it tomorrow? 0=regret, 100=happy (blank to skip)")?
        .parse::<u8>()
        .ok();
    guard.reflect(reason, regret)?;
    if let Some(insight) = guard.reflection_insight() {
        writeln!(out, "💡 {insight}")?;
    }

    loop {
        let choice = prompt(input, out, "[s]ave it for later or [p]roceed anyway")?;
        match choice.to_lowercase().as_str() {
            "s" | "save" => {
                let t = guard.save(goal, Instant::now())?;
                let pct = goal_progress(goal, policy)?;
                writeln!(
                    out,
                    "🎉 Saved €{amount:.2}! Goal: €{:.2} / €{:.2} ({pct}%)",
                    goal.current, goal.target
                )?;
                let stats = guard.stats();
                writeln!(
                    out,
                    "   €{:.2} saved, {} impulses prevented, {} day streak",
                    stats.saved, stats.prevented, stats.streak_days
                )?;
                std::thread::sleep(guard.display_delay());
                guard.tick(Instant::now());
                debug_assert_eq!(guard.state(), GuardState::Idle);
                return Ok(completed(t));
            }
            "p" | "proceed" => {
                let t = guard.proceed_anyway()?;
                writeln!(out, "Okay, go ahead. Mindful spending still counts.")?;
                return Ok(completed(t));
            }
            _ => writeln!(out, "Type s or p.")?,
        }
    }
}

fn completed(t: Transition) -> Option<Outcome> {
    match t {
        Transition::Completed(o) => Some(o),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurofin_core::EventBus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;
    use std::time::Duration;

    fn guard() -> ImpulseGuard<StdRng> {
        ImpulseGuard::new(StdRng::seed_from_u64(3)).with_display_delay(Duration::ZERO)
    }

    fn attempt() -> AppEvent {
        AppEvent::PurchaseAttempt {
            amount: 45.0,
            merchant: "Uber Eats".to_string(),
        }
    }

    fn run(g: &mut ImpulseGuard<StdRng>, goal: &mut SavingGoal, script: &str) -> (Result<Option<Outcome>>, String) {
        let mut bus = EventBus::new();
        let sub = bus.subscribe();
        bus.publish(&attempt());
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let res = run_guard(g, goal, ProgressPolicy::Clamped, &sub, &mut input, &mut out);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_save_path_moves_money_into_goal() {
        let mut g = guard();
        let mut goal = SavingGoal::new(145.0, 200.0);
        let (res, out) = run(&mut g, &mut goal, "\n1\n20\ns\n");
        assert_eq!(res.unwrap(), Some(Outcome::Saved { amount: 45.0 }));
        assert_eq!(goal.current, 190.0);
        assert_eq!(g.state(), GuardState::Idle);
        assert!(out.contains("95%"));
        // stressed buyers get the nudge
        assert!(out.contains("emotional purchases"));
    }

    #[test]
    fn test_proceed_path_leaves_goal_alone() {
        let mut g = guard();
        let mut goal = SavingGoal::new(145.0, 200.0);
        let (res, _) = run(&mut g, &mut goal, "\nwant\n\nmaybe\np\n");
        assert_eq!(res.unwrap(), Some(Outcome::Proceeded));
        assert_eq!(goal.current, 145.0);
        assert_eq!(g.state(), GuardState::Idle);
    }

    #[test]
    fn test_disabled_guard_lets_purchase_through() {
        let mut g = guard();
        g.set_enabled(false);
        let mut goal = SavingGoal::new(145.0, 200.0);
        let (res, out) = run(&mut g, &mut goal, "");
        assert_eq!(res.unwrap(), None);
        assert!(out.contains("goes through"));
    }

    #[test]
    fn test_invalid_reason_reprompts() {
        let mut g = guard();
        let mut goal = SavingGoal::new(0.0, 200.0);
        let (res, out) = run(&mut g, &mut goal, "\n9\n2\n\ns\n");
        assert!(res.is_ok());
        assert!(out.contains("Pick 1-4."));
    }

    #[test]
    fn test_toggle_event_before_attempt_disables() {
        let mut g = guard();
        let mut goal = SavingGoal::new(145.0, 200.0);
        let mut bus = EventBus::new();
        let sub = bus.subscribe();
        bus.publish(&AppEvent::GuardToggled { enabled: false });
        bus.publish(&attempt());
        let mut out = Vec::new();
        let res = run_guard(&mut g, &mut goal, ProgressPolicy::Clamped, &sub, &mut Cursor::new(Vec::new()), &mut out);
        assert_eq!(res.unwrap(), None);
        assert!(!g.is_enabled());
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut g = guard();
        let mut goal = SavingGoal::new(145.0, 200.0);
        let (res, _) = run(&mut g, &mut goal, "\n");
        assert!(res.is_err());
    }
}
