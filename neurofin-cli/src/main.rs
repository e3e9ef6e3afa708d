use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use neurofin_core::{
    briefing, dashboard_insights, AppEvent, Depth, DockTopic, EventBus, HealthReport,
    ImpulseGuard, Outcome, Router,
};
use neurofin_ledger::sample;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod chat;
mod config;
mod dataset;
mod guard_cmd;
mod responder;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "neurofin",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("NEUROFIN_BUILD_SHA"), ")"),
    about = "NeuroFin spending coach"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Category totals, key metrics and insight cards
    Dashboard {
        /// Transactions CSV (defaults to coach.transactions_csv, then demo data)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Ask the coach one question
    Ask {
        /// The question, e.g. "Show my spending breakdown"
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Seed for the fallback reply (overrides coach.seed)
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Interactive coach chat (TTY required)
    Chat {
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Topic briefing at a chosen depth
    Brief {
        /// spending, savings, portfolio, health, budget, goals or alerts
        topic: DockTopic,

        /// insights, explain or actions
        #[arg(long, default_value = "insights")]
        depth: Depth,
    },

    /// Simulate a purchase attempt and walk the impulse-guard intervention
    Guard {
        /// Purchase amount in euros (defaults to the chosen demo purchase)
        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        merchant: Option<String>,

        /// Demo purchase to use when --amount is not given (0-3)
        #[arg(long, default_value_t = 0)]
        demo: usize,

        /// Run with the guard switched off
        #[arg(long)]
        disabled: bool,
    },

    /// Financial health score
    Health {
        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.neurofin/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Dashboard { csv, json } => dashboard(csv, json)?,
        Command::Ask { question, seed, csv } => ask(&question.join(" "), seed, csv)?,
        Command::Chat { csv } => run_chat(csv)?,
        Command::Brief { topic, depth } => {
            let b = briefing(topic, depth);
            println!("{}: {}\n", b.topic, b.title);
            println!("{}\n", b.text);
            println!("Next: {}", b.chips.join(" | "));
        }
        Command::Guard {
            amount,
            merchant,
            demo,
            disabled,
        } => guard(amount, merchant, demo, disabled)?,
        Command::Health { json } => health(json)?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn dashboard(csv: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let ds = dataset::load(&cfg, csv)?;
    let cards = dashboard_insights(&ds.ctx);

    if json {
        let out = serde_json::json!({
            "source": ds.source,
            "rows": ds.transactions.len(),
            "categories": ds.ctx.categories(),
            "metrics": ds.ctx.metrics(),
            "goal": ds.ctx.goal(),
            "insights": cards,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let m = ds.ctx.metrics();
    println!("# Dashboard ({}, {} rows)\n", ds.source, ds.transactions.len());
    println!("## Spending by category\n");
    for c in ds.ctx.categories() {
        println!(
            "{} {:<16} €{:>9.2}  {:>3.0}%",
            c.emoji,
            c.name,
            c.value,
            ds.ctx.share_pct(c.value)
        );
    }
    println!("\n## Metrics\n");
    println!("Total spent:      €{:.2}", m.total_spent);
    println!("Transactions:     {}", ds.ctx.transaction_count());
    println!("Avg transaction:  €{:.2}", m.avg_transaction);
    println!("Top category:     {}", m.top_category);
    println!(
        "Saving goal:      €{:.2} / €{:.2} ({}%)",
        ds.ctx.goal().current, ds.ctx.goal().target, m.goal_progress_pct
    );
    println!("\n## Insights\n");
    for c in &cards {
        println!("[{:?}] {}", c.kind, c.title);
        println!("  {}", c.description);
        println!("  → {} ({})\n", c.suggestion, c.impact);
    }
    Ok(())
}

fn ask(question: &str, seed: Option<u64>, csv: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config()?;
    let ds = dataset::load(&cfg, csv)?;
    let mut rng = dataset::rng(seed.or(cfg.coach.seed));
    let reply = Router::default().respond(question, &ds.ctx, &mut rng);

    println!("{}\n", reply.title);
    println!("{}\n", reply.text);
    if !reply.chips.is_empty() {
        println!("Try: {}", reply.chips.join(" | "));
    }
    Ok(())
}

fn run_chat(csv: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config()?;
    let ds = dataset::load(&cfg, csv)?;

    let (req_tx, req_rx) = tokio::sync::mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = std::sync::mpsc::channel();
    tokio::spawn(responder::run_worker(
        req_rx,
        ev_tx,
        Router::default(),
        ds.ctx,
        dataset::rng(cfg.coach.seed),
        cfg.coach.thinking_delay(),
    ));

    // The TUI loop blocks; keep it off the async workers.
    tokio::task::block_in_place(|| chat::run_chat(req_tx, ev_rx))
}

fn guard(amount: Option<f64>, merchant: Option<String>, demo: usize, disabled: bool) -> Result<()> {
    let cfg = config::load_config()?;

    let (amount, merchant) = match amount {
        Some(a) if a.is_finite() && a > 0.0 => (a, merchant.unwrap_or_else(|| "Online store".to_string())),
        Some(a) => bail!("--amount must be a positive number (got {a})"),
        None => {
            let p = sample::DEMO_PURCHASES.get(demo).with_context(|| {
                format!("--demo must be 0-{}", sample::DEMO_PURCHASES.len() - 1)
            })?;
            (p.amount, merchant.unwrap_or_else(|| p.merchant.to_string()))
        }
    };

    let mut goal = cfg.goal.saving_goal();
    let mut guard = ImpulseGuard::new(dataset::rng(cfg.coach.seed))
        .with_stats(sample::guard_stats())
        .with_display_delay(cfg.guard.saved_display());
    guard.set_enabled(cfg.guard.enabled && !disabled);

    let mut bus = EventBus::new();
    let sub = bus.subscribe();
    bus.publish(&AppEvent::PurchaseAttempt { amount, merchant });

    let stdin = std::io::stdin();
    let outcome = guard_cmd::run_guard(
        &mut guard,
        &mut goal,
        cfg.goal.progress_policy,
        &sub,
        &mut stdin.lock(),
        &mut std::io::stdout(),
    )?;
    if let Some(Outcome::Saved { amount }) = outcome {
        tracing::info!(amount, goal_current = goal.current, "intervention saved money");
    }
    Ok(())
}

fn health(json: bool) -> Result<()> {
    let report = HealthReport::from_dimensions(&[]);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Financial health: {}/100 ({})\n", report.overall, report.tier.label());
    for d in &report.dimensions {
        println!("{:<12} {:>3.0}  {}", d.subject, d.value, d.description);
    }
    println!("\n{}", report.tier.advice());
    if let Some(w) = report.weakest() {
        println!("Focus next on: {}", w.subject);
    }
    Ok(())
}
