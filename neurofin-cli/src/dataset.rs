use anyhow::{bail, Context, Result};
use neurofin_core::{InsightContext, Transaction};
use neurofin_ledger::{load_transactions_csv, sample};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Transactions plus the derived context every command reads.
pub struct Dataset {
    pub source: String,
    pub transactions: Vec<Transaction>,
    pub ctx: InsightContext,
}

/// `--csv` wins over `coach.transactions_csv`; with neither, the demo data.
pub fn load(cfg: &Config, csv: Option<PathBuf>) -> Result<Dataset> {
    let (source, transactions) = match csv.or_else(|| cfg.coach.transactions_csv.clone()) {
        Some(p) => (p.display().to_string(), read_csv(&p)?),
        None => ("built-in demo data".to_string(), sample::transactions()),
    };

    let ctx = InsightContext::build(&transactions, cfg.goal.saving_goal(), cfg.goal.progress_policy)
        .with_context(|| format!("deriving insights from {source}"))?;
    tracing::debug!(%source, count = transactions.len(), "dataset ready");

    Ok(Dataset {
        source,
        transactions,
        ctx,
    })
}

fn read_csv(p: &Path) -> Result<Vec<Transaction>> {
    if !p.exists() {
        bail!("CSV not found: {} (pass --csv <path>)", p.display());
    }
    load_transactions_csv(p).with_context(|| format!("parsing {}", p.display()))
}

/// Seeded when `coach.seed` (or an explicit override) is set.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
