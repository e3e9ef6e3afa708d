use anyhow::{bail, Context, Result};
use neurofin_core::{ProgressPolicy, SavingGoal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::{ensure_neurofin_home, neurofin_home};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub coach: CoachSection,
    pub goal: GoalSection,
    pub guard: GuardSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoachSection {
    /// Simulated "thinking" pause before each chat reply
    pub thinking_delay_ms: u64,
    /// Fixed seed for the fallback replies and stress readings (random when unset)
    pub seed: Option<u64>,
    /// Transactions CSV to use instead of the built-in demo data
    pub transactions_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalSection {
    pub current: f64,
    pub target: f64,
    pub weeks: Option<u32>,
    pub progress_policy: ProgressPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardSection {
    pub enabled: bool,
    /// How long the "saved" confirmation stays up before the guard rearms
    pub saved_display_secs: u64,
}

impl Default for CoachSection {
    fn default() -> Self {
        Self {
            thinking_delay_ms: 1200,
            seed: None,
            transactions_csv: None,
        }
    }
}

impl Default for GoalSection {
    fn default() -> Self {
        Self {
            current: 145.0,
            target: 200.0,
            weeks: Some(3),
            progress_policy: ProgressPolicy::Clamped,
        }
    }
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            enabled: true,
            saved_display_secs: 3,
        }
    }
}

impl CoachSection {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

impl GoalSection {
    pub fn saving_goal(&self) -> SavingGoal {
        SavingGoal {
            weeks: self.weeks,
            ..SavingGoal::new(self.current, self.target)
        }
    }
}

impl GuardSection {
    pub fn saved_display(&self) -> Duration {
        Duration::from_secs(self.saved_display_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(neurofin_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Missing file means defaults; a present but broken file is an error.
pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    if !(cfg.goal.target.is_finite() && cfg.goal.target > 0.0) {
        bail!("{}: goal.target must be > 0 (got {})", p.display(), cfg.goal.target);
    }
    Ok(cfg)
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = ensure_neurofin_home()?.join("config.toml");
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    if p.exists() {
        println!("# {}", p.display());
    } else {
        println!("# {} (not found, showing defaults)", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.coach.thinking_delay(), Duration::from_millis(1200));
        assert_eq!(cfg.guard.saved_display(), Duration::from_secs(3));
        assert_eq!(cfg.goal.saving_goal().weeks, Some(3));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[coach]\nseed = 42\n\n[goal]\nprogress_policy = \"unclamped\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.coach.seed, Some(42));
        assert_eq!(cfg.coach.thinking_delay_ms, 1200);
        assert_eq!(cfg.goal.progress_policy, ProgressPolicy::Unclamped);
        assert_eq!(cfg.goal.target, 200.0);
        assert!(cfg.guard.enabled);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.coach.transactions_csv = Some(PathBuf::from("/tmp/october.csv"));
        cfg.guard.enabled = false;
        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_zero_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[goal]\ntarget = 0.0\n").unwrap();
        let err = load_config_from(&p).unwrap_err();
        assert!(err.to_string().contains("goal.target"));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[coach\nseed = ").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
