// src/config/mod.rs
//! Process configuration: one TOML file (or built-in defaults), loaded once at startup
//! and handed to each run as an immutable snapshot.

pub mod ai;
pub mod profile;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::category::Category;
use crate::scheduler::CronSchedule;
pub use ai::AiConfig;
pub use profile::{CategoryProfile, DeveloperProfile, FeedCfg, FeedFormat};

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";
pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_HOT_RELOAD: &str = "DIGEST_HOT_RELOAD";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    /// Five-field cron subset, local time.
    pub daily_digest: String,
    pub weekly_digest: Option<String>,
    pub run_on_startup: bool,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            daily_digest: "0 9 * * *".to_string(),
            weekly_digest: Some("0 10 * * 0".to_string()),
            run_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesCfg {
    pub max_items_per_source: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourcesCfg {
    fn default() -> Self {
        Self {
            max_items_per_source: 3,
            timeout_secs: 10,
            user_agent: "NewsBot/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingCfg {
    pub cap: usize,
    pub min_score: f32,
    pub trending_top_k: usize,
}

impl Default for RankingCfg {
    fn default() -> Self {
        Self {
            cap: crate::rank::DEFAULT_CAP,
            min_score: crate::rank::DEFAULT_MIN_SCORE,
            trending_top_k: crate::trending::DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputCfg {
    pub include_links: bool,
    pub include_sources: bool,
    pub max_key_sources: usize,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            include_links: true,
            include_sources: true,
            max_key_sources: 3,
        }
    }
}

fn default_categories() -> BTreeMap<String, CategoryProfile> {
    Category::ALL
        .into_iter()
        .map(|c| (c.id().to_string(), profile::default_profile(c)))
        .collect()
}

/// Root of `config/digest.toml`. Every table is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub schedule: ScheduleCfg,
    #[serde(default)]
    pub sources: SourcesCfg,
    #[serde(default)]
    pub ranking: RankingCfg,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub output: OutputCfg,
    #[serde(default)]
    pub developer: DeveloperProfile,
    /// Keyed by category id ("tech", "security", ...).
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, CategoryProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleCfg::default(),
            sources: SourcesCfg::default(),
            ranking: RankingCfg::default(),
            ai: AiConfig::default(),
            output: OutputCfg::default(),
            developer: DeveloperProfile::default(),
            categories: default_categories(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing digest config")?;
        cfg.validate()?;
        cfg.ai.sanitize();
        if !(0.0..=1.0).contains(&cfg.ranking.min_score) {
            warn!(
                min_score = cfg.ranking.min_score,
                "ranking.min_score out of range, clamping"
            );
            cfg.ranking.min_score = cfg.ranking.min_score.clamp(0.0, 1.0);
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading digest config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH (must exist)
    /// 2) config/digest.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        info!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        for key in self.categories.keys() {
            key.parse::<Category>()
                .with_context(|| format!("invalid [categories.{key}] table"))?;
        }
        CronSchedule::parse(&self.schedule.daily_digest).context("schedule.daily_digest")?;
        if let Some(w) = &self.schedule.weekly_digest {
            CronSchedule::parse(w).context("schedule.weekly_digest")?;
        }
        Ok(())
    }

    /// Profile for one category, if configured.
    pub fn category(&self, category: Category) -> Option<&CategoryProfile> {
        self.categories.get(category.id())
    }

    /// Enabled categories, ordered by configured priority (ties by built-in order).
    pub fn enabled_categories(&self) -> Vec<Category> {
        let mut out: Vec<(i32, Category)> = Category::ALL
            .into_iter()
            .filter_map(|c| {
                self.category(c)
                    .filter(|p| p.enabled)
                    .map(|p| (p.priority, c))
            })
            .collect();
        out.sort();
        out.into_iter().map(|(_, c)| c).collect()
    }
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Shared configuration. Each digest run takes one `snapshot()` and keeps it for the
/// whole run, so a reload never changes scoring mid-run.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<AppConfig>>>,
}

impl ConfigHandle {
    pub fn new(cfg: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(cfg))),
        }
    }

    pub fn snapshot(&self) -> Arc<AppConfig> {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, cfg: AppConfig) {
        match self.inner.write() {
            Ok(mut g) => *g = Arc::new(cfg),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(cfg),
        }
    }
}

/// Returns true if DIGEST_HOT_RELOAD=1.
fn hot_reload_enabled() -> bool {
    std::env::var(ENV_HOT_RELOAD)
        .ok()
        .is_some_and(|v| v == "1")
}

/// Resolve the config path the same way `load_default` does.
pub fn config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Tables that are read once at startup (`[ai]` builds the model client, `[schedule]`
/// spawns the cron jobs) and differ between `old` and `new`. Everything else is read
/// from the handle at each run.
pub fn restart_required(old: &AppConfig, new: &AppConfig) -> Vec<&'static str> {
    let mut out = Vec::new();
    if old.ai != new.ai {
        out.push("ai");
    }
    if old.schedule != new.schedule {
        out.push("schedule");
    }
    out
}

/// Start a simple polling watcher on `path` that swaps in a new config when the file
/// changes. Polls mtime every 2s. Invalid files are logged and ignored.
pub fn start_hot_reload_thread(handle: ConfigHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }
    info!(path = %path.display(), "config hot reload enabled");

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
                let changed = match last_mtime {
                    None => false,
                    Some(prev) => mtime > prev,
                };
                last_mtime = Some(mtime);
                if changed {
                    match AppConfig::load_from(&path) {
                        Ok(cfg) => {
                            let stale = restart_required(&handle.snapshot(), &cfg);
                            if !stale.is_empty() {
                                warn!(tables = ?stale, "changed tables take effect after a restart");
                            }
                            handle.replace(cfg);
                            info!(path = %path.display(), "config reloaded");
                        }
                        Err(e) => warn!(error = %format!("{e:#}"), "config reload rejected"),
                    }
                }
            }
            thread::sleep(poll);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sources.max_items_per_source, 3);
        assert_eq!(cfg.ranking.cap, 5);
        assert!((cfg.ranking.min_score - 0.3).abs() < 1e-6);
        assert_eq!(cfg.ranking.trending_top_k, 10);
        assert_eq!(cfg.enabled_categories(), Category::ALL.to_vec());
        assert_eq!(cfg.schedule.daily_digest, "0 9 * * *");
    }

    #[test]
    fn categories_table_replaces_seed() {
        let toml = r#"
[categories.security]
priority = 1
keywords = ["cve"]

[categories.tech]
priority = 2
enabled = true

[categories.global]
enabled = false
"#;
        let cfg = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            cfg.enabled_categories(),
            vec![Category::Security, Category::Tech]
        );
        assert!(cfg.category(Category::Ai).is_none());
        assert!(cfg.category(Category::Tech).unwrap().keywords.is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = AppConfig::from_toml_str("[categories.sports]\nkeywords = []\n").unwrap_err();
        assert!(format!("{err:#}").contains("sports"));
    }

    #[test]
    fn bad_cron_is_rejected() {
        let err = AppConfig::from_toml_str("[schedule]\ndaily_digest = \"0 9 1 * *\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("daily_digest"));
        let cfg = AppConfig::from_toml_str("[schedule]\nweekly_digest = \"30 7 * * 1\"\n").unwrap();
        assert_eq!(cfg.schedule.weekly_digest.as_deref(), Some("30 7 * * 1"));
    }

    #[test]
    fn ai_and_schedule_changes_need_restart() {
        let old = AppConfig::default();
        let mut new = AppConfig::default();
        new.ranking.cap = 2;
        new.categories.clear();
        assert!(restart_required(&old, &new).is_empty());

        new.ai.model = "gemini-2.0-flash".into();
        new.schedule.daily_digest = "30 8 * * *".into();
        assert_eq!(restart_required(&old, &new), vec!["ai", "schedule"]);
    }

    #[test]
    fn snapshot_survives_replace() {
        let handle = ConfigHandle::new(AppConfig::default());
        let before = handle.snapshot();
        let mut next = AppConfig::default();
        next.ranking.cap = 2;
        handle.replace(next);
        assert_eq!(before.ranking.cap, 5);
        assert_eq!(handle.snapshot().ranking.cap, 2);
    }
}
