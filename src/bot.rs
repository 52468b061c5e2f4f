// src/bot.rs
//! Long-running service: runs digests on schedule, prints them, mails them and keeps
//! the latest one for the status API.

use anyhow::Result;
use chrono::Local;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ScheduleCfg;
use crate::digest::{Digest, DigestKind, DigestPipeline};
use crate::notify::Notifier;
use crate::render::{self, RenderOptions};
use crate::scheduler::{spawn_cron, CronSchedule};

/// Last successful digest, shared with the HTTP layer.
pub type SharedDigest = Arc<RwLock<Option<Digest>>>;

/// Exclusive claim on the bot's single run slot.
pub struct RunGuard(#[allow(dead_code)] OwnedMutexGuard<()>);

pub struct NewsBot {
    pipeline: DigestPipeline,
    notifier: Option<Arc<dyn Notifier>>,
    latest: SharedDigest,
    // One run at a time; a scheduled trigger waits, an HTTP trigger is refused.
    run_lock: Arc<Mutex<()>>,
    print_console: bool,
}

impl NewsBot {
    pub fn new(pipeline: DigestPipeline, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            pipeline,
            notifier,
            latest: Arc::new(RwLock::new(None)),
            run_lock: Arc::new(Mutex::new(())),
            print_console: true,
        }
    }

    /// Skip stdout output (tests, API-only use).
    pub fn quiet(mut self) -> Self {
        self.print_console = false;
        self
    }

    pub fn latest(&self) -> SharedDigest {
        self.latest.clone()
    }

    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Claim the run slot without waiting. The guard is held until the run it is
    /// passed to finishes.
    pub fn try_claim_run(&self) -> Option<RunGuard> {
        self.run_lock.clone().try_lock_owned().ok().map(RunGuard)
    }

    /// Verify the mail transport once; never fails the caller.
    pub async fn test_email_setup(&self) -> bool {
        let Some(n) = &self.notifier else {
            warn!(target: "notify", "email configuration needs attention, check .env");
            return false;
        };
        match n.verify().await {
            Ok(true) => {
                info!(target: "notify", channel = n.name(), "email is configured and ready");
                true
            }
            Ok(false) => {
                warn!(target: "notify", channel = n.name(), "email server refused the connection test");
                false
            }
            Err(e) => {
                warn!(target: "notify", channel = n.name(), error = %format!("{e:#}"), "email configuration test failed");
                false
            }
        }
    }

    /// One full run. A failed run prints the fallback text and returns `None`;
    /// a failed delivery is logged and the digest still counts.
    pub async fn run_digest(&self, kind: DigestKind) -> Option<Digest> {
        let guard = RunGuard(self.run_lock.clone().lock_owned().await);
        self.run_digest_with(guard, kind).await
    }

    /// Same as [`run_digest`](Self::run_digest) with the slot already claimed.
    pub async fn run_digest_with(&self, _guard: RunGuard, kind: DigestKind) -> Option<Digest> {
        let now = Local::now();
        info!(target: "digest", kind = kind.label(), "generating digest");

        let digest = match self.pipeline.run(kind, now).await {
            Ok(d) => d,
            Err(e) => {
                error!(target: "digest", error = %format!("{e:#}"), "digest run failed");
                if self.print_console {
                    println!("{}", render::render_fallback(&now));
                }
                return None;
            }
        };

        let opts = RenderOptions::from(&self.pipeline.config().snapshot().output);
        if self.print_console {
            println!("{}", render::render_console(&digest, &opts));
        }

        if let Ok(mut g) = self.latest.write() {
            *g = Some(digest.clone());
        }

        self.deliver(&digest, &opts).await;
        Some(digest)
    }

    async fn deliver(&self, digest: &Digest, opts: &RenderOptions) {
        let Some(n) = &self.notifier else {
            info!(target: "notify", "email delivery skipped, not configured");
            return;
        };
        let subject = render::subject(digest);
        let text = render::render_text(digest, opts);
        let html = render::render_html(digest, opts);
        match n.send_digest(&subject, &text, &html).await {
            Ok(()) => info!(target: "notify", channel = n.name(), %subject, "digest delivered"),
            Err(e) => warn!(target: "notify", channel = n.name(), error = %format!("{e:#}"), "digest delivery failed"),
        }
    }

    /// Email check, optional startup run, then the cron jobs. Invalid cron expressions
    /// are returned as errors before anything is spawned.
    pub fn start(self: &Arc<Self>, schedule: &ScheduleCfg) -> Result<Vec<JoinHandle<()>>> {
        let daily = CronSchedule::parse(&schedule.daily_digest)?;
        let weekly = schedule
            .weekly_digest
            .as_deref()
            .map(CronSchedule::parse)
            .transpose()?;

        let mut handles = Vec::new();
        info!(target: "digest", daily = %daily, weekly = ?weekly.map(|w| w.to_string()), "scheduler started");

        let bot = self.clone();
        handles.push(tokio::spawn(async move {
            bot.test_email_setup().await;
        }));

        if schedule.run_on_startup {
            let bot = self.clone();
            handles.push(tokio::spawn(async move {
                bot.run_digest(DigestKind::Daily).await;
            }));
        }

        let bot = self.clone();
        handles.push(spawn_cron("daily_digest", daily, move || {
            let bot = bot.clone();
            async move {
                bot.run_digest(DigestKind::Daily).await;
            }
        }));

        if let Some(weekly) = weekly {
            let bot = self.clone();
            handles.push(spawn_cron("weekly_digest", weekly, move || {
                let bot = bot.clone();
                async move {
                    bot.run_digest(DigestKind::Weekly).await;
                }
            }));
        }

        Ok(handles)
    }
}
