//! Tech News Digest service entrypoint.
//! Loads config, wires the pipeline, schedules digests and (optionally) serves the
//! status API.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use tech_news_digest::{
    api::{create_router, AppState},
    bot::NewsBot,
    config::{config_path, start_hot_reload_thread, AppConfig, ConfigHandle},
    digest::{DigestKind, DigestPipeline},
    init_tracing,
    metrics::Metrics,
    notify::{EmailSender, Notifier},
    summarize::{build_client_from_config, Summarizer},
};

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().is_some_and(|v| v == "1")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();
    info!("starting tech news digest");

    let cfg = AppConfig::load_default().context("loading configuration")?;
    let schedule = cfg.schedule.clone();
    let summarizer = Summarizer::new(build_client_from_config(&cfg.ai));
    let handle = ConfigHandle::new(cfg);
    start_hot_reload_thread(handle.clone(), config_path());

    let notifier: Option<Arc<dyn Notifier>> = match EmailSender::from_env() {
        Ok(Some(sender)) => Some(Arc::new(sender)),
        Ok(None) => None,
        Err(e) => {
            warn!(target: "notify", error = %format!("{e:#}"), "email disabled: invalid settings");
            None
        }
    };

    let pipeline = DigestPipeline::new(handle, summarizer);
    let bot = Arc::new(NewsBot::new(pipeline, notifier));

    if env_flag("DIGEST_RUN_ONCE") {
        bot.test_email_setup().await;
        return match bot.run_digest(DigestKind::Daily).await {
            Some(_) => Ok(()),
            None => anyhow::bail!("digest run failed"),
        };
    }

    let _jobs = bot.start(&schedule).context("invalid schedule")?;

    match std::env::var("STATUS_ADDR") {
        Ok(addr) => {
            let metrics = match Metrics::init() {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "metrics disabled");
                    None
                }
            };
            let router = create_router(AppState { bot }, metrics.as_ref());
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding STATUS_ADDR {addr}"))?;
            info!(%addr, "status API listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("status API")?;
        }
        Err(_) => shutdown_signal().await,
    }

    info!("shutting down news bot");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
}
