// src/ingest/providers/mod.rs
pub mod rss;
pub mod rss2json;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, FeedFormat, SourcesCfg};
use crate::ingest::types::FeedSource;
use crate::ingest::CategorySources;

pub use rss::RssFeedSource;
pub use rss2json::Rss2JsonSource;

pub const UNKNOWN_SOURCE: &str = "Unknown Source";

pub(crate) enum Mode {
    // Own copy so fixtures don't need 'static.
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// GET a feed body; non-2xx is an error.
pub(crate) async fn http_get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} non-2xx"))?;
    resp.text().await.with_context(|| format!("reading body of {url}"))
}

/// One shared client for all feeds: single request timeout, no retries.
pub fn build_client(cfg: &SourcesCfg) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
        .build()
        .context("building feed http client")
}

/// Build the fetch plan for every enabled category, in priority order.
pub fn plan_from_config(cfg: &AppConfig, client: &reqwest::Client) -> Vec<CategorySources> {
    cfg.enabled_categories()
        .into_iter()
        .map(|category| {
            let feeds = cfg
                .category(category)
                .map(|p| p.feeds.as_slice())
                .unwrap_or_default();
            let sources = feeds
                .iter()
                .map(|f| -> Arc<dyn FeedSource> {
                    match f.format {
                        FeedFormat::Rss => {
                            Arc::new(RssFeedSource::from_url(category, &f.url, client.clone()))
                        }
                        FeedFormat::Rss2json => {
                            Arc::new(Rss2JsonSource::from_url(category, &f.url, client.clone()))
                        }
                    }
                })
                .collect();
            CategorySources { category, sources }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[test]
    fn plan_follows_enabled_categories() {
        let cfg = AppConfig::from_toml_str(
            r#"
[categories.ai]
priority = 1
feeds = [{ url = "https://a.example/rss" }, { url = "https://b.example/json", format = "rss2json" }]

[categories.tech]
priority = 2
enabled = false
feeds = [{ url = "https://t.example/rss" }]
"#,
        )
        .unwrap();
        let client = build_client(&cfg.sources).unwrap();
        let plan = plan_from_config(&cfg, &client);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].category, Category::Ai);
        let names: Vec<_> = plan[0].sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["https://a.example/rss", "https://b.example/json"]);
    }
}
