// src/ingest/providers/rss2json.rs
//! Feeds proxied through rss2json.com (`https://api.rss2json.com/v1/api.json?rss_url=...`).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use crate::category::Category;
use crate::ingest::clean_text;
use crate::ingest::types::{FeedItem, FeedSource};

use super::{http_get_text, Mode, UNKNOWN_SOURCE};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    feed: Option<Feed>,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Feed {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub struct Rss2JsonSource {
    name: String,
    category: Category,
    mode: Mode,
}

impl Rss2JsonSource {
    pub fn from_fixture(category: Category, json: &str) -> Self {
        Self {
            name: "fixture".to_string(),
            category,
            mode: Mode::Fixture(json.to_string()),
        }
    }

    pub fn from_url(category: Category, url: &str, client: reqwest::Client) -> Self {
        Self {
            name: url.to_string(),
            category,
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    pub fn parse_items_from_str(category: Category, s: &str) -> Result<Vec<FeedItem>> {
        let t0 = std::time::Instant::now();
        let env: Envelope = serde_json::from_str(s).context("parsing rss2json body")?;

        if let Some(status) = env.status.as_deref() {
            if !status.eq_ignore_ascii_case("ok") {
                bail!(
                    "rss2json status `{status}`: {}",
                    env.message.as_deref().unwrap_or("no message")
                );
            }
        }

        let source = env
            .feed
            .and_then(|f| f.title)
            .map(|t| clean_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        let out = env
            .items
            .into_iter()
            .map(|it| FeedItem {
                title: clean_text(it.title.as_deref().unwrap_or_default()),
                description: clean_text(it.description.as_deref().unwrap_or_default()),
                link: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
                pub_date: it.pub_date.filter(|d| !d.trim().is_empty()),
                category,
                source: source.clone(),
            })
            .collect();

        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for Rss2JsonSource {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(self.category, s),
            Mode::Http { url, client } => {
                let body = http_get_text(client, url).await?;
                Self::parse_items_from_str(self.category, &body)
                    .with_context(|| format!("feed {url}"))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_envelope() {
        let json = r#"{
            "status": "ok",
            "feed": { "title": "Krebs on Security" },
            "items": [
                { "title": "Patch Tuesday", "link": "https://k.example/1",
                  "pubDate": "2025-06-10 17:00:00", "description": "<p>Critical &amp; urgent</p>" },
                { "title": "Old", "link": "https://k.example/2" }
            ]
        }"#;
        let items = Rss2JsonSource::parse_items_from_str(Category::Security, json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "Krebs on Security");
        assert_eq!(items[0].description, "Critical & urgent");
        assert_eq!(items[0].published_at(), Some(1_749_574_800));
        assert_eq!(items[1].category, Category::Security);
    }

    #[test]
    fn error_status_is_an_error() {
        let json = r#"{"status":"error","message":"rss_url parameter is required.","items":[]}"#;
        let err = Rss2JsonSource::parse_items_from_str(Category::Tech, json).unwrap_err();
        assert!(err.to_string().contains("rss_url parameter"));
    }

    #[test]
    fn missing_feed_title_is_unknown_source() {
        let json = r#"{"status":"ok","items":[{"title":"t","link":"l"}]}"#;
        let items = Rss2JsonSource::parse_items_from_str(Category::Tech, json).unwrap();
        assert_eq!(items[0].source, UNKNOWN_SOURCE);
    }
}
