// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::category::Category;
use crate::ingest::clean_text;
use crate::ingest::types::{FeedItem, FeedSource};

use super::{http_get_text, Mode, UNKNOWN_SOURCE};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RSS 2.0 feed for one category.
pub struct RssFeedSource {
    name: String,
    category: Category,
    mode: Mode,
}

impl RssFeedSource {
    /// Parse a fixed document instead of fetching (tests, demos).
    pub fn from_fixture(category: Category, xml: &str) -> Self {
        Self {
            name: "fixture".to_string(),
            category,
            mode: Mode::Fixture(xml.to_string()),
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
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let source = rss
            .channel
            .title
            .as_deref()
            .map(clean_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        let out = rss
            .channel
            .item
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
impl FeedSource for RssFeedSource {
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

/// HTML entities that are not legal XML; feeds use them anyway.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
