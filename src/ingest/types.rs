// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::category::Category;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    /// Empty when the feed had no description.
    pub description: String,
    pub link: String,
    /// Raw publication date as found in the feed (may be malformed).
    pub pub_date: Option<String>,
    pub category: Category,
    pub source: String,
}

impl FeedItem {
    /// Publication time as unix seconds, if the raw date parses.
    pub fn published_at(&self) -> Option<i64> {
        self.pub_date.as_deref().and_then(parse_pub_date)
    }

    pub fn published_datetime(&self) -> Option<DateTime<Utc>> {
        self.published_at()
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }
}

/// Parse the date formats feeds actually use: RFC 2822 (RSS), RFC 3339 (Atom),
/// and `YYYY-MM-DD HH:MM:SS` in UTC (rss2json).
pub fn parse_pub_date(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return Some(dt.to_offset(UtcOffset::UTC).unix_timestamp());
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC).unix_timestamp());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|n| n.and_utc().timestamp())
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &str;
}
