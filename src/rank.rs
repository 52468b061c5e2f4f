// src/rank.rs
//! Ranking: drop low-relevance items, order the rest by relevance with a crude
//! recency nudge, keep the top N.
//!
//! Sort key = `score + published_epoch_secs / 1e9`. For current dates the nudge is
//! ~1.7, the same for every item of the same era, so relevance dominates while
//! undated items (nudge 0) sink behind dated ones.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::ingest::types::FeedItem;
use crate::relevance::{self, Relevance};

pub const DEFAULT_CAP: usize = 5;
pub const DEFAULT_MIN_SCORE: f32 = 0.3;
const RECENCY_DIVISOR: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoredItem {
    pub item: FeedItem,
    pub relevance: Relevance,
}

impl ScoredItem {
    pub fn score(&self) -> f32 {
        self.relevance.score
    }

    pub fn sort_key(&self) -> f64 {
        let nudge = self
            .item
            .published_at()
            .map(|ts| ts as f64 / RECENCY_DIVISOR)
            .unwrap_or(0.0);
        f64::from(self.score()) + nudge
    }
}

/// Keep items with `score > min_score`, stable-sort by `sort_key` descending, truncate to `cap`.
/// Equal keys keep input (fetch) order.
pub fn rank(items: Vec<ScoredItem>, cap: usize, min_score: f32) -> Vec<ScoredItem> {
    let mut keyed: Vec<(f64, ScoredItem)> = items
        .into_iter()
        .filter(|it| it.score() > min_score)
        .map(|it| (it.sort_key(), it))
        .collect();

    // `sort_by` is stable.
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.truncate(cap);
    keyed.into_iter().map(|(_, it)| it).collect()
}

/// Score every item of one category with the given snapshot, then rank.
pub fn score_and_rank(items: Vec<FeedItem>, cfg: &AppConfig, now: DateTime<Utc>) -> Vec<ScoredItem> {
    let scored = items
        .into_iter()
        .map(|item| {
            let relevance = relevance::score_with_config(&item, cfg, now);
            ScoredItem { item, relevance }
        })
        .collect();
    rank(scored, cfg.ranking.cap, cfg.ranking.min_score)
}
