// src/relevance.rs
//! Relevance scoring for feed items: keyword overlap, developer focus areas,
//! preferred languages and recency, summed and clamped into ⟨0..1⟩.
//!
//! Matching is case-insensitive, unanchored substring containment, so a keyword
//! embedded in a longer word still counts ("api" hits "rapid").

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{AppConfig, CategoryProfile, DeveloperProfile};
use crate::ingest::types::FeedItem;

pub const KEYWORD_WEIGHT: f32 = 0.3;
pub const FOCUS_AREA_WEIGHT: f32 = 0.2;
pub const LANGUAGE_WEIGHT: f32 = 0.15;
/// Published less than one day ago.
pub const FRESH_BOOST: f32 = 0.2;
/// Published one to three days ago.
pub const RECENT_BOOST: f32 = 0.1;
/// Score for items whose category has no profile at all.
pub const UNPROFILED_SCORE: f32 = 0.5;

const SECS_PER_DAY: f64 = 86_400.0;

/// Result of relevance evaluation
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Relevance {
    pub score: f32,
    /// e.g. "keyword:api", "area:microservices", "lang:go"
    pub matched: Vec<String>,
    /// e.g. "fresh<1d", "undated", "no_profile"
    pub reasons: Vec<String>,
}

// Dev logging gate: DIGEST_DEV_LOG=1 in debug builds only.
pub(crate) fn dev_logging_enabled() -> bool {
    cfg!(debug_assertions) && std::env::var("DIGEST_DEV_LOG").ok().as_deref() == Some("1")
}

/// Short stable id for an item, so logs can correlate without dumping titles.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_relevance(item: &FeedItem, rel: &Relevance) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&item.link);
    debug!(
        target: "relevance",
        %id,
        category = %item.category,
        score = rel.score,
        matched = ?rel.matched,
        reasons = ?rel.reasons
    );
}

/// Age bucket contribution. Missing timestamps are "not recent"; future timestamps
/// have negative age and count as fresh.
pub fn recency_boost(published_at: Option<i64>, now: DateTime<Utc>) -> (f32, &'static str) {
    let Some(ts) = published_at else {
        return (0.0, "undated");
    };
    let age_days = (now.timestamp() - ts) as f64 / SECS_PER_DAY;
    if age_days < 1.0 {
        (FRESH_BOOST, "fresh<1d")
    } else if age_days < 3.0 {
        (RECENT_BOOST, "recent<3d")
    } else {
        (0.0, "stale>=3d")
    }
}

fn add_matches(
    haystack: &str,
    needles: &[String],
    weight: f32,
    label: &str,
    total: &mut f32,
    matched: &mut Vec<String>,
) {
    for needle in needles {
        let n = needle.trim().to_lowercase();
        if n.is_empty() {
            continue;
        }
        if haystack.contains(&n) {
            *total += weight;
            matched.push(format!("{label}:{n}"));
        }
    }
}

/// Score one item against its category profile and the global developer profile.
/// Never fails; missing data only lowers the score.
pub fn score(
    item: &FeedItem,
    profile: &CategoryProfile,
    developer: &DeveloperProfile,
    now: DateTime<Utc>,
) -> Relevance {
    let haystack = format!("{} {}", item.title, item.description).to_lowercase();

    let mut total = 0.0f32;
    let mut matched = Vec::new();
    add_matches(
        &haystack,
        &profile.keywords,
        KEYWORD_WEIGHT,
        "keyword",
        &mut total,
        &mut matched,
    );
    add_matches(
        &haystack,
        &developer.focus_areas,
        FOCUS_AREA_WEIGHT,
        "area",
        &mut total,
        &mut matched,
    );
    add_matches(
        &haystack,
        &developer.preferred_languages,
        LANGUAGE_WEIGHT,
        "lang",
        &mut total,
        &mut matched,
    );

    let (boost, bucket) = recency_boost(item.published_at(), now);
    total += boost;

    let mut reasons = vec![bucket.to_string()];
    if total > 1.0 {
        reasons.push("capped".to_string());
    }

    let rel = Relevance {
        score: total.min(1.0),
        matched,
        reasons,
    };
    dev_log_relevance(item, &rel);
    rel
}

/// Score using the item's own category from a config snapshot.
/// A category without any profile gets the neutral `UNPROFILED_SCORE`.
pub fn score_with_config(item: &FeedItem, cfg: &AppConfig, now: DateTime<Utc>) -> Relevance {
    match cfg.category(item.category) {
        Some(profile) => score(item, profile, &cfg.developer, now),
        None => Relevance {
            score: UNPROFILED_SCORE,
            matched: Vec::new(),
            reasons: vec!["no_profile".to_string()],
        },
    }
}
