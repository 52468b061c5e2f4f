// src/trending.rs
//! Trending topics: global word frequency over one run's items.
//!
//! Tokens are maximal runs of ASCII word characters (`[a-z0-9_]`) at least four
//! characters long, so three-letter acronyms (API, SQL, AWS) never trend.
//! Ties on count keep first-seen order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::ingest::types::FeedItem;

pub const DEFAULT_TOP_K: usize = 10;
pub const MIN_TOKEN_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub mentions: u32,
}

/// Common words excluded from counting. Entries shorter than `MIN_TOKEN_LEN`
/// are unreachable through the tokenizer but kept so the list stays the single
/// source of truth if the floor ever changes.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "who", "boy", "did", "man", "way", "too", "any", "few", "use", "own", "say",
    "she", "each", "which", "their", "time", "will", "about", "would", "there", "could", "other",
    "after", "first", "well", "water", "been", "call", "come", "find", "long", "down", "made",
    "part",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

static RE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9A-Za-z_]+").expect("word regex"));

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word.to_lowercase().as_str())
}

/// Lowercased candidate tokens of one text, in order of appearance.
pub fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_WORD
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.len() >= MIN_TOKEN_LEN && !STOP_SET.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Count tokens across every item (title + description) and return the `top_k` most
/// frequent, descending by count.
pub fn extract_trending<'a, I>(items: I, top_k: usize) -> Vec<TrendingTopic>
where
    I: IntoIterator<Item = &'a FeedItem>,
{
    // token -> (count, first-seen position)
    let mut counts: HashMap<String, (u32, usize)> = HashMap::new();
    let mut seen = 0usize;

    for item in items {
        let text = format!("{} {}", item.title, item.description);
        for tok in tokens(&text) {
            let entry = counts.entry(tok).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        }
    }

    let mut ranked: Vec<(String, u32, usize)> = counts
        .into_iter()
        .map(|(topic, (count, first))| (topic, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(top_k);

    ranked
        .into_iter()
        .map(|(topic, mentions, _)| TrendingTopic { topic, mentions })
        .collect()
}
