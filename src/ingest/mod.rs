// src/ingest/mod.rs
pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::category::Category;
use crate::ingest::types::{FeedItem, FeedSource};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Items kept after cleanup and caps.");
        describe_counter!(
            "ingest_dropped_total",
            "Items dropped for an empty title or a repeated link."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Feed source fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingest last ran.");
    });
}

/// Clean feed text: strip tags, decode entities, fold whitespace, trim.
pub fn clean_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?s)<[^>]*>").expect("tag regex"));
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));

    // Tags first so encoded markup (`&lt;b&gt;`) survives as literal text.
    let out = re_tags.replace_all(s, "");
    let out = html_escape::decode_html_entities(&out);
    let out = re_ws.replace_all(&out, " ");
    out.trim().to_string()
}

/// Cap each source's contribution, drop empty titles and links already seen in this
/// category. Returns (kept, dropped).
pub fn cap_and_dedup(per_source: Vec<Vec<FeedItem>>, max_per_source: usize) -> (Vec<FeedItem>, usize) {
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    for items in per_source {
        for it in items.into_iter().take(max_per_source) {
            if it.title.is_empty() {
                dropped += 1;
                continue;
            }
            if !it.link.is_empty() && !seen_links.insert(it.link.clone()) {
                dropped += 1;
                continue;
            }
            kept.push(it);
        }
    }
    (kept, dropped)
}

/// Sources configured for one category.
#[derive(Clone)]
pub struct CategorySources {
    pub category: Category,
    pub sources: Vec<Arc<dyn FeedSource>>,
}

/// Fetch one category: sources in configured order, a failing source is logged and skipped.
pub async fn fetch_category(
    category: Category,
    sources: &[Arc<dyn FeedSource>],
    max_per_source: usize,
) -> Vec<FeedItem> {
    ensure_metrics_described();

    let mut per_source = Vec::with_capacity(sources.len());
    for src in sources {
        match src.fetch_latest().await {
            Ok(items) => per_source.push(items),
            Err(e) => {
                warn!(
                    target: "ingest",
                    error = %format!("{e:#}"),
                    source = src.name(),
                    %category,
                    "could not fetch source"
                );
                counter!("ingest_source_errors_total").increment(1);
            }
        }
    }

    let (kept, dropped) = cap_and_dedup(per_source, max_per_source);
    counter!("ingest_items_total").increment(kept.len() as u64);
    counter!("ingest_dropped_total").increment(dropped as u64);
    kept
}

/// Fetch every category concurrently. A category whose task fails yields an empty list;
/// output keeps the order of `plan`.
pub async fn fetch_all(
    plan: Vec<CategorySources>,
    max_per_source: usize,
) -> Vec<(Category, Vec<FeedItem>)> {
    ensure_metrics_described();

    let order: Vec<Category> = plan.iter().map(|c| c.category).collect();
    info!(target: "ingest", categories = order.len(), "fetching news");

    let mut set = JoinSet::new();
    for cs in plan {
        set.spawn(async move {
            let items = fetch_category(cs.category, &cs.sources, max_per_source).await;
            (cs.category, items)
        });
    }

    let mut results: HashMap<Category, Vec<FeedItem>> = HashMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((category, items)) => {
                info!(target: "ingest", %category, articles = items.len(), "category fetched");
                results.insert(category, items);
            }
            Err(e) => warn!(target: "ingest", error = %e, "category task failed"),
        }
    }

    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    order
        .into_iter()
        .map(|c| {
            let items = results.remove(&c).unwrap_or_else(|| {
                warn!(target: "ingest", category = %c, "category failed to fetch");
                Vec::new()
            });
            (c, items)
        })
        .collect()
}
