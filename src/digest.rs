// src/digest.rs
//! One digest run: fetch → score/rank per category → trending → model sections.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::category::Category;
use crate::config::ConfigHandle;
use crate::ingest::{self, providers, CategorySources};
use crate::rank::{self, ScoredItem};
use crate::summarize::Summarizer;
use crate::trending::{self, TrendingTopic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    Daily,
    Weekly,
}

impl DigestKind {
    pub fn label(self) -> &'static str {
        match self {
            DigestKind::Daily => "Daily",
            DigestKind::Weekly => "Weekly",
        }
    }
}

/// Display order of a digest: the five categories, then the insight sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Tech,
    Security,
    Ai,
    Frameworks,
    Global,
    Trending,
    Advice,
    Future,
    Recommendations,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 9] = [
        SectionKind::Tech,
        SectionKind::Security,
        SectionKind::Ai,
        SectionKind::Frameworks,
        SectionKind::Global,
        SectionKind::Trending,
        SectionKind::Advice,
        SectionKind::Future,
        SectionKind::Recommendations,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SectionKind::Tech => "tech",
            SectionKind::Security => "security",
            SectionKind::Ai => "ai",
            SectionKind::Frameworks => "frameworks",
            SectionKind::Global => "global",
            SectionKind::Trending => "trending",
            SectionKind::Advice => "advice",
            SectionKind::Future => "future",
            SectionKind::Recommendations => "recommendations",
        }
    }

    pub fn icon(self) -> &'static str {
        match self.category() {
            Some(c) => c.icon(),
            None => match self {
                SectionKind::Trending => "📈",
                SectionKind::Advice => "💡",
                SectionKind::Future => "🔮",
                _ => "🎯",
            },
        }
    }

    /// Mixed-case heading; renderers upper-case it where they shout.
    pub fn title(self) -> &'static str {
        match self.category() {
            Some(c) => c.title(),
            None => match self {
                SectionKind::Trending => "Trending Topics",
                SectionKind::Advice => "Developer Advice",
                SectionKind::Future => "Future Insights",
                _ => "Personalized Recommendations",
            },
        }
    }

    pub fn category(self) -> Option<Category> {
        match self {
            SectionKind::Tech => Some(Category::Tech),
            SectionKind::Security => Some(Category::Security),
            SectionKind::Ai => Some(Category::Ai),
            SectionKind::Frameworks => Some(Category::Frameworks),
            SectionKind::Global => Some(Category::Global),
            _ => None,
        }
    }
}

impl From<Category> for SectionKind {
    fn from(c: Category) -> Self {
        match c {
            Category::Tech => SectionKind::Tech,
            Category::Security => SectionKind::Security,
            Category::Ai => SectionKind::Ai,
            Category::Frameworks => SectionKind::Frameworks,
            Category::Global => SectionKind::Global,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DigestSection {
    pub kind: SectionKind,
    pub summary: String,
    pub items: Vec<ScoredItem>,
    /// Items analyzed (categories) or topics found (trending); 0 for the rest.
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub generated_at: DateTime<Local>,
    pub kind: DigestKind,
    pub sections: Vec<DigestSection>,
    pub trending: Vec<TrendingTopic>,
    pub total_articles: usize,
}

impl Digest {
    pub fn section(&self, kind: SectionKind) -> Option<&DigestSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Where a run gets its feed sources.
#[derive(Clone)]
pub enum SourcePlan {
    /// Built from the config snapshot at every run.
    FromConfig,
    /// Fixed sources (tests, demos).
    Fixed(Vec<CategorySources>),
}

#[derive(Clone)]
pub struct DigestPipeline {
    config: ConfigHandle,
    summarizer: Summarizer,
    sources: SourcePlan,
}

impl DigestPipeline {
    pub fn new(config: ConfigHandle, summarizer: Summarizer) -> Self {
        Self {
            config,
            summarizer,
            sources: SourcePlan::FromConfig,
        }
    }

    pub fn with_sources(config: ConfigHandle, summarizer: Summarizer, plan: Vec<CategorySources>) -> Self {
        Self {
            config,
            summarizer,
            sources: SourcePlan::Fixed(plan),
        }
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub async fn run(&self, kind: DigestKind, now: DateTime<Local>) -> Result<Digest> {
        let t0 = Instant::now();
        let cfg = self.config.snapshot();
        let now_utc = now.with_timezone(&Utc);

        let plan = match &self.sources {
            SourcePlan::FromConfig => {
                let client = providers::build_client(&cfg.sources)?;
                providers::plan_from_config(&cfg, &client)
            }
            SourcePlan::Fixed(plan) => plan.clone(),
        };

        info!(target: "digest", kind = kind.label(), "fetching latest news");
        let fetched = ingest::fetch_all(plan, cfg.sources.max_items_per_source).await;

        let ranked: Vec<(Category, Vec<ScoredItem>)> = fetched
            .into_iter()
            .map(|(c, items)| (c, rank::score_and_rank(items, &cfg, now_utc)))
            .collect();

        let trending = trending::extract_trending(
            ranked.iter().flat_map(|(_, items)| items.iter().map(|s| &s.item)),
            cfg.ranking.trending_top_k,
        );

        info!(target: "digest", provider = self.summarizer.provider_name(), "summarizing");
        let mut sections = Vec::new();
        let mut non_empty = Vec::new();
        let mut total_articles = 0usize;
        for (category, items) in ranked {
            if items.is_empty() {
                continue;
            }
            info!(target: "digest", %category, items = items.len(), "analyzing category");
            let refs: Vec<_> = items.iter().map(|s| &s.item).collect();
            let summary = self.summarizer.category_summary(category, &refs).await;
            total_articles += items.len();
            non_empty.push(category);
            sections.push(DigestSection {
                kind: category.into(),
                summary,
                count: items.len(),
                items,
            });
        }

        let dev = &cfg.developer;
        let advice = self.summarizer.developer_advice(dev, now).await;
        let future = self.summarizer.future_insights(dev, now).await;
        let trend_summary = self.summarizer.trending_analysis(&trending).await;
        let recs = self
            .summarizer
            .recommendations(dev, total_articles, &non_empty)
            .await;

        for (kind, summary, count) in [
            (SectionKind::Trending, trend_summary, trending.len()),
            (SectionKind::Advice, advice, 0),
            (SectionKind::Future, future, 0),
            (SectionKind::Recommendations, recs, 0),
        ] {
            sections.push(DigestSection {
                kind,
                summary,
                items: Vec::new(),
                count,
            });
        }
        // Categories arrive in configured priority; display order is fixed.
        sections.sort_by_key(|s| s.kind);

        counter!("digest_runs_total").increment(1);
        gauge!("digest_last_run_ts").set(now_utc.timestamp() as f64);
        histogram!("digest_run_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        info!(
            target: "digest",
            kind = kind.label(),
            sections = sections.len(),
            articles = total_articles,
            trending = trending.len(),
            "digest ready"
        );

        Ok(Digest {
            generated_at: now,
            kind,
            sections,
            trending,
            total_articles,
        })
    }
}
