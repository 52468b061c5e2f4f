// tests/digest_pipeline.rs
//
// End-to-end run over fixture sources with a mock model and a recording notifier.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use std::sync::{Arc, Mutex};

use tech_news_digest::bot::NewsBot;
use tech_news_digest::config::{AppConfig, ConfigHandle};
use tech_news_digest::digest::{DigestKind, DigestPipeline, SectionKind};
use tech_news_digest::ingest::providers::{Rss2JsonSource, RssFeedSource};
use tech_news_digest::ingest::types::FeedSource;
use tech_news_digest::ingest::CategorySources;
use tech_news_digest::notify::Notifier;
use tech_news_digest::summarize::prompts::{quiet_day, DEFAULT_ADVICE};
use tech_news_digest::summarize::{DisabledClient, MockProvider, Summarizer, Uncached};
use tech_news_digest::Category;

const SECURITY_XML: &str = include_str!("fixtures/security_rss.xml");
const FRAMEWORKS_JSON: &str = include_str!("fixtures/frameworks_rss2json.json");

fn plan() -> Vec<CategorySources> {
    let frameworks: Arc<dyn FeedSource> = Arc::new(Rss2JsonSource::from_fixture(
        Category::Frameworks,
        FRAMEWORKS_JSON,
    ));
    let security: Arc<dyn FeedSource> =
        Arc::new(RssFeedSource::from_fixture(Category::Security, SECURITY_XML));
    vec![
        CategorySources {
            category: Category::Frameworks,
            sources: vec![frameworks],
        },
        CategorySources {
            category: Category::Security,
            sources: vec![security],
        },
    ]
}

fn run_time() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).single().unwrap()
}

fn config() -> ConfigHandle {
    // Frameworks listed first by priority; display order must still be security first.
    let cfg = AppConfig::from_toml_str(
        r#"
[categories.frameworks]
priority = 1
keywords = ["angular", "framework", "library"]

[categories.security]
priority = 2
keywords = ["vulnerability", "security", "breach", "patch", "exploit"]
"#,
    )
    .unwrap();
    ConfigHandle::new(cfg)
}

#[tokio::test]
async fn sections_follow_display_order_with_mock_model() {
    let mock = MockProvider::new("Mock summary.");
    let pipeline = DigestPipeline::with_sources(
        config(),
        Summarizer::new(Arc::new(Uncached(mock.clone()))),
        plan(),
    );
    let digest = pipeline.run(DigestKind::Daily, run_time()).await.unwrap();

    let kinds: Vec<_> = digest.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::Security,
            SectionKind::Frameworks,
            SectionKind::Trending,
            SectionKind::Advice,
            SectionKind::Future,
            SectionKind::Recommendations,
        ]
    );

    let sec = digest.section(SectionKind::Security).unwrap();
    assert_eq!(sec.summary, "Mock summary.");
    assert_eq!(sec.count, sec.items.len());
    assert!(sec.items.iter().all(|s| s.score() > 0.3));
    assert!(sec.items.len() <= 5);

    let trending = digest.section(SectionKind::Trending).unwrap();
    assert_eq!(trending.count, digest.trending.len());
    assert!(!digest.trending.is_empty());

    assert_eq!(
        digest.total_articles,
        digest.sections.iter().map(|s| s.items.len()).sum::<usize>()
    );

    // Two categories + four insight prompts.
    assert_eq!(mock.seen().len(), 6);
    assert!(mock.seen()[0].contains("cybersecurity") || mock.seen()[1].contains("cybersecurity"));
}

#[tokio::test]
async fn disabled_model_falls_back_everywhere() {
    let pipeline = DigestPipeline::with_sources(
        config(),
        Summarizer::new(Arc::new(DisabledClient)),
        plan(),
    );
    let digest = pipeline.run(DigestKind::Weekly, run_time()).await.unwrap();
    assert_eq!(digest.kind, DigestKind::Weekly);
    assert_eq!(
        digest.section(SectionKind::Security).unwrap().summary,
        quiet_day(Category::Security)
    );
    assert_eq!(digest.section(SectionKind::Advice).unwrap().summary, DEFAULT_ADVICE);
}

#[tokio::test]
async fn empty_run_still_has_insight_sections() {
    let pipeline = DigestPipeline::with_sources(
        config(),
        Summarizer::new(Arc::new(DisabledClient)),
        vec![],
    );
    let digest = pipeline.run(DigestKind::Daily, run_time()).await.unwrap();
    let kinds: Vec<_> = digest.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SectionKind::Trending,
            SectionKind::Advice,
            SectionKind::Future,
            SectionKind::Recommendations
        ]
    );
    assert_eq!(digest.total_articles, 0);
    assert_eq!(
        digest.section(SectionKind::Trending).unwrap().summary,
        "No trending topics identified from today's news."
    );
}

#[derive(Default)]
struct Recording {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Notifier for Recording {
    async fn send_digest(&self, subject: &str, text: &str, html: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), text.to_string(), html.to_string()));
        Ok(())
    }
    async fn verify(&self) -> Result<bool> {
        Ok(true)
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test]
async fn bot_stores_latest_and_delivers() {
    let notifier = Arc::new(Recording::default());
    let pipeline = DigestPipeline::with_sources(
        config(),
        Summarizer::new(Arc::new(DisabledClient)),
        plan(),
    );
    let bot = NewsBot::new(pipeline, Some(notifier.clone() as Arc<dyn Notifier>)).quiet();

    assert!(bot.latest().read().unwrap().is_none());
    assert!(bot.test_email_setup().await);

    let digest = bot.run_digest(DigestKind::Daily).await.unwrap();
    assert_eq!(
        bot.latest().read().unwrap().as_ref().map(|d| d.total_articles),
        Some(digest.total_articles)
    );

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.starts_with("Daily Tech News Digest - "));
    assert!(sent[0].1.contains("SECURITY UPDATES"));
    assert!(sent[0].2.contains("<!DOCTYPE html>"));
}
