// src/summarize/mod.rs
//! Model-written sections of the digest. Every method returns text; a missing model
//! answer turns into the fixed fallback for that section.

pub mod ai_adapter;
pub mod prompts;

use chrono::{DateTime, Datelike, Local};
use tracing::{debug, info};

use crate::category::Category;
use crate::config::DeveloperProfile;
use crate::ingest::types::FeedItem;
use crate::trending::TrendingTopic;

pub use ai_adapter::{
    build_client_from_config, AiClient, CachingClient, DisabledClient, DynAiClient,
    GeminiProvider, MockProvider, Provider, Uncached,
};

#[derive(Clone)]
pub struct Summarizer {
    client: DynAiClient,
}

impl Summarizer {
    pub fn new(client: DynAiClient) -> Self {
        Self { client }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    async fn ask(&self, what: &str, prompt: &str) -> Option<String> {
        let out = self.client.generate(prompt).await;
        match &out {
            Some(text) => debug!(target: "summarize", section = what, chars = text.len(), "model answered"),
            None => info!(
                target: "summarize",
                section = what,
                provider = self.client.provider_name(),
                "no model answer, using fallback"
            ),
        }
        out
    }

    /// Empty categories never reach the model.
    pub async fn category_summary(&self, category: Category, articles: &[&FeedItem]) -> String {
        if articles.is_empty() {
            return prompts::quiet_day(category).to_string();
        }
        let prompt = prompts::category_prompt(category, &prompts::articles_block(articles));
        self.ask(category.id(), &prompt)
            .await
            .unwrap_or_else(|| prompts::quiet_day(category).to_string())
    }

    pub async fn developer_advice(&self, dev: &DeveloperProfile, now: DateTime<Local>) -> String {
        // "Mon Jun 09 2025"
        let date = now.format("%a %b %d %Y").to_string();
        self.ask("advice", &prompts::advice_prompt(dev, &date))
            .await
            .unwrap_or_else(|| prompts::DEFAULT_ADVICE.to_string())
    }

    pub async fn future_insights(&self, dev: &DeveloperProfile, now: DateTime<Local>) -> String {
        self.ask("future", &prompts::future_prompt(dev, now.year()))
            .await
            .unwrap_or_else(|| prompts::DEFAULT_FUTURE.to_string())
    }

    pub async fn trending_analysis(&self, topics: &[TrendingTopic]) -> String {
        if topics.is_empty() {
            return prompts::NO_TRENDING.to_string();
        }
        let text = prompts::topics_text(topics);
        self.ask("trending", &prompts::trending_prompt(&text))
            .await
            .unwrap_or_else(|| prompts::trending_unavailable(&text))
    }

    /// `categories` are the non-empty ones.
    pub async fn recommendations(
        &self,
        dev: &DeveloperProfile,
        total_articles: usize,
        categories: &[Category],
    ) -> String {
        let prompt = prompts::recommendations_prompt(dev, total_articles, categories);
        self.ask("recommendations", &prompt)
            .await
            .unwrap_or_else(|| prompts::DEFAULT_RECOMMENDATIONS.to_string())
    }
}
