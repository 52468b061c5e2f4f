//! Verify SMTP settings from `.env` and send a small sample digest.
//!
//!   cargo run --bin email-check

use anyhow::{bail, Context, Result};
use chrono::Local;

use tech_news_digest::{
    category::Category,
    digest::{Digest, DigestKind, DigestSection, SectionKind},
    init_tracing,
    ingest::types::FeedItem,
    notify::{EmailSender, Notifier},
    rank::ScoredItem,
    relevance::Relevance,
    render::{self, RenderOptions},
    trending::TrendingTopic,
};

fn sample_digest() -> Digest {
    let item = FeedItem {
        title: "Email delivery check".to_string(),
        description: "If you can read this, SMTP works.".to_string(),
        link: "https://example.com/".to_string(),
        pub_date: None,
        category: Category::Tech,
        source: "Tech News Bot".to_string(),
    };
    Digest {
        generated_at: Local::now(),
        kind: DigestKind::Daily,
        sections: vec![
            DigestSection {
                kind: SectionKind::Tech,
                summary: "**Test email**: your digest configuration is working.".to_string(),
                items: vec![ScoredItem {
                    item,
                    relevance: Relevance::default(),
                }],
                count: 1,
            },
            DigestSection {
                kind: SectionKind::Advice,
                summary: "• Keep your App Password out of version control".to_string(),
                items: Vec::new(),
                count: 0,
            },
        ],
        trending: vec![TrendingTopic {
            topic: "email".to_string(),
            mentions: 1,
        }],
        total_articles: 1,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let Some(sender) = EmailSender::from_env().context("email settings")? else {
        bail!("email not configured: set EMAIL_USER, EMAIL_APP_PASSWORD and RECIPIENT_EMAIL");
    };

    if !sender.verify().await? {
        bail!("SMTP server refused the connection test");
    }
    println!("✅ Email server connection verified");

    let digest = sample_digest();
    let opts = RenderOptions::default();
    sender
        .send_digest(
            &render::subject(&digest),
            &render::render_text(&digest, &opts),
            &render::render_html(&digest, &opts),
        )
        .await?;
    println!("📧 Test digest sent, check your inbox");
    Ok(())
}
