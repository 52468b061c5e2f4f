use chrono::{Local, TimeZone};

use tech_news_digest::digest::{Digest, DigestKind, DigestSection, SectionKind};
use tech_news_digest::rank::ScoredItem;
use tech_news_digest::relevance::Relevance;
use tech_news_digest::render::{
    render_console, render_fallback, render_html, render_text, subject, RenderOptions,
};
use tech_news_digest::trending::TrendingTopic;
use tech_news_digest::{Category, FeedItem};

fn scored(title: &str, source: &str, link: &str) -> ScoredItem {
    ScoredItem {
        item: FeedItem {
            title: title.into(),
            description: String::new(),
            link: link.into(),
            pub_date: None,
            category: Category::Security,
            source: source.into(),
        },
        relevance: Relevance {
            score: 0.8,
            ..Relevance::default()
        },
    }
}

fn sample() -> Digest {
    let items = vec![
        scored("<script>alert(1)</script> & friends", "Sec \"Wire\"", "https://s.example/a?x=1&y=2"),
        scored("Second", "", "https://s.example/b"),
        scored("Third", "Wire", "https://s.example/c"),
        scored("Fourth", "Wire", "https://s.example/d"),
    ];
    let trending = (0..10)
        .map(|i| TrendingTopic {
            topic: format!("topic{i}"),
            mentions: 10 - i,
        })
        .collect::<Vec<_>>();
    Digest {
        generated_at: Local.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).single().unwrap(),
        kind: DigestKind::Daily,
        sections: vec![
            DigestSection {
                kind: SectionKind::Security,
                summary: "**Patch** today.\n*Rotate* keys.".into(),
                count: items.len(),
                items,
            },
            DigestSection {
                kind: SectionKind::Trending,
                summary: "Everyone talks about topic0.".into(),
                items: vec![],
                count: 10,
            },
            DigestSection {
                kind: SectionKind::Advice,
                summary: "• Sleep".into(),
                items: vec![],
                count: 0,
            },
        ],
        trending,
        total_articles: 4,
    }
}

#[test]
fn subject_names_kind_and_date() {
    let mut d = sample();
    assert_eq!(subject(&d), "Daily Tech News Digest - Tue Jun 10 2025");
    d.kind = DigestKind::Weekly;
    assert_eq!(subject(&d), "Weekly Tech News Digest - Tue Jun 10 2025");
}

#[test]
fn text_lists_top_five_trending_and_three_sources() {
    let out = render_text(&sample(), &RenderOptions::default());
    assert!(out.starts_with("📰 DAILY TECH NEWS DIGEST - Tue Jun 10 2025\n"));
    assert!(out.contains("1. topic0 (10 mentions)"));
    assert!(out.contains("5. topic4 (6 mentions)"));
    assert!(!out.contains("topic5 ("));
    assert!(out.contains("🔒 SECURITY UPDATES\n📊 4 items analyzed\n"));
    assert!(out.contains("  3. Third\n"));
    assert!(!out.contains("Fourth"));
    assert!(out.contains("📈 TRENDING TOPICS\n📊 10 items analyzed"));
    // Empty source names are not printed.
    assert!(out.contains("  2. Second\n     🔗 https://s.example/b"));
    assert!(out.contains("Analyzed 4 articles"));
}

#[test]
fn links_can_be_switched_off() {
    let opts = RenderOptions {
        include_links: false,
        ..RenderOptions::default()
    };
    let out = render_console(&sample(), &opts);
    assert!(!out.contains("Key Sources"));
    assert!(!out.contains("https://s.example/a"));
    assert!(out.contains(&"=".repeat(90)));
}

#[test]
fn html_escapes_and_formats() {
    let out = render_html(&sample(), &RenderOptions::default());
    assert!(out.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; friends"));
    assert!(!out.contains("<script>"));
    assert!(out.contains("Sec &quot;Wire&quot;") || out.contains("Sec \"Wire\""));
    assert!(out.contains("href=\"https://s.example/a?x=1&amp;y=2\""));
    assert!(out.contains("<strong>Patch</strong> today.<br><em>Rotate</em> keys."));
    assert!(out.contains("📰 Unknown Source"));
    assert_eq!(out.matches("class=\"trending-item\"").count(), 8);
    assert!(out.contains("topic7 (3)"));
    assert!(!out.contains("topic8"));
    assert!(out.trim_end().ends_with("</html>"));
}

#[test]
fn fallback_mentions_unavailable_service() {
    let now = Local.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).single().unwrap();
    let out = render_fallback(&now);
    assert!(out.contains("Service Temporarily Unavailable"));
    assert!(out.contains("Tue Jun 10 2025"));
    assert!(out.contains("• Container orchestration and microservices"));
}
