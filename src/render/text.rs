// src/render/text.rs
use super::{display_date, key_sources, rule, RenderOptions, LIST_RULE, SECTION_RULE, TEXT_TRENDING_TOP};
use crate::digest::Digest;

/// Plain-text mail body.
pub fn render_text(digest: &Digest, opts: &RenderOptions) -> String {
    layout(digest, opts, super::HEAVY_RULE)
}

/// Shared by the mail body and the console (which only differs in rule width).
pub(crate) fn layout(digest: &Digest, opts: &RenderOptions, width: usize) -> String {
    let heavy = rule('=', width);
    let mut out = String::new();

    out.push_str(&format!(
        "📰 {} TECH NEWS DIGEST - {}\n",
        digest.kind.label().to_uppercase(),
        display_date(&digest.generated_at)
    ));
    out.push_str("🎯 Tailored for Backend Developers\n");
    out.push_str(&heavy);
    out.push_str("\n\n");

    if !digest.trending.is_empty() {
        out.push_str("📈 TRENDING TOPICS\n");
        out.push_str(&rule('-', LIST_RULE));
        out.push('\n');
        for (i, t) in digest.trending.iter().take(TEXT_TRENDING_TOP).enumerate() {
            out.push_str(&format!("{}. {} ({} mentions)\n", i + 1, t.topic, t.mentions));
        }
        out.push('\n');
    }

    for section in digest.sections.iter().filter(|s| !s.summary.is_empty()) {
        out.push_str(&format!(
            "\n{} {}\n",
            section.kind.icon(),
            section.kind.title().to_uppercase()
        ));
        if section.count > 0 {
            out.push_str(&format!("📊 {} items analyzed\n", section.count));
        }
        out.push_str(&rule('-', SECTION_RULE));
        out.push('\n');
        out.push_str(&section.summary);
        out.push('\n');

        let sources = key_sources(section, opts);
        if !sources.is_empty() {
            out.push_str("\n📎 Key Sources:\n");
            for (i, s) in sources.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, s.item.title));
                if opts.include_sources && !s.item.source.is_empty() {
                    out.push_str(&format!("     📰 {}\n", s.item.source));
                }
                out.push_str(&format!("     🔗 {}\n", s.item.link));
            }
        }
        out.push('\n');
    }

    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!(
        "✨ Digest complete! Analyzed {} articles from multiple sources\n",
        digest.total_articles
    ));
    out.push_str("🚀 Built with Google Gemini AI\n");
    out.push_str(&heavy);
    out
}
