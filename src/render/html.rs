// src/render/html.rs
use html_escape::{encode_double_quoted_attribute, encode_text};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{display_date, key_sources, RenderOptions, HTML_TRENDING_TOP};
use crate::digest::Digest;
use crate::ingest::providers::UNKNOWN_SOURCE;

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"));
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("italic regex"));

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; }
        .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; text-align: center; margin-bottom: 30px; }
        .header h1 { margin: 0; font-size: 2.5em; }
        .header p { margin: 10px 0 0 0; opacity: 0.9; }
        .section { background: white; margin: 20px 0; padding: 25px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .section-title { color: #4a5568; border-bottom: 2px solid #e2e8f0; padding-bottom: 10px; margin-bottom: 20px; font-size: 1.4em; font-weight: bold; }
        .trending-topics { background: #f7fafc; padding: 15px; border-radius: 8px; margin-bottom: 20px; }
        .trending-item { display: inline-block; background: #4299e1; color: white; padding: 5px 12px; margin: 3px; border-radius: 20px; font-size: 0.9em; }
        .news-summary { font-size: 1.1em; line-height: 1.7; margin-bottom: 20px; }
        .sources { background: #f8f9fa; padding: 15px; border-left: 4px solid #4299e1; margin-top: 15px; }
        .source-item { margin: 10px 0; padding: 10px; background: white; border-radius: 5px; }
        .source-title { font-weight: bold; color: #2d3748; margin-bottom: 5px; }
        .source-link { color: #4299e1; text-decoration: none; font-size: 0.9em; }
        .source-name { color: #718096; font-size: 0.8em; font-style: italic; }
        .footer { background: #2d3748; color: white; padding: 20px; border-radius: 10px; text-align: center; margin-top: 30px; }
        .stats { background: #edf2f7; padding: 10px; border-radius: 5px; font-size: 0.9em; color: #4a5568; margin-bottom: 15px; }
"#;

/// Escape, then `**bold**` → `<strong>`, `*italic*` → `<em>`, newlines → `<br>`.
pub fn format_summary(text: &str) -> String {
    let escaped = encode_text(text);
    let bold = RE_BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = RE_ITALIC.replace_all(&bold, "<em>$1</em>");
    italic.replace('\n', "<br>")
}

pub fn render_html(digest: &Digest, opts: &RenderOptions) -> String {
    let kind = digest.kind.label();
    let date = display_date(&digest.generated_at);
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{kind} Tech News Digest</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="header">
        <h1>📰 {kind} Tech News Digest</h1>
        <p>🎯 Tailored for Backend Developers • {date}</p>
    </div>
"#
    );

    if !digest.trending.is_empty() {
        html.push_str(
            "    <div class=\"section\">\n        <div class=\"section-title\">📈 Trending Topics</div>\n        <div class=\"trending-topics\">\n",
        );
        for t in digest.trending.iter().take(HTML_TRENDING_TOP) {
            html.push_str(&format!(
                "            <span class=\"trending-item\">{} ({})</span>\n",
                encode_text(&t.topic),
                t.mentions
            ));
        }
        html.push_str("        </div>\n    </div>\n");
    }

    for section in digest.sections.iter().filter(|s| !s.summary.is_empty()) {
        html.push_str(&format!(
            "    <div class=\"section\">\n        <div class=\"section-title\">{} {}</div>\n",
            section.kind.icon(),
            encode_text(section.kind.title())
        ));
        if section.count > 0 {
            html.push_str(&format!(
                "        <div class=\"stats\">📊 {} items analyzed</div>\n",
                section.count
            ));
        }
        html.push_str(&format!(
            "        <div class=\"news-summary\">{}</div>\n",
            format_summary(&section.summary)
        ));

        let sources = key_sources(section, opts);
        if !sources.is_empty() {
            html.push_str("        <div class=\"sources\">\n            <strong>📎 Key Sources:</strong>\n");
            for (i, s) in sources.iter().enumerate() {
                html.push_str(&format!(
                    "            <div class=\"source-item\">\n                <div class=\"source-title\">{}. {}</div>\n",
                    i + 1,
                    encode_text(&s.item.title)
                ));
                if opts.include_sources {
                    let name = if s.item.source.is_empty() {
                        UNKNOWN_SOURCE
                    } else {
                        s.item.source.as_str()
                    };
                    html.push_str(&format!(
                        "                <div class=\"source-name\">📰 {}</div>\n",
                        encode_text(name)
                    ));
                }
                html.push_str(&format!(
                    "                <a href=\"{}\" class=\"source-link\">🔗 Read Article</a>\n            </div>\n",
                    encode_double_quoted_attribute(&s.item.link)
                ));
            }
            html.push_str("        </div>\n");
        }
        html.push_str("    </div>\n");
    }

    html.push_str(&format!(
        r#"    <div class="footer">
        <p>✨ Digest complete! Analyzed {} articles from multiple sources</p>
        <p>🚀 Built with Google Gemini AI</p>
        <p>🤖 Tech News Bot - Keeping developers informed</p>
    </div>
</body>
</html>"#,
        digest.total_articles
    ));
    html
}
