// src/render/console.rs
use chrono::{DateTime, Local};

use super::{display_date, rule, RenderOptions, LIST_RULE};
use crate::digest::Digest;

const CONSOLE_RULE: usize = 90;

pub fn render_console(digest: &Digest, opts: &RenderOptions) -> String {
    format!("\n{}", super::text::layout(digest, opts, CONSOLE_RULE))
}

const FALLBACK_ADVICE: [&str; 6] = [
    "Check GitHub trending repositories for interesting projects",
    "Review your code for potential security vulnerabilities",
    "Update your dependencies and check for breaking changes",
    "Practice system design problems or algorithms",
    "Read documentation for tools you use daily",
    "Engage with the developer community on social platforms",
];

const FALLBACK_TRENDS: [&str; 5] = [
    "Serverless and edge computing adoption",
    "AI/ML integration in backend systems",
    "Advanced database optimization techniques",
    "API security and rate limiting strategies",
    "Container orchestration and microservices",
];

/// Printed when a run fails outright.
pub fn render_fallback(now: &DateTime<Local>) -> String {
    let heavy = rule('=', super::HEAVY_RULE);
    let light = rule('-', LIST_RULE);
    let mut out = String::new();

    out.push('\n');
    out.push_str(&heavy);
    out.push_str(&format!("\n📰 TECH NEWS DIGEST - {}\n", display_date(now)));
    out.push_str("⚠️  Service Temporarily Unavailable\n");
    out.push_str(&heavy);

    out.push_str("\n\n💡 GENERAL TECH ADVICE FOR TODAY\n");
    out.push_str(&light);
    out.push('\n');
    for line in FALLBACK_ADVICE {
        out.push_str(&format!("• {line}\n"));
    }

    out.push_str("\n🔮 TECH TRENDS TO WATCH\n");
    out.push_str(&light);
    out.push('\n');
    for line in FALLBACK_TRENDS {
        out.push_str(&format!("• {line}\n"));
    }

    out.push('\n');
    out.push_str(&heavy);
    out.push_str("\n📧 Please check your internet connection and API configuration\n");
    out.push_str("🔄 Next attempt will be made at the next scheduled run\n");
    out.push_str(&heavy);
    out
}
