// src/render/mod.rs
//! Digest → console text, plain-text mail body, HTML mail body.

pub mod console;
pub mod html;
pub mod text;

use chrono::{DateTime, Local};

use crate::digest::{Digest, DigestSection};
use crate::rank::ScoredItem;

pub use console::{render_console, render_fallback};
pub use html::render_html;
pub use text::render_text;

/// Trending entries listed in the text banners.
pub const TEXT_TRENDING_TOP: usize = 5;
/// Trending chips in the HTML header section.
pub const HTML_TRENDING_TOP: usize = 8;

pub(crate) const HEAVY_RULE: usize = 80;
pub(crate) const SECTION_RULE: usize = 60;
pub(crate) const LIST_RULE: usize = 50;

/// Layout switches, taken from `[output]`.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub include_links: bool,
    pub include_sources: bool,
    pub max_key_sources: usize,
}

impl From<&crate::config::OutputCfg> for RenderOptions {
    fn from(o: &crate::config::OutputCfg) -> Self {
        Self {
            include_links: o.include_links,
            include_sources: o.include_sources,
            max_key_sources: o.max_key_sources,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        (&crate::config::OutputCfg::default()).into()
    }
}

/// "Tue Jun 10 2025"
pub fn display_date(t: &DateTime<Local>) -> String {
    t.format("%a %b %d %Y").to_string()
}

/// `Daily Tech News Digest - Tue Jun 10 2025`
pub fn subject(digest: &Digest) -> String {
    format!(
        "{} Tech News Digest - {}",
        digest.kind.label(),
        display_date(&digest.generated_at)
    )
}

/// Items shown under "Key Sources" for a section; empty when links are off.
pub(crate) fn key_sources<'a>(section: &'a DigestSection, opts: &RenderOptions) -> &'a [ScoredItem] {
    if !opts.include_links {
        return &[];
    }
    let n = section.items.len().min(opts.max_key_sources);
    &section.items[..n]
}

pub(crate) fn rule(ch: char, n: usize) -> String {
    std::iter::repeat(ch).take(n).collect()
}
