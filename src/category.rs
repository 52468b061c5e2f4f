// src/category.rs
//! Topical buckets used to group feed sources and tailor scoring keywords.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Security,
    Ai,
    Frameworks,
    Global,
}

impl Category {
    /// Display priority order (also the order sections are rendered in).
    pub const ALL: [Category; 5] = [
        Category::Tech,
        Category::Security,
        Category::Ai,
        Category::Frameworks,
        Category::Global,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::Security => "security",
            Category::Ai => "ai",
            Category::Frameworks => "frameworks",
            Category::Global => "global",
        }
    }

    /// Long human name, used in prompts and logs.
    pub fn label(self) -> &'static str {
        match self {
            Category::Tech => "Technology and Programming",
            Category::Security => "Cybersecurity Updates",
            Category::Ai => "Artificial Intelligence",
            Category::Frameworks => "Development Frameworks",
            Category::Global => "Global News",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Tech => "Technology News",
            Category::Security => "Security Updates",
            Category::Ai => "AI & Machine Learning",
            Category::Frameworks => "Framework Updates",
            Category::Global => "Global News Impact",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Tech => "💻",
            Category::Security => "🔒",
            Category::Ai => "🤖",
            Category::Frameworks => "⚛️",
            Category::Global => "🌍",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown category `{s}`"))
    }
}
