// src/config/profile.rs
//! Scoring profiles: per-category keywords/feeds and the global developer profile.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Wire format of a feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// Plain RSS 2.0 XML.
    #[default]
    Rss,
    /// The rss2json.com JSON envelope.
    Rss2json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCfg {
    pub url: String,
    #[serde(default)]
    pub format: FeedFormat,
}

impl FeedCfg {
    pub fn rss(url: &str) -> Self {
        Self {
            url: url.to_string(),
            format: FeedFormat::Rss,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Category id → enabled flag, priority, ordered keywords, feed sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub feeds: Vec<FeedCfg>,
}

/// Global developer preferences (not category specific).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperProfile {
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub preferred_languages: Vec<String>,
    /// beginner | intermediate | advanced (prompt context only)
    #[serde(default = "default_experience")]
    pub experience_level: String,
}

fn default_experience() -> String {
    "intermediate".to_string()
}

impl Default for DeveloperProfile {
    fn default() -> Self {
        let areas = [
            "backend development",
            "system design",
            "database optimization",
            "API development",
            "cloud technologies",
            "microservices",
            "DevOps",
            "performance optimization",
        ];
        let langs = ["JavaScript", "Python", "Java", "Go", "TypeScript"];
        Self {
            focus_areas: areas.iter().map(|s| s.to_string()).collect(),
            preferred_languages: langs.iter().map(|s| s.to_string()).collect(),
            experience_level: default_experience(),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in seed for one category, used when the config file has no `[categories]` table.
pub fn default_profile(category: Category) -> CategoryProfile {
    let (priority, keywords, feeds): (i32, &[&str], &[&str]) = match category {
        Category::Tech => (
            1,
            &[
                "programming",
                "software",
                "development",
                "backend",
                "api",
                "database",
            ],
            &[
                "https://feeds.feedburner.com/TechCrunch",
                "https://www.wired.com/feed/rss",
                "https://feeds.arstechnica.com/arstechnica/technology-lab",
                "https://stackoverflow.blog/feed/",
                "https://dev.to/feed",
            ],
        ),
        Category::Security => (
            2,
            &["vulnerability", "security", "breach", "patch", "exploit"],
            &[
                "https://krebsonsecurity.com/feed/",
                "https://feeds.feedburner.com/TheHackersNews",
                "https://feeds.feedburner.com/SecurityWeek",
                "https://blog.malwarebytes.com/feed/",
            ],
        ),
        Category::Ai => (
            3,
            &[
                "artificial intelligence",
                "machine learning",
                "ai",
                "ml",
                "neural network",
            ],
            &[
                "https://feeds.feedburner.com/venturebeat/SZYF",
                "https://blogs.nvidia.com/feed/",
                "https://openai.com/blog/rss.xml",
                "https://research.google/rss.xml",
            ],
        ),
        Category::Frameworks => (
            4,
            &[
                "node.js",
                "express",
                "react",
                "vue",
                "angular",
                "framework",
                "library",
            ],
            &[
                "https://blog.npmjs.org/rss",
                "https://nodejs.org/en/feed/blog.xml",
                "https://reactjs.org/feed.xml",
                "https://blog.angular.io/feed",
            ],
        ),
        Category::Global => (
            5,
            &["technology", "economy", "policy", "regulation"],
            &[
                "https://feeds.bbci.co.uk/news/rss.xml",
                "https://rss.cnn.com/rss/edition.rss",
                "https://feeds.reuters.com/reuters/technologyNews",
            ],
        ),
    };

    CategoryProfile {
        enabled: true,
        priority,
        keywords: owned(keywords),
        feeds: feeds.iter().map(|u| FeedCfg::rss(u)).collect(),
    }
}
