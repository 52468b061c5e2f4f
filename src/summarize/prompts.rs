//! Prompt builders and fixed fallback texts.

use crate::category::Category;
use crate::config::DeveloperProfile;
use crate::ingest::types::FeedItem;
use crate::trending::TrendingTopic;

/// `• title\n  description` blocks separated by blank lines.
pub fn articles_block(items: &[&FeedItem]) -> String {
    items
        .iter()
        .map(|a| format!("• {}\n  {}", a.title, a.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn category_prompt(category: Category, articles: &str) -> String {
    let (role, focus, ask) = match category {
        Category::Tech => (
            "As a senior backend developer, analyze these technology news articles and provide a concise summary for fellow developers.",
            "- Impact on backend development\n- New tools, frameworks, or technologies\n- Industry trends affecting developers\n- Practical takeaways",
            "Provide a summary in 2-3 paragraphs with actionable insights.",
        ),
        Category::Security => (
            "As a cybersecurity expert, analyze these security news articles for backend developers.",
            "- Critical vulnerabilities and patches\n- Security best practices\n- Threats affecting backend systems\n- Recommended actions",
            "Provide a summary with immediate action items and security recommendations.",
        ),
        Category::Ai => (
            "As an AI/ML specialist, analyze these AI news articles for backend developers.",
            "- Practical AI tools for backend development\n- Integration opportunities\n- Performance implications\n- Future considerations",
            "Provide a summary highlighting practical applications and opportunities.",
        ),
        Category::Frameworks => (
            "As a full-stack architect, analyze these framework and development news.",
            "- Important updates and breaking changes\n- New features and capabilities\n- Migration considerations\n- Performance improvements",
            "Provide a summary with upgrade recommendations and compatibility notes.",
        ),
        Category::Global => (
            "As a tech industry analyst, analyze these global news items for their impact on the technology sector.",
            "- Economic implications for tech\n- Policy changes affecting developers\n- Market trends and opportunities\n- Global tech developments",
            "Provide a brief summary of the most relevant developments.",
        ),
    };
    format!("{role} Focus on:\n{focus}\n\nArticles:\n{articles}\n\n{ask}")
}

pub fn advice_prompt(dev: &DeveloperProfile, date: &str) -> String {
    format!(
        "As an experienced tech mentor and backend development expert, provide 4-5 actionable career advice tips for today ({date}).\n\n\
Context:\n\
- Target audience: {level} backend developers\n\
- Focus areas: {focus}\n\
- Preferred technologies: {langs}\n\n\
Provide practical advice covering:\n\
1. Skill development priorities\n\
2. Industry trends to watch\n\
3. Career growth strategies\n\
4. Technical best practices\n\
5. Professional networking tips\n\n\
Format as bullet points with brief explanations. Make it specific and actionable.",
        level = dev.experience_level,
        focus = dev.focus_areas.join(", "),
        langs = dev.preferred_languages.join(", "),
    )
}

pub fn future_prompt(dev: &DeveloperProfile, year: i32) -> String {
    format!(
        "As a technology futurist and industry expert, provide insights about future technology trends and opportunities for backend developers in {year} and beyond.\n\n\
Focus on:\n\
- Emerging technologies with practical applications\n\
- Market demands and skill evolution\n\
- Architecture and system design trends\n\
- Tools and platforms gaining traction\n\
- Career opportunities and growth areas\n\n\
Context: {focus}\n\n\
Provide 4-5 key insights with practical implications for backend developers. Be specific about timelines and actionable steps.",
        focus = dev.focus_areas.join(", "),
    )
}

/// `topic (N mentions), ...`
pub fn topics_text(topics: &[TrendingTopic]) -> String {
    topics
        .iter()
        .map(|t| format!("{} ({} mentions)", t.topic, t.mentions))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn trending_prompt(topics_text: &str) -> String {
    format!(
        "Analyze these trending topics from today's tech news and explain their significance for backend developers:\n\n\
Trending topics: {topics_text}\n\n\
Provide a brief analysis of:\n\
1. Why these topics are trending\n\
2. Relevance to backend development\n\
3. Potential impact on the industry\n\
4. What developers should know\n\n\
Keep it concise and practical."
    )
}

pub fn recommendations_prompt(
    dev: &DeveloperProfile,
    total_articles: usize,
    categories: &[Category],
) -> String {
    let cats: Vec<&str> = categories.iter().map(|c| c.id()).collect();
    format!(
        "Based on today's tech news digest with {total_articles} articles across {cats}, provide 3-4 personalized learning recommendations for a {level} backend developer.\n\n\
Focus areas: {focus}\n\
Preferred technologies: {langs}\n\n\
Recommendations should include:\n\
- Specific skills to develop\n\
- Resources to explore\n\
- Projects to consider\n\
- Technologies to investigate\n\n\
Make it actionable and relevant to current industry trends.",
        cats = cats.join(", "),
        level = dev.experience_level,
        focus = dev.focus_areas.join(", "),
        langs = dev.preferred_languages.join(", "),
    )
}

// Fallbacks

pub fn quiet_day(category: Category) -> &'static str {
    match category {
        Category::Tech => "No major technology news available today. Stay updated with latest development practices and explore new tools in your spare time.",
        Category::Security => "No critical security alerts today. Continue following security best practices: keep dependencies updated, use HTTPS, validate inputs, and monitor your systems.",
        Category::Ai => "No significant AI news today. Consider exploring machine learning integration in your current projects or learning about AI-powered development tools.",
        Category::Frameworks => "No major framework updates today. Good time to review your current tech stack and plan any necessary upgrades.",
        Category::Global => "Global tech news quiet today. Focus on your development work and stay connected with the tech community.",
    }
}

pub const NO_TRENDING: &str = "No trending topics identified from today's news.";

pub fn trending_unavailable(topics_text: &str) -> String {
    format!("Trending topics: {topics_text}. Analysis temporarily unavailable.")
}

pub const DEFAULT_ADVICE: &str = "\
• **Stay Current**: Regularly update your skills with the latest backend technologies and frameworks
• **Practice System Design**: Work on designing scalable architectures and understanding distributed systems
• **Build Projects**: Create side projects that demonstrate your problem-solving abilities
• **Network Actively**: Engage with the developer community through conferences, meetups, and online forums
• **Focus on Fundamentals**: Master data structures, algorithms, and database optimization techniques";

pub const DEFAULT_FUTURE: &str = "\
• **Cloud-Native Development**: Containerization and serverless architectures will become standard
• **AI Integration**: Backend systems will increasingly incorporate AI/ML capabilities for automation and insights
• **Edge Computing**: Distributed computing at the edge will create new architectural challenges and opportunities
• **API-First Design**: GraphQL and advanced API patterns will shape how we build interconnected systems
• **Observability**: Advanced monitoring, logging, and tracing will be essential for complex distributed systems";

pub const DEFAULT_RECOMMENDATIONS: &str = "\
• **Learn Container Orchestration**: Dive deeper into Kubernetes and Docker for scalable deployments
• **Explore API Design**: Study GraphQL, REST best practices, and API versioning strategies
• **Practice System Design**: Use resources like Designing Data-Intensive Applications and system design interviews
• **Try New Databases**: Experiment with modern databases like Redis, MongoDB, or time-series databases";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_block_uses_bullets() {
        let a = FeedItem {
            title: "Rust 2.0".into(),
            description: "Big news".into(),
            link: String::new(),
            pub_date: None,
            category: Category::Tech,
            source: "S".into(),
        };
        let b = FeedItem {
            title: "Go 2".into(),
            ..a.clone()
        };
        assert_eq!(articles_block(&[&a, &b]), "• Rust 2.0\n  Big news\n\n• Go 2\n  Big news");
    }

    #[test]
    fn security_prompt_embeds_articles() {
        let p = category_prompt(Category::Security, "• CVE\n  patch now");
        assert!(p.starts_with("As a cybersecurity expert"));
        assert!(p.contains("Articles:\n• CVE\n  patch now\n\n"));
        assert!(p.ends_with("security recommendations."));
    }

    #[test]
    fn advice_prompt_lists_profile() {
        let dev = DeveloperProfile::default();
        let p = advice_prompt(&dev, "Mon Jun 09 2025");
        assert!(p.contains("(Mon Jun 09 2025)"));
        assert!(p.contains(&format!("Target audience: {}", dev.experience_level)));
    }
}
