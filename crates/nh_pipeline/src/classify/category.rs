use nh_core::{Article, Category};

/// Substring keywords per topic, in tie-break order.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 6] = [
    (
        Category::Sports,
        &["sport", "game", "match", "player", "team", "football", "cricket", "tennis"],
    ),
    (
        Category::Politics,
        &["politic", "government", "election", "minister", "parliament", "vote"],
    ),
    (
        Category::Technology,
        &["tech", "ai", "software", "computer", "digital", "app", "startup"],
    ),
    (
        Category::Health,
        &["health", "medical", "doctor", "hospital", "covid", "vaccine", "medicine"],
    ),
    (
        Category::Crime,
        &["crime", "police", "arrest", "court", "murder", "theft", "investigation"],
    ),
    (
        Category::Entertainment,
        &["movie", "film", "music", "celebrity", "actor", "entertainment"],
    ),
];

/// Characters of content that take part in classification.
pub const CONTENT_PREFIX_CHARS: usize = 200;

/// Below this length the ML path does not bother and answers `general`.
pub const MIN_CLASSIFIABLE_CHARS: usize = 10;

/// Topic with the most keyword hits; the earlier topic wins a tie. No hits is `general`.
pub fn keyword_category(text: &str) -> Category {
    let text = text.to_lowercase();
    let mut best = (Category::General, 0usize);
    for (category, words) in CATEGORY_KEYWORDS {
        let score = words.iter().filter(|w| text.contains(*w)).count();
        if score > best.1 {
            best = (category, score);
        }
    }
    best.0
}

pub(crate) fn content_prefix(article: &Article) -> String {
    article
        .content
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(CONTENT_PREFIX_CHARS)
        .collect()
}

/// `"{title}. {description}. {content prefix}"`, as sent to the zero-shot model.
pub fn zero_shot_text(article: &Article) -> String {
    format!(
        "{}. {}. {}",
        article.title,
        article.description_text(),
        content_prefix(article)
    )
    .trim()
    .to_string()
}

/// Keyword input when no model is configured.
pub fn keyword_text(article: &Article) -> String {
    format!(
        "{} {} {}",
        article.title,
        article.description_text(),
        content_prefix(article)
    )
}

/// Keyword input after a model failure: title and description only.
pub fn fallback_text(article: &Article) -> String {
    format!("{} {}", article.title, article.description_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_category() {
        assert_eq!(keyword_category("Police arrest two after theft"), Category::Crime);
        assert_eq!(keyword_category("Mumbai cricket match"), Category::Sports);
        assert_eq!(keyword_category("Weather update: cloudy skies"), Category::General);
    }

    #[test]
    fn test_ties_go_to_earlier_topic() {
        // one sports hit ("team") and one health hit ("doctor")
        assert_eq!(keyword_category("The doctor and the team"), Category::Sports);
    }

    #[test]
    fn test_zero_shot_text_truncates_content() {
        let article = Article {
            id: "1".to_string(),
            title: "Title".to_string(),
            link: String::new(),
            description: None,
            content: Some("x".repeat(500)),
            source: None,
            country: None,
            pub_date: None,
            image_url: None,
        };
        let text = zero_shot_text(&article);
        assert!(text.starts_with("Title. . x"));
        assert_eq!(text.chars().filter(|c| *c == 'x').count(), CONTENT_PREFIX_CHARS);
    }
}
