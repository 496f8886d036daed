use nh_core::{Article, Region};

const INDIA_COUNTRY_CODES: [&str; 3] = ["IN", "IND", "INDIA"];

const INDIA_SOURCES: [&str; 16] = [
    "times of india",
    "toi",
    "hindustan times",
    "indian express",
    "ndtv",
    "zee news",
    "aaj tak",
    "india today",
    "news18",
    "firstpost",
    "livemint",
    "economic times",
    "dna india",
    "deccan herald",
    "the hindu",
    "outlook india",
];

const INDIA_KEYWORDS: [&str; 16] = [
    "india", "indian", "delhi", "mumbai", "bangalore", "chennai", "kolkata", "hyderabad", "pune", "modi", "bjp",
    "congress", "rupee", "bollywood", "ipl", "bcci",
];

// "un " keeps the trailing space so it does not match inside other words.
const GLOBAL_KEYWORDS: [&str; 13] = [
    "usa",
    "america",
    "uk",
    "britain",
    "china",
    "europe",
    "russia",
    "ukraine",
    "nato",
    "un ",
    "world",
    "international",
    "global",
];

fn hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Country code, then known Indian outlets, then keyword counts. Unclear cases are Global.
pub fn detect_region(article: &Article) -> Region {
    if let Some(country) = article.country.as_deref() {
        if INDIA_COUNTRY_CODES.contains(&country.trim().to_uppercase().as_str()) {
            return Region::India;
        }
    }

    if let Some(source) = article.source.as_deref() {
        let source = source.to_lowercase();
        if INDIA_SOURCES.iter().any(|s| source.contains(s)) {
            return Region::India;
        }
    }

    let text = [
        Some(article.title.as_str()),
        article.description.as_deref(),
        article.content.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    let india = hits(&text, &INDIA_KEYWORDS);
    if india >= 2 {
        return Region::India;
    }
    let global = hits(&text, &GLOBAL_KEYWORDS);
    if global > india {
        Region::Global
    } else if india > 0 {
        Region::India
    } else {
        Region::Global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            id: title.to_string(),
            title: title.to_string(),
            link: String::new(),
            description: None,
            content: None,
            source: None,
            country: None,
            pub_date: None,
            image_url: None,
        }
    }

    #[test]
    fn test_country_code_wins_over_text() {
        let mut a = article("Washington talks with Europe and China");
        a.country = Some(" india ".to_string());
        assert_eq!(detect_region(&a), Region::India);

        a.country = Some("IN".to_string());
        assert_eq!(detect_region(&a), Region::India);
    }

    #[test]
    fn test_indian_source() {
        let mut a = article("Mumbai cricket match");
        a.source = Some("Times of India".to_string());
        assert_eq!(detect_region(&a), Region::India);
    }

    #[test]
    fn test_keyword_scoring() {
        assert_eq!(detect_region(&article("Delhi and Mumbai brace for heat")), Region::India);
        assert_eq!(detect_region(&article("Russia and Ukraine at the world stage, india watches")), Region::Global);
        assert_eq!(detect_region(&article("Local cricket in Pune")), Region::India);
        assert_eq!(detect_region(&article("Quarterly results")), Region::Global);
    }

    #[test]
    fn test_description_and_content_are_scanned() {
        let mut a = article("Budget day");
        a.description = Some("The rupee slid".to_string());
        a.content = Some("Analysts in Kolkata expect...".to_string());
        assert_eq!(detect_region(&a), Region::India);
    }
}
