use crate::types::{EnrichedArticle, Sentiment, Tone};

const POSITIVE_KEYWORDS: &[&str] = &[
    "launch", "success", "improve", "new", "initiative", "progress", "achieve",
];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "problem", "issue", "fail", "crisis", "accident", "protest", "delay",
];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Civic Updates", &["municipal", "corporation", "ward", "civic", "infrastructure"]),
    ("Environment", &["waste", "pollution", "green", "environment", "recycle"]),
    ("Transport", &["traffic", "road", "metro", "bus", "transport"]),
    ("Education", &["school", "college", "education", "student", "exam"]),
    ("Health", &["hospital", "health", "medical", "doctor", "clinic"]),
    ("Politics", &["minister", "election", "party", "government", "political"]),
    ("Business", &["business", "market", "economy", "trade", "industry"]),
];

/// Keyword-count sentiment over article text. Tone follows whichever keyword
/// list matched more; the score is their difference.
pub fn analyze_sentiment_tone(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_KEYWORDS.iter().filter(|w| lower.contains(*w)).count() as i32;
    let negative = NEGATIVE_KEYWORDS.iter().filter(|w| lower.contains(*w)).count() as i32;

    let tone = if positive > negative {
        Tone::Positive
    } else if negative > positive {
        Tone::Negative
    } else {
        Tone::Neutral
    };

    Sentiment {
        tone,
        sentiment_score: positive - negative,
        confidence: "medium".to_string(),
    }
}

/// Suggest categories from the fixed keyword table checked against the
/// lowercased summary and title. Never empty.
pub fn suggest_categories(summary: &str, title: &str) -> Vec<String> {
    let text = format!("{} {}", summary, title).to_lowercase();
    let categories: Vec<String> = CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| category.to_string())
        .collect();

    if categories.is_empty() {
        vec!["General News".to_string()]
    } else {
        categories
    }
}

/// Publishing recommendations derived from location, categories and
/// organization entities.
pub fn generate_recommendations(article: &EnrichedArticle) -> String {
    let mut recommendations = Vec::new();

    if let Some(location) = &article.primary_location {
        recommendations.push(format!("Push notification to residents in {}", location.name));
    }
    // The catch-all "General News" default is not worth highlighting.
    if article.suggested_categories != ["General News"] {
        recommendations.push(format!(
            "Highlight in '{}' category",
            article.suggested_categories.join(", ")
        ));
    }
    let orgs = &article.named_entities.org;
    if !orgs.is_empty() {
        let top: Vec<&str> = orgs.iter().take(2).map(String::as_str).collect();
        recommendations.push(format!("Tag organizations: {}", top.join(", ")));
    }

    if recommendations.is_empty() {
        "Standard publishing".to_string()
    } else {
        recommendations.join("; ")
    }
}

/// Derive sentiment, categories and recommendations from a fully processed
/// article.
pub fn enrich_article(article: &mut EnrichedArticle) {
    let text = if article.ai_summary.is_empty() {
        article.article.description.clone()
    } else {
        article.ai_summary.clone()
    };
    article.sentiment = analyze_sentiment_tone(&text);
    article.suggested_categories = suggest_categories(&article.ai_summary, &article.article.title);
    article.recommendations = generate_recommendations(article);
}
