mod common;

use common::raw_article;
use hyperlocal_news::enrich::{
    analyze_sentiment_tone, enrich_article, generate_recommendations, suggest_categories,
};
use hyperlocal_news::types::{EnrichedArticle, GeoConfidence, GeoTag, Tone};

#[test]
fn sentiment_follows_the_dominant_keyword_list() {
    let positive = analyze_sentiment_tone("City launches new initiative to improve parks");
    assert_eq!(positive.tone, Tone::Positive);
    assert!(positive.sentiment_score > 0);

    let negative = analyze_sentiment_tone("Protest over water crisis after supply failure");
    assert_eq!(negative.tone, Tone::Negative);
    assert!(negative.sentiment_score < 0);

    let neutral = analyze_sentiment_tone("Council meeting scheduled for Monday");
    assert_eq!(neutral.tone, Tone::Neutral);
    assert_eq!(neutral.sentiment_score, 0);
}

#[test]
fn categories_default_to_general_news() {
    assert_eq!(
        suggest_categories("", "Weekly quiz answers announced"),
        vec!["General News"]
    );

    let tagged = suggest_categories(
        "The municipal corporation repaved the road near the hospital",
        "Ward works update",
    );
    assert_eq!(tagged, vec!["Civic Updates", "Transport", "Health"]);
}

#[test]
fn recommendations_combine_location_category_and_orgs() {
    let mut article = EnrichedArticle::from_raw(raw_article(
        "Metro trial run",
        "https://example.com/metro",
        "2024-02-01",
    ));
    article.primary_location = Some(GeoTag {
        name: "Nagpur".to_string(),
        latitude: 21.1458,
        longitude: 79.0882,
        formatted_address: "Nagpur, India".to_string(),
        confidence: GeoConfidence::High,
    });
    article.suggested_categories = vec!["Transport".to_string()];
    article.named_entities.org =
        vec!["Metro Rail".to_string(), "NMC".to_string(), "NHAI".to_string()];

    let recommendations = generate_recommendations(&article);
    assert_eq!(
        recommendations,
        "Push notification to residents in Nagpur; \
         Highlight in 'Transport' category; \
         Tag organizations: Metro Rail, NMC"
    );
}

#[test]
fn bare_article_gets_the_standard_recommendation() {
    let mut article = EnrichedArticle::from_raw(raw_article(
        "Weekly quiz answers announced",
        "https://example.com/quiz",
        "2024-02-01",
    ));

    enrich_article(&mut article);

    assert_eq!(article.suggested_categories, vec!["General News"]);
    assert_eq!(article.recommendations, "Standard publishing");
    assert_eq!(article.sentiment.tone, Tone::Neutral);
}

#[test]
fn enrichment_prefers_the_summary_over_the_description() {
    let mut article = EnrichedArticle::from_raw(raw_article(
        "Short headline",
        "https://example.com/h",
        "2024-02-01",
    ));
    article.article.description = "A protest over a failed road project".to_string();
    article.ai_summary = "The city launched a new initiative to improve schools".to_string();

    enrich_article(&mut article);

    assert_eq!(article.sentiment.tone, Tone::Positive);
    assert!(article
        .suggested_categories
        .contains(&"Education".to_string()));
}
