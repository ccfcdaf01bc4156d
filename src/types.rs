use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where a feed's items come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    #[serde(rename = "RSS")]
    Rss,
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "SEARCH_NEWS")]
    SearchNews,
}

/// Configuration for a single feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// A normalized article as produced by the feed ingestor, before any
/// enrichment. Immutable once created; enrichment copies it forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    /// HTML-stripped description or full scraped body text.
    pub description: String,
    pub link: String,
    /// Free-text publication timestamp as the feed reported it.
    pub published: String,
    pub source: String,
    pub feed_type: Option<FeedType>,
    /// Title plus the best available body text.
    pub raw_content: String,
    /// Whether the body came from a full-page fetch rather than the feed summary.
    pub scraped: bool,
}

impl RawArticle {
    /// Key used for intra-batch and cross-run deduplication: the link when
    /// present, otherwise title+published. Empty when neither is usable.
    pub fn identity_key(&self) -> String {
        let link = self.link.trim();
        if !link.is_empty() {
            return link.to_string();
        }
        if self.title.is_empty() && self.published.is_empty() {
            return String::new();
        }
        format!("{}-{}", self.title, self.published)
    }
}

/// One target-language rendition of an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: String,
    /// 1.0 = verbatim copy (source == target), 0.7 = model fallback,
    /// 0.0 = every backend failed and the original text was kept.
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryMetadata {
    pub original_length: usize,
    pub summary_length: usize,
    pub compression_ratio: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Named entities grouped by category. Lists are deduplicated while
/// preserving first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntities {
    #[serde(rename = "PERSON")]
    pub person: Vec<String>,
    #[serde(rename = "ORG")]
    pub org: Vec<String>,
    #[serde(rename = "GPE")]
    pub gpe: Vec<String>,
    #[serde(rename = "LOC")]
    pub loc: Vec<String>,
    #[serde(rename = "DATE")]
    pub date: Vec<String>,
    #[serde(rename = "EVENT")]
    pub event: Vec<String>,
    #[serde(rename = "MISC")]
    pub misc: Vec<String>,
}

impl NamedEntities {
    /// File a raw NER span under its category. Unrecognized labels collapse
    /// into MISC.
    pub fn push_span(&mut self, label: &str, surface: String) {
        match label {
            "PERSON" => self.person.push(surface),
            "ORG" | "ORGANIZATION" => self.org.push(surface),
            "GPE" => self.gpe.push(surface),
            "LOC" => self.loc.push(surface),
            "DATE" => self.date.push(surface),
            "EVENT" => self.event.push(surface),
            _ => self.misc.push(surface),
        }
    }

    pub fn dedup_preserving_order(&mut self) {
        for list in [
            &mut self.person,
            &mut self.org,
            &mut self.gpe,
            &mut self.loc,
            &mut self.date,
            &mut self.event,
            &mut self.misc,
        ] {
            crate::utils::dedup_preserve_order(list);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.person.is_empty()
            && self.org.is_empty()
            && self.gpe.is_empty()
            && self.loc.is_empty()
            && self.date.is_empty()
            && self.event.is_empty()
            && self.misc.is_empty()
    }
}

/// Which tier of the geocoding chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoConfidence {
    /// Resolved from the fixed city table, no network involved.
    High,
    /// Resolved through the external geocoding service.
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoTag {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub confidence: GeoConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub tone: Tone,
    pub sentiment_score: i32,
    pub confidence: String,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            tone: Tone::Neutral,
            sentiment_score: 0,
            confidence: "medium".to_string(),
        }
    }
}

/// A fully processed article: the raw article plus everything the pipeline
/// stages attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    pub detected_language: Option<String>,
    pub translations: BTreeMap<String, Translation>,
    pub ai_summary: String,
    pub summary_metadata: SummaryMetadata,
    pub named_entities: NamedEntities,
    /// At most three resolved locations, in extraction order.
    pub geo_tags: Vec<GeoTag>,
    /// First successfully resolved location, when any.
    pub primary_location: Option<GeoTag>,
    pub geo_display: String,
    pub audio_files: BTreeMap<String, PathBuf>,
    pub sentiment: Sentiment,
    /// Never empty; defaults to ["General News"].
    pub suggested_categories: Vec<String>,
    pub recommendations: String,
    pub processed_at: DateTime<Utc>,
    pub publishing_status: String,
}

impl EnrichedArticle {
    pub fn from_raw(article: RawArticle) -> Self {
        Self {
            article,
            detected_language: None,
            translations: BTreeMap::new(),
            ai_summary: String::new(),
            summary_metadata: SummaryMetadata::default(),
            named_entities: NamedEntities::default(),
            geo_tags: Vec::new(),
            primary_location: None,
            geo_display: "Location not identified".to_string(),
            audio_files: BTreeMap::new(),
            sentiment: Sentiment::default(),
            suggested_categories: vec!["General News".to_string()],
            recommendations: "Standard publishing".to_string(),
            processed_at: Utc::now(),
            publishing_status: String::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),

    #[error("no articles available")]
    NoArticles,

    #[error("article has no usable text")]
    EmptyArticle,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
