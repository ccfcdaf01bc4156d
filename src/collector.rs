use crate::types::{FeedConfig, FeedType, PipelineError, RawArticle, Result};
use crate::utils::{boilerplate_hits, strip_html};
use async_trait::async_trait;
use feed_rs::parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Minimum length for adopted full-page text. Anything shorter is assumed to
/// be a paywall stub or navigation residue and the feed summary is kept.
const MIN_FETCHED_CONTENT_LEN: usize = 200;

/// External collaborator that turns an article URL into best-effort plain
/// text. Implementations return an empty string on failure; no error escapes.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> String;
}

/// Collects news articles from RSS feeds and JSON APIs and normalizes them
/// to the common `RawArticle` shape.
pub struct FeedIngestor {
    client: reqwest::Client,
    content_fetcher: Option<Arc<dyn ContentFetcher>>,
    /// Pause after each full-page fetch so article hosts are not hammered.
    scrape_pause: Duration,
}

impl FeedIngestor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(15))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            content_fetcher: None,
            scrape_pause: Duration::from_millis(500),
        }
    }

    /// Enable full-article content augmentation for RSS entries.
    pub fn with_content_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.content_fetcher = Some(fetcher);
        self
    }

    /// Collect up to `limit` articles from one RSS/Atom feed.
    pub async fn collect_rss_feed(
        &self,
        feed_url: &str,
        source_name: &str,
        limit: usize,
    ) -> Result<Vec<RawArticle>> {
        let body = self
            .client
            .get(feed_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let feed = parser::parse(body.as_ref())
            .map_err(|e| PipelineError::FeedParse(format!("{}: {}", feed_url, e)))?;

        let mut articles = Vec::new();
        for entry in feed.entries.into_iter().take(limit) {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| strip_html(&s.content))
                .unwrap_or_default();
            let published = entry
                .published
                .map(|dt| dt.to_rfc2822())
                .unwrap_or_default();

            let (content_text, scraped) = self.augment_content(&link, &description).await;

            articles.push(RawArticle {
                raw_content: format!("{} {}", title, content_text),
                title,
                description: content_text,
                link,
                published,
                source: source_name.to_string(),
                feed_type: Some(FeedType::Rss),
                scraped,
            });
        }

        info!(
            "Collected {} articles from {} ({})",
            articles.len(),
            source_name,
            feed_url
        );
        Ok(articles)
    }

    /// Replace the feed summary with full-page text when a content fetcher is
    /// registered and the fetched text looks like an actual article.
    async fn augment_content(&self, link: &str, description: &str) -> (String, bool) {
        let fetcher = match (&self.content_fetcher, link.is_empty()) {
            (Some(f), false) => f,
            _ => return (description.to_string(), false),
        };

        debug!("Fetching full content from: {}", link);
        let fetched = fetcher.fetch(link).await;
        if fetched.is_empty() {
            return (description.to_string(), false);
        }
        tokio::time::sleep(self.scrape_pause).await;

        if boilerplate_hits(&fetched) >= 2 || fetched.len() < MIN_FETCHED_CONTENT_LEN {
            warn!("Fetched content for {} is mostly navigation, keeping feed summary", link);
            return (description.to_string(), false);
        }
        if fetched.len() > MIN_FETCHED_CONTENT_LEN {
            (fetched, true)
        } else {
            (description.to_string(), false)
        }
    }

    /// Collect up to `limit` articles from a generic JSON news API.
    pub async fn collect_api_news(
        &self,
        api_url: &str,
        api_key: Option<&str>,
        source_name: &str,
        limit: usize,
    ) -> Result<Vec<RawArticle>> {
        let mut request = self.client.get(api_url);
        if let Some(key) = api_key {
            request = request.header("X-API-Key", key);
        }

        let data: serde_json::Value = request.send().await?.error_for_status()?.json().await?;

        // APIs disagree on where the result list lives; prefer the common
        // wrappers before treating the whole payload as a list.
        let items = if let Some(articles) = data.get("articles").and_then(|v| v.as_array()) {
            articles.clone()
        } else if let Some(results) = data.get("results").and_then(|v| v.as_array()) {
            results.clone()
        } else if let Some(list) = data.as_array() {
            list.clone()
        } else {
            Vec::new()
        };

        let str_field = |item: &serde_json::Value, keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
                .find(|s| !s.is_empty())
                .unwrap_or_default()
                .to_string()
        };

        let mut articles = Vec::new();
        for item in items.iter().take(limit) {
            let title = str_field(item, &["title"]);
            let description = strip_html(&str_field(item, &["description", "summary"]));
            articles.push(RawArticle {
                raw_content: format!("{} {}", title, description),
                title,
                description,
                link: str_field(item, &["url", "link"]),
                published: str_field(item, &["publishedAt", "published"]),
                source: source_name.to_string(),
                feed_type: Some(FeedType::Api),
                scraped: false,
            });
        }

        info!("Collected {} articles from {} API", articles.len(), source_name);
        Ok(articles)
    }

    /// Collect from every configured feed. A failing feed contributes zero
    /// articles and logs; it never aborts the rest of the batch.
    pub async fn collect_multiple_feeds(
        &self,
        configs: &[FeedConfig],
        per_feed_limit: usize,
    ) -> Vec<RawArticle> {
        let mut all_articles = Vec::new();

        for config in configs {
            let result = match config.feed_type {
                FeedType::Rss => {
                    self.collect_rss_feed(&config.url, &config.name, per_feed_limit)
                        .await
                }
                FeedType::Api => {
                    self.collect_api_news(
                        &config.url,
                        config.api_key.as_deref(),
                        &config.name,
                        per_feed_limit,
                    )
                    .await
                }
                other => {
                    warn!("No collector for feed type {:?}, skipping {}", other, config.name);
                    continue;
                }
            };

            match result {
                Ok(articles) => all_articles.extend(articles),
                Err(e) => error!("Error collecting feed {}: {}", config.url, e),
            }
        }

        info!("Total articles collected: {}", all_articles.len());
        all_articles
    }
}

impl Default for FeedIngestor {
    fn default() -> Self {
        Self::new()
    }
}
