use crate::dedupe::DedupeStore;
use crate::types::EnrichedArticle;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts over the cached batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_articles: usize,
    pub languages: BTreeMap<String, usize>,
    pub locations: Vec<String>,
    pub categories: BTreeMap<String, usize>,
}

/// Process-wide article state: the latest enriched batch (replaced on every
/// run) and the cross-run seen-key set, both clearable on demand.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: Vec<EnrichedArticle>,
    seen: DedupeStore,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly processed batch, discarding the previous one.
    pub fn replace(&mut self, batch: Vec<EnrichedArticle>) {
        self.articles = batch;
    }

    pub fn get(&self, index: usize) -> Option<&EnrichedArticle> {
        self.articles.get(index)
    }

    pub fn articles(&self) -> &[EnrichedArticle] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn seen(&self) -> &DedupeStore {
        &self.seen
    }

    pub fn mark_seen(&mut self, key: String) {
        self.seen.mark_seen(key);
    }

    pub fn reset_seen(&mut self) {
        self.seen.reset();
    }

    /// Language, location and category aggregates for the cached batch.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            total_articles: self.articles.len(),
            ..StoreStats::default()
        };

        for article in &self.articles {
            let lang = article
                .detected_language
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            *stats.languages.entry(lang).or_insert(0) += 1;

            if let Some(location) = &article.primary_location {
                if !stats.locations.contains(&location.name) {
                    stats.locations.push(location.name.clone());
                }
            }

            for category in &article.suggested_categories {
                *stats.categories.entry(category.clone()).or_insert(0) += 1;
            }
        }
        stats
    }
}
