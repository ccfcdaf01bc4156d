use crate::types::RawArticle;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

/// Cross-run record of article identity keys that have already been
/// processed. Passed into each batch call; the caller decides when keys are
/// marked seen and when the whole set is reset.
#[derive(Debug, Default, Clone)]
pub struct DedupeStore {
    seen: HashSet<String>,
}

impl DedupeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn mark_seen(&mut self, key: String) {
        if !key.is_empty() {
            self.seen.insert(key);
        }
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Best-effort parse of the free-text `published` field. Feeds emit RFC 2822
/// (RSS), RFC 3339 (Atom, JSON APIs) and assorted bare date formats.
pub fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d %b %Y %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Sort a batch newest-first, drop duplicates (within the batch and against
/// the cross-run store) and apply the offset/cap window.
///
/// Unparseable dates sort as earliest-possible. Articles with an empty
/// identity key cannot be deduplicated and are dropped. The caller is
/// responsible for marking accepted keys seen once processing succeeds.
pub fn order_and_dedupe(
    articles: Vec<RawArticle>,
    store: &DedupeStore,
    offset: usize,
    max_total: Option<usize>,
) -> Vec<RawArticle> {
    let mut dated: Vec<(Option<DateTime<Utc>>, RawArticle)> = articles
        .into_iter()
        .map(|a| (parse_published(&a.published), a))
        .collect();
    // Stable sort keeps collection order for ties and undated items.
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen_local: HashSet<String> = HashSet::new();
    let mut deduped = Vec::new();
    for (_, article) in dated {
        let key = article.identity_key();
        if key.is_empty() {
            debug!("Dropping article without identity key: {:?}", article.title);
            continue;
        }
        if seen_local.contains(&key) || store.contains(&key) {
            debug!("Dropping duplicate article: {}", key);
            continue;
        }
        seen_local.insert(key);
        deduped.push(article);
    }

    let mut windowed: Vec<RawArticle> = deduped.into_iter().skip(offset).collect();
    if let Some(cap) = max_total {
        windowed.truncate(cap);
    }

    info!("After dedupe/filter: {} articles remaining", windowed.len());
    windowed
}
