use crate::types::{EnrichedArticle, GeoConfidence, GeoTag};
use crate::utils::dedup_preserve_order;
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// At most this many candidate locations are resolved per article.
const MAX_GEOCODED_LOCATIONS: usize = 3;
/// Cap on generic capitalized-word candidates pulled from raw text.
const MAX_GENERIC_CANDIDATES: usize = 5;
/// Attempts against the external geocoder before giving up on a candidate.
const GEOCODE_RETRIES: usize = 3;

/// Offline lookup table of major cities; the fast path and the first tier of
/// the full path.
static CITY_TABLE: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("nagpur", (21.1458, 79.0882)),
        ("mumbai", (19.0760, 72.8777)),
        ("delhi", (28.6139, 77.2090)),
        ("bangalore", (12.9716, 77.5946)),
        ("pune", (18.5204, 73.8567)),
        ("hyderabad", (17.3850, 78.4867)),
        ("chennai", (13.0827, 80.2707)),
        ("kolkata", (22.5726, 88.3639)),
    ])
});

static SUFFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(?:Municipal|Corporation|MC|Nagar|City|District)")
        .expect("valid regex")
});
static STATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*),\s*(?:Maharashtra|Karnataka|Tamil Nadu|Gujarat|Rajasthan|Kerala|Punjab|Telangana|West Bengal|Uttar Pradesh|Madhya Pradesh|Bihar|Odisha)",
    )
    .expect("valid regex")
});
static PREPOSITION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:in|at)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)").expect("valid regex")
});
static CAPITALIZED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b").expect("valid regex"));

const NON_LOCATION_WORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "A", "An", "And", "Or", "But",
];

#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding timed out")]
    Timeout,
    #[error("geocoding service error: {0}")]
    Service(String),
    #[error("{0}")]
    Other(String),
}

/// External geocoding service. Timeout and service errors are retried with
/// backoff; anything else fails the candidate immediately.
#[async_trait]
pub trait GeocodeBackend: Send + Sync {
    async fn geocode(&self, query: &str) -> std::result::Result<Option<GeocodedPlace>, GeocodeError>;
}

/// Extract candidate location strings from raw text via capitalization
/// heuristics, in first-seen order.
pub fn extract_location_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    for pattern in [&*SUFFIX_PATTERN, &*STATE_PATTERN, &*PREPOSITION_PATTERN] {
        for caps in pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                candidates.push(m.as_str().to_string());
            }
        }
    }

    let generic = CAPITALIZED_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|w| w.len() > 3 && !NON_LOCATION_WORDS.contains(&w.as_str()))
        .take(MAX_GENERIC_CANDIDATES);
    candidates.extend(generic);

    dedup_preserve_order(&mut candidates);
    candidates
}

/// Resolves location mentions to coordinates, with a network-free fast path
/// and a backoff-retried network path.
pub struct GeoTagger {
    backend: Option<Arc<dyn GeocodeBackend>>,
    /// Politeness gap enforced before every network geocode call.
    request_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl GeoTagger {
    pub fn new() -> Self {
        Self {
            backend: None,
            request_gap: Duration::from_secs(1),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn GeocodeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    fn lookup_city(&self, name: &str) -> Option<GeoTag> {
        let (lat, lon) = CITY_TABLE.get(name.to_lowercase().trim())?;
        Some(GeoTag {
            name: name.to_string(),
            latitude: *lat,
            longitude: *lon,
            formatted_address: format!("{}, India", name),
            confidence: GeoConfidence::High,
        })
    }

    async fn politeness_pause(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.request_gap {
                let wait = self.request_gap - elapsed;
                debug!("Throttling geocode request: waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Resolve one candidate: city table first, then the external service
    /// with up to three backoff-spaced attempts. Returns None on permanent
    /// failure; geocoding never fails the pipeline.
    pub async fn geocode_location(&self, name: &str) -> Option<GeoTag> {
        if let Some(tag) = self.lookup_city(name) {
            return Some(tag);
        }
        let backend = self.backend.as_ref()?;

        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(8),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        for attempt in 0..GEOCODE_RETRIES {
            self.politeness_pause().await;
            match backend.geocode(name).await {
                Ok(Some(place)) => {
                    return Some(GeoTag {
                        name: name.to_string(),
                        latitude: place.latitude,
                        longitude: place.longitude,
                        formatted_address: place.address,
                        confidence: GeoConfidence::Medium,
                    });
                }
                Ok(None) => return None,
                Err(e @ (GeocodeError::Timeout | GeocodeError::Service(_))) => {
                    if attempt + 1 == GEOCODE_RETRIES {
                        error!("Geocoding failed for {}: {}", name, e);
                    } else if let Some(delay) = backoff.next_backoff() {
                        warn!("Geocode attempt {} failed for {}, retrying", attempt + 1, name);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    error!("Error geocoding {}: {}", name, e);
                    break;
                }
            }
        }
        None
    }

    /// Geo-tag an article: merge NER locations with text heuristics, resolve
    /// the first three candidates, and derive the display string.
    pub async fn tag_article(&self, article: &mut EnrichedArticle, fast: bool) {
        let text = format!("{} {}", article.article.title, article.article.description);

        let mut candidates: Vec<String> = Vec::new();
        candidates.extend(article.named_entities.gpe.iter().cloned());
        candidates.extend(article.named_entities.loc.iter().cloned());
        candidates.extend(extract_location_candidates(&text));
        dedup_preserve_order(&mut candidates);

        let mut geo_tags = Vec::new();
        for candidate in candidates.iter().take(MAX_GEOCODED_LOCATIONS) {
            let resolved = if fast {
                self.lookup_city(candidate)
            } else {
                self.geocode_location(candidate).await
            };
            if let Some(tag) = resolved {
                geo_tags.push(tag);
            }
        }

        article.primary_location = geo_tags.first().cloned();
        article.geo_display = format_geo_display(article.primary_location.as_ref());
        article.geo_tags = geo_tags;
    }
}

impl Default for GeoTagger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_geo_display(primary: Option<&GeoTag>) -> String {
    match primary {
        Some(tag) => format!(
            "{} – Lat: {:.4}°N, Long: {:.4}°E",
            tag.name, tag.latitude, tag.longitude
        ),
        None => "Location not identified".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// Geocoding against the public Nominatim API, biased to Indian localities.
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimBackend {
    pub fn new() -> Self {
        Self::with_base_url("https://nominatim.openstreetmap.org")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("hyperlocal_news_summarizer")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for NominatimBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> std::result::Result<Option<GeocodedPlace>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("limit", "1"),
                ("q", &format!("{}, India", query)),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::Service(e.to_string())
                }
            })?;

        if response.status().is_server_error() {
            return Err(GeocodeError::Service(format!("HTTP {}", response.status())));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Other(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Other(e.to_string()))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Other(e.to_string()))?;

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            address: place.display_name,
        }))
    }
}
