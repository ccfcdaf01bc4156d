#![allow(dead_code)]

use async_trait::async_trait;
use hyperlocal_news::geo::{GeocodeBackend, GeocodeError, GeocodedPlace};
use hyperlocal_news::nlp::NerSpan;
use hyperlocal_news::types::{PipelineError, RawArticle, Result};
use hyperlocal_news::{
    LanguageDetector, NerBackend, SpeechBackend, SummaryBackend, TranslationBackend,
};
use hyperlocal_news::translator::TranslatedText;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

pub fn raw_article(title: &str, link: &str, published: &str) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        description: format!("{} description text for testing purposes", title),
        link: link.to_string(),
        published: published.to_string(),
        source: "Test Source".to_string(),
        feed_type: None,
        raw_content: String::new(),
        scraped: false,
    }
}

/// Detector that always reports the same language.
pub struct StaticDetector(pub Option<String>);

#[async_trait]
impl LanguageDetector for StaticDetector {
    async fn detect(&self, _text: &str) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

/// Translator that wraps the input so tests can see which language and
/// backend produced the text.
pub struct EchoTranslator;

#[async_trait]
impl TranslationBackend for EchoTranslator {
    fn backend_name(&self) -> String {
        "echo".to_string()
    }

    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<TranslatedText> {
        Ok(TranslatedText {
            text: format!("[{}] {}", target, text),
            confidence: 0.9,
        })
    }
}

/// Translator that always fails, counting how often it was asked.
pub struct FailingTranslator {
    pub calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for FailingTranslator {
    fn backend_name(&self) -> String {
        "failing".to_string()
    }

    async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<TranslatedText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PipelineError::Backend(
            "translation service unavailable".to_string(),
        ))
    }
}

/// Summarizer returning a fixed summary, recording calls and the length
/// bounds it was given.
pub struct FixedSummarizer {
    pub summary: String,
    pub calls: AtomicUsize,
    pub bounds: Mutex<Option<(usize, usize)>>,
}

impl FixedSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: AtomicUsize::new(0),
            bounds: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_bounds(&self) -> Option<(usize, usize)> {
        *self.bounds.lock().unwrap()
    }
}

#[async_trait]
impl SummaryBackend for FixedSummarizer {
    async fn summarize(&self, _text: &str, min_len: usize, max_len: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.bounds.lock().unwrap() = Some((min_len, max_len));
        Ok(self.summary.clone())
    }
}

pub struct FailingSummarizer;

#[async_trait]
impl SummaryBackend for FailingSummarizer {
    async fn summarize(&self, _text: &str, _min_len: usize, _max_len: usize) -> Result<String> {
        Err(PipelineError::Backend("model inference failed".to_string()))
    }
}

/// NER backend replaying preset spans.
pub struct FixedNer {
    pub spans: Vec<NerSpan>,
}

impl FixedNer {
    pub fn new(spans: &[(&str, &str)]) -> Self {
        Self {
            spans: spans
                .iter()
                .map(|(label, text)| NerSpan {
                    label: label.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl NerBackend for FixedNer {
    async fn extract(&self, _text: &str) -> Result<Vec<NerSpan>> {
        Ok(self.spans.clone())
    }
}

/// Speech backend that writes the narration text itself to disk.
pub struct WritingSpeech;

#[async_trait]
impl SpeechBackend for WritingSpeech {
    async fn synthesize(&self, text: &str, _lang: &str, path: &Path) -> Result<()> {
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Geocoder that fails `fail_times` with a service error before succeeding.
pub struct FlakyGeocoder {
    pub fail_times: usize,
    pub calls: AtomicUsize,
    pub place: GeocodedPlace,
}

impl FlakyGeocoder {
    pub fn new(fail_times: usize, latitude: f64, longitude: f64) -> Self {
        Self {
            fail_times,
            calls: AtomicUsize::new(0),
            place: GeocodedPlace {
                latitude,
                longitude,
                address: "Test Place, India".to_string(),
            },
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeBackend for FlakyGeocoder {
    async fn geocode(&self, _query: &str) -> std::result::Result<Option<GeocodedPlace>, GeocodeError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            Err(GeocodeError::Service("HTTP 503".to_string()))
        } else {
            Ok(Some(self.place.clone()))
        }
    }
}
