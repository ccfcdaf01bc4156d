use crate::types::{RawArticle, Result, Translation};
use crate::utils::chunk_text;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Texts shorter than this are returned untouched; there is nothing useful
/// to detect or translate.
const MIN_TRANSLATABLE_LEN: usize = 10;
/// Confidence assigned to the chunked model-fallback tier.
const FALLBACK_CONFIDENCE: f32 = 0.7;
/// Maximum chunk size fed to a fallback model in one call.
const MAX_CHUNK_CHARS: usize = 800;

#[derive(Debug, Clone)]
pub struct TranslatedText {
    pub text: String,
    pub confidence: f32,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<Option<String>>;
}

/// A translation service. Errors are caught at the stage boundary and
/// converted into degraded results; they never reach the orchestrator.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn backend_name(&self) -> String;

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<TranslatedText>;
}

/// Result of one translation request, including which fallback tier
/// produced it.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub confidence: f32,
    pub error: Option<String>,
}

/// Translates articles with graceful multi-tier fallback: verbatim copy when
/// source equals target, then the primary service, then a per-language model
/// backend (English source only, chunked), and finally the original text
/// with confidence 0.
pub struct ArticleTranslator {
    primary: Option<Arc<dyn TranslationBackend>>,
    detector: Option<Arc<dyn LanguageDetector>>,
    fallbacks: HashMap<String, Arc<dyn TranslationBackend>>,
    /// Target languages whose fallback model already failed this run.
    failed_fallbacks: Mutex<HashSet<String>>,
}

impl ArticleTranslator {
    pub fn new() -> Self {
        Self {
            primary: None,
            detector: None,
            fallbacks: HashMap::new(),
            failed_fallbacks: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_primary(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Register a model-based fallback translator for one target language.
    pub fn register_fallback(mut self, target_lang: &str, backend: Arc<dyn TranslationBackend>) -> Self {
        self.fallbacks.insert(target_lang.to_string(), backend);
        self
    }

    pub async fn detect_language(&self, text: &str) -> Option<String> {
        if text.trim().len() < MIN_TRANSLATABLE_LEN {
            return None;
        }
        let detector = self.detector.as_ref()?;
        match detector.detect(text).await {
            Ok(lang) => lang,
            Err(e) => {
                warn!("Language detection failed: {}", e);
                None
            }
        }
    }

    /// Translate one piece of text, degrading tier by tier. Never fails:
    /// when every backend is exhausted the original text comes back with
    /// confidence 0 and an error marker.
    pub async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> TranslationOutcome {
        if text.trim().len() < MIN_TRANSLATABLE_LEN {
            return TranslationOutcome {
                text: text.to_string(),
                source_lang: source_lang.map(String::from),
                target_lang: target_lang.to_string(),
                confidence: 0.0,
                error: None,
            };
        }

        let source = match source_lang {
            Some(lang) => Some(lang.to_string()),
            None => self.detect_language(text).await,
        };

        if source.as_deref() == Some(target_lang) {
            return TranslationOutcome {
                text: text.to_string(),
                source_lang: source,
                target_lang: target_lang.to_string(),
                confidence: 1.0,
                error: None,
            };
        }

        let primary_error = match &self.primary {
            Some(backend) => {
                let src = source.as_deref().unwrap_or("auto");
                match backend.translate(text, src, target_lang).await {
                    Ok(translated) => {
                        return TranslationOutcome {
                            text: translated.text,
                            source_lang: source,
                            target_lang: target_lang.to_string(),
                            confidence: translated.confidence.clamp(0.0, 1.0),
                            error: None,
                        };
                    }
                    Err(e) => {
                        warn!(
                            "Primary translation failed ({}->{}) via {}: {}",
                            src,
                            target_lang,
                            backend.backend_name(),
                            e
                        );
                        e.to_string()
                    }
                }
            }
            None => "no primary translation backend configured".to_string(),
        };

        // Model fallback only covers English source text.
        if source.as_deref().unwrap_or("en") == "en" {
            if let Some(text_out) = self.try_model_fallback(text, target_lang).await {
                return TranslationOutcome {
                    text: text_out,
                    source_lang: Some(source.unwrap_or_else(|| "en".to_string())),
                    target_lang: target_lang.to_string(),
                    confidence: FALLBACK_CONFIDENCE,
                    error: None,
                };
            }
        }

        TranslationOutcome {
            text: text.to_string(),
            source_lang: source,
            target_lang: target_lang.to_string(),
            confidence: 0.0,
            error: Some(primary_error),
        }
    }

    /// Chunked translation through the per-language model backend. Returns
    /// None when no backend is registered, the backend is memoized as
    /// broken, or any chunk fails.
    async fn try_model_fallback(&self, text: &str, target_lang: &str) -> Option<String> {
        let backend = self.fallbacks.get(target_lang)?;
        {
            let failed = self.failed_fallbacks.lock().await;
            if failed.contains(target_lang) {
                debug!("Skipping known-broken fallback model for {}", target_lang);
                return None;
            }
        }

        info!(
            "Falling back to model translation for en->{} via {}",
            target_lang,
            backend.backend_name()
        );
        let mut pieces = Vec::new();
        for chunk in chunk_text(text, MAX_CHUNK_CHARS) {
            match backend.translate(&chunk, "en", target_lang).await {
                Ok(translated) => pieces.push(translated.text),
                Err(e) => {
                    warn!("Model fallback failed for en->{}: {}", target_lang, e);
                    self.failed_fallbacks
                        .lock()
                        .await
                        .insert(target_lang.to_string());
                    return None;
                }
            }
        }
        Some(pieces.join(" "))
    }

    /// Produce per-target-language variants of an article's title and
    /// description. Combined confidence per language is the minimum of the
    /// title and description confidences.
    pub async fn translate_article(
        &self,
        article: &RawArticle,
        target_languages: &[String],
    ) -> (Option<String>, BTreeMap<String, Translation>) {
        let combined = format!("{} {}", article.title, article.description);
        let source_lang = self.detect_language(&combined).await;

        let mut translations = BTreeMap::new();
        for lang in target_languages {
            if source_lang.as_deref() == Some(lang.as_str()) {
                translations.insert(
                    lang.clone(),
                    Translation {
                        title: article.title.clone(),
                        description: article.description.clone(),
                        summary: None,
                        source_lang: source_lang.clone(),
                        target_lang: lang.clone(),
                        confidence: 1.0,
                    },
                );
                continue;
            }

            let title_out = self
                .translate_text(&article.title, lang, source_lang.as_deref())
                .await;
            let desc_out = self
                .translate_text(&article.description, lang, source_lang.as_deref())
                .await;

            translations.insert(
                lang.clone(),
                Translation {
                    title: title_out.text,
                    description: desc_out.text,
                    summary: None,
                    source_lang: source_lang.clone(),
                    target_lang: lang.clone(),
                    confidence: title_out.confidence.min(desc_out.confidence),
                },
            );
        }

        (source_lang, translations)
    }

    /// Translate an already-computed English summary into each non-English
    /// target. A failure on one language degrades that language only.
    pub async fn translate_summary(
        &self,
        summary: &str,
        target_languages: &[String],
    ) -> BTreeMap<String, String> {
        let mut summaries = BTreeMap::new();
        for lang in target_languages {
            if lang == "en" {
                continue;
            }
            let outcome = self.translate_text(summary, lang, Some("en")).await;
            summaries.insert(lang.clone(), outcome.text);
        }
        summaries
    }
}

impl Default for ArticleTranslator {
    fn default() -> Self {
        Self::new()
    }
}
