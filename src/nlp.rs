use crate::lazy::LazyBackend;
use crate::types::{EnrichedArticle, NamedEntities, Result, SummaryMetadata};
use crate::utils::{boilerplate_hits, estimate_tokens, lead_sentences, split_sentences};
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Inputs below this trimmed length skip summarization and entity
/// extraction entirely.
const MIN_PROCESSABLE_CHARS: usize = 50;
/// Substantial raw content beats translated title+description as the
/// summarization input.
const MIN_RAW_CONTENT_CHARS: usize = 200;
/// Safe input budget for the summarization model.
const MAX_INPUT_TOKENS: usize = 512;
/// Boilerplate phrase hits at or above this count mean the text is mostly
/// navigation and the model is not worth invoking.
const BOILERPLATE_THRESHOLD: usize = 3;

#[derive(Debug, Clone)]
pub struct NerSpan {
    pub label: String,
    pub text: String,
}

/// Abstractive summarization model. May fail; the processor catches and
/// falls back to extractive output.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, text: &str, min_len: usize, max_len: usize) -> Result<String>;
}

/// Named-entity recognition model, emitting raw labeled spans.
#[async_trait]
pub trait NerBackend: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<NerSpan>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Deterministic lead-sentence extraction, no model invocation.
    Fast,
    /// Model-based abstractive summarization with extractive fallbacks.
    Full,
}

#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub summary: String,
    pub metadata: SummaryMetadata,
}

impl SummaryResult {
    fn empty(error: Option<String>) -> Self {
        Self {
            summary: String::new(),
            metadata: SummaryMetadata {
                error,
                ..SummaryMetadata::default()
            },
        }
    }

    fn measured(summary: String, original_length: usize) -> Self {
        let ratio = if original_length > 0 {
            summary.len() as f32 / original_length as f32
        } else {
            0.0
        };
        Self {
            metadata: SummaryMetadata {
                original_length,
                summary_length: summary.len(),
                compression_ratio: ratio,
                warning: None,
                error: None,
            },
            summary,
        }
    }
}

/// Summarization and entity extraction over article text.
pub struct NlpProcessor {
    mode: ProcessingMode,
    summarizer: LazyBackend<dyn SummaryBackend>,
    ner: LazyBackend<dyn NerBackend>,
    max_length: usize,
    min_length: usize,
}

impl NlpProcessor {
    pub fn new(
        mode: ProcessingMode,
        summarizer: LazyBackend<dyn SummaryBackend>,
        ner: LazyBackend<dyn NerBackend>,
    ) -> Self {
        Self {
            mode,
            summarizer,
            ner,
            max_length: 200,
            min_length: 80,
        }
    }

    /// A processor with no model backends at all; every summary takes the
    /// extractive path and entity maps come back empty.
    pub fn without_backends(mode: ProcessingMode) -> Self {
        Self::new(
            mode,
            LazyBackend::unavailable("summarizer"),
            LazyBackend::unavailable("ner"),
        )
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Generate a bounded-length summary with per-mode policy. Never fails;
    /// degraded paths are reported through the metadata fields.
    pub async fn summarize_text(&self, text: &str) -> SummaryResult {
        if self.mode == ProcessingMode::Fast {
            let sentences = split_sentences(text);
            // Scale lead-sentence count with input length, between 6 and 10.
            let count = (sentences.len() / 2).clamp(6, 10);
            let lead = lead_sentences(text, count);
            return SummaryResult::measured(lead, text.len());
        }

        if text.trim().is_empty() {
            return SummaryResult::empty(None);
        }

        if boilerplate_hits(text) >= BOILERPLATE_THRESHOLD {
            warn!("Text appears to be mostly navigation content, using fallback");
            let substantial: Vec<&str> = split_sentences(text)
                .into_iter()
                .filter(|s| s.len() > 20)
                .take(3)
                .collect();
            if substantial.is_empty() {
                let mut result = SummaryResult::empty(Some(
                    "Text quality too poor for summarization".to_string(),
                ));
                result.metadata.original_length = text.len();
                return result;
            }
            let summary = format!("{}.", substantial.join(". "));
            let mut result = SummaryResult::measured(summary, text.len());
            result.metadata.warning =
                Some("Navigation text detected, used extractive summary".to_string());
            return result;
        }

        // Truncate to the model's input budget, never mid-char.
        let text = if estimate_tokens(text) > MAX_INPUT_TOKENS {
            text.chars().take(MAX_INPUT_TOKENS * 4).collect::<String>()
        } else {
            text.to_string()
        };
        let input_tokens = estimate_tokens(&text);
        let (min_len, max_len) = self.length_bounds(input_tokens);

        match self.summarizer.get().await {
            Some(backend) => match backend.summarize(&text, min_len, max_len).await {
                Ok(summary) => SummaryResult::measured(summary, text.len()),
                Err(e) => {
                    error!("Error summarizing text: {}", e);
                    self.extractive_fallback(&text, Some(e.to_string()))
                }
            },
            None => self.extractive_fallback(
                &text,
                Some("summarization backend unavailable".to_string()),
            ),
        }
    }

    /// Dynamic min/max summary bounds: shorter inputs get a higher length
    /// ratio, longer inputs a lower one, with hard caps, and max always
    /// strictly below the input length.
    fn length_bounds(&self, input_tokens: usize) -> (usize, usize) {
        let (mut max_len, mut min_len) = if input_tokens < 150 {
            (
                self.max_length.min((input_tokens * 8 / 10).max(50)),
                self.min_length.min((input_tokens * 4 / 10).max(30)),
            )
        } else if input_tokens < 300 {
            (
                self.max_length.max(120).min((input_tokens * 3 / 4).min(250)),
                self.min_length.max((input_tokens * 3 / 10).min(60)),
            )
        } else {
            (
                self.max_length.max(150).min((input_tokens * 7 / 10).min(400)),
                self.min_length.max((input_tokens / 4).min(80)),
            )
        };

        max_len = max_len.min(input_tokens.saturating_sub(5).max(50));
        min_len = min_len.min(max_len.saturating_sub(30).max(30));
        (min_len, max_len)
    }

    /// First sentences of the input, truncated to the original max-length
    /// budget, with the failure recorded but not propagated.
    fn extractive_fallback(&self, text: &str, error: Option<String>) -> SummaryResult {
        let fallback = lead_sentences(text, 8);
        let budget = self.max_length * 10;
        let summary: String = fallback.chars().take(budget).collect();
        let mut result = SummaryResult::measured(summary, text.len());
        result.metadata.error = error;
        result
    }

    /// Run NER over the text. An unavailable or failing backend yields an
    /// empty entity map rather than an error.
    pub async fn extract_entities(&self, text: &str) -> NamedEntities {
        let mut entities = NamedEntities::default();
        let backend = match self.ner.get().await {
            Some(b) => b,
            None => {
                warn!("NER backend not available");
                return entities;
            }
        };

        match backend.extract(text).await {
            Ok(spans) => {
                for span in spans {
                    entities.push_span(&span.label, span.text);
                }
                entities.dedup_preserving_order();
            }
            Err(e) => error!("Error extracting entities: {}", e),
        }
        entities
    }

    /// Summarize and extract entities for an article, choosing input text in
    /// priority order: substantial raw content, target-language translation,
    /// original title+description.
    pub async fn process_article(&self, article: &mut EnrichedArticle, target_language: &str) {
        let text = if article.article.raw_content.trim().len() > MIN_RAW_CONTENT_CHARS {
            debug!("Using raw_content for summarization");
            article.article.raw_content.trim().to_string()
        } else if let Some(trans) = article.translations.get(target_language) {
            debug!("Using translated content ({}) for summarization", target_language);
            format!("{} {}", trans.title, trans.description).trim().to_string()
        } else {
            debug!("Using original article content for summarization");
            format!("{} {}", article.article.title, article.article.description)
                .trim()
                .to_string()
        };

        if text.trim().len() < MIN_PROCESSABLE_CHARS {
            warn!("Text too short or empty for summarization");
            article.ai_summary = String::new();
            article.summary_metadata = SummaryMetadata {
                error: Some("Text too short".to_string()),
                ..SummaryMetadata::default()
            };
            article.named_entities = NamedEntities::default();
            return;
        }

        let result = self.summarize_text(&text).await;
        article.ai_summary = result.summary;
        article.summary_metadata = result.metadata;
        article.named_entities = self.extract_entities(&text).await;
    }
}
