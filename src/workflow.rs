use crate::collector::FeedIngestor;
use crate::dedupe::order_and_dedupe;
use crate::enrich::enrich_article;
use crate::geo::GeoTagger;
use crate::nlp::{NlpProcessor, ProcessingMode};
use crate::state::{ArticleStore, StoreStats};
use crate::translator::ArticleTranslator;
use crate::types::{EnrichedArticle, FeedConfig, PipelineError, RawArticle, Result};
use crate::utils::smart_truncate;
use crate::voice::VoiceSynthesizer;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Per-batch knobs mirroring the pipeline input contract.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub limit_per_feed: usize,
    pub max_total: Option<usize>,
    pub offset: usize,
    /// Clear the cross-run seen-set before this batch.
    pub reset_seen: bool,
    /// Stamped on every article that completes the pipeline.
    pub publishing_status: Option<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            limit_per_feed: 5,
            max_total: None,
            offset: 0,
            reset_seen: false,
            publishing_status: None,
        }
    }
}

/// Orchestrates the full enrichment pipeline: collect, dedupe/order, then
/// per article translate, summarize/extract, geotag, narrate and enrich.
pub struct NewsPipeline {
    ingestor: FeedIngestor,
    translator: ArticleTranslator,
    nlp: NlpProcessor,
    geo_tagger: GeoTagger,
    voice: VoiceSynthesizer,
    store: Arc<RwLock<ArticleStore>>,
    target_languages: Vec<String>,
    fast_mode: bool,
}

impl NewsPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn target_languages(&self) -> &[String] {
        &self.target_languages
    }

    pub fn store(&self) -> Arc<RwLock<ArticleStore>> {
        self.store.clone()
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.read().await.stats()
    }

    pub async fn get_article(&self, index: usize) -> Option<EnrichedArticle> {
        self.store.read().await.get(index).cloned()
    }

    /// Run one article through every stage. Stage failures degrade fields
    /// instead of propagating; an `Err` here means the article as a whole
    /// could not be processed and will be dropped from the batch.
    pub async fn process_single_article(&self, raw: RawArticle) -> Result<EnrichedArticle> {
        if raw.title.trim().is_empty()
            && raw.description.trim().is_empty()
            && raw.raw_content.trim().is_empty()
        {
            return Err(PipelineError::EmptyArticle);
        }
        info!("Processing article: {}", smart_truncate(&raw.title, 50));

        let mut article = EnrichedArticle::from_raw(raw);

        let (detected, translations) = self
            .translator
            .translate_article(&article.article, &self.target_languages)
            .await;
        article.detected_language = detected;
        article.translations = translations;

        // NLP runs over English for better model results.
        self.nlp.process_article(&mut article, "en").await;

        self.attach_summary_translations(&mut article).await;

        self.geo_tagger
            .tag_article(&mut article, self.fast_mode)
            .await;

        self.voice
            .generate_multilingual_audio(&mut article, &self.target_languages, self.fast_mode)
            .await;

        enrich_article(&mut article);
        article.processed_at = Utc::now();
        Ok(article)
    }

    /// Store the English summary under its translation entry and fan it out
    /// to every other target language. Per-language translation failures are
    /// swallowed; translation keys stay within the requested target set.
    async fn attach_summary_translations(&self, article: &mut EnrichedArticle) {
        if article.ai_summary.is_empty() {
            return;
        }
        let summary = article.ai_summary.clone();

        if let Some(trans) = article.translations.get_mut("en") {
            trans.summary = Some(summary.clone());
        }

        let translated = self
            .translator
            .translate_summary(&summary, &self.target_languages)
            .await;
        for (lang, text) in translated {
            if let Some(trans) = article.translations.get_mut(&lang) {
                trans.summary = Some(text);
            }
        }
    }

    /// Collect all feeds, then hand the raw batch to `process_batch`.
    ///
    /// Fatal surfaces: malformed feed configuration (empty or unparseable
    /// URL) and an entirely empty collection.
    pub async fn process_feeds(
        &self,
        configs: &[FeedConfig],
        options: &BatchOptions,
    ) -> Result<Vec<EnrichedArticle>> {
        for config in configs {
            if config.url.trim().is_empty() {
                return Err(PipelineError::InvalidConfig(format!(
                    "feed '{}' has no URL",
                    config.name
                )));
            }
            url::Url::parse(config.url.trim())?;
        }

        info!("Starting workflow with {} feeds", configs.len());
        let raw_articles = self
            .ingestor
            .collect_multiple_feeds(configs, options.limit_per_feed)
            .await;
        info!("Collected {} raw articles", raw_articles.len());

        self.process_batch(raw_articles, options).await
    }

    /// Dedupe/order/window a collected batch, process the filtered list
    /// article by article, and replace the store's cache.
    ///
    /// One bad article never fails the batch; its key is simply not marked
    /// seen, so it stays eligible for a later run.
    pub async fn process_batch(
        &self,
        raw_articles: Vec<RawArticle>,
        options: &BatchOptions,
    ) -> Result<Vec<EnrichedArticle>> {
        if options.reset_seen {
            self.store.write().await.reset_seen();
        }

        if raw_articles.is_empty() {
            return Err(PipelineError::NoArticles);
        }

        let seen = self.store.read().await.seen().clone();
        let batch = order_and_dedupe(raw_articles, &seen, options.offset, options.max_total);

        let mut processed = Vec::new();
        let total = batch.len();
        for (i, raw) in batch.into_iter().enumerate() {
            let key = raw.identity_key();
            match self.process_single_article(raw).await {
                Ok(mut article) => {
                    if let Some(status) = &options.publishing_status {
                        article.publishing_status = status.clone();
                    }
                    processed.push(article);
                    // Mark seen only after the full pipeline succeeded so a
                    // dropped article can be retried on a later run.
                    self.store.write().await.mark_seen(key);
                    info!("Processed article {}/{}", i + 1, total);
                }
                Err(e) => {
                    error!("Error processing article {}/{}: {}", i + 1, total, e);
                    continue;
                }
            }
        }

        info!("Workflow complete: {} articles processed", processed.len());
        self.store.write().await.replace(processed.clone());
        Ok(processed)
    }
}

/// Builder wiring stages, target languages and the fast-mode switch.
pub struct PipelineBuilder {
    ingestor: Option<FeedIngestor>,
    translator: Option<ArticleTranslator>,
    nlp: Option<NlpProcessor>,
    geo_tagger: Option<GeoTagger>,
    voice: Option<VoiceSynthesizer>,
    target_languages: Vec<String>,
    fast_mode: bool,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            ingestor: None,
            translator: None,
            nlp: None,
            geo_tagger: None,
            voice: None,
            target_languages: vec!["en".to_string(), "mr".to_string(), "hi".to_string()],
            fast_mode: false,
        }
    }

    pub fn target_languages(mut self, languages: Vec<String>) -> Self {
        self.target_languages = languages;
        self
    }

    /// Swap model-based stages for deterministic heuristics and disable
    /// network geocoding fallback and narration.
    pub fn fast_mode(mut self, fast: bool) -> Self {
        self.fast_mode = fast;
        self
    }

    pub fn ingestor(mut self, ingestor: FeedIngestor) -> Self {
        self.ingestor = Some(ingestor);
        self
    }

    pub fn translator(mut self, translator: ArticleTranslator) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn nlp(mut self, nlp: NlpProcessor) -> Self {
        self.nlp = Some(nlp);
        self
    }

    pub fn geo_tagger(mut self, geo_tagger: GeoTagger) -> Self {
        self.geo_tagger = Some(geo_tagger);
        self
    }

    pub fn voice(mut self, voice: VoiceSynthesizer) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn build(self) -> NewsPipeline {
        let mode = if self.fast_mode {
            ProcessingMode::Fast
        } else {
            ProcessingMode::Full
        };
        NewsPipeline {
            ingestor: self.ingestor.unwrap_or_default(),
            translator: self.translator.unwrap_or_default(),
            nlp: self
                .nlp
                .unwrap_or_else(|| NlpProcessor::without_backends(mode)),
            geo_tagger: self.geo_tagger.unwrap_or_default(),
            voice: self
                .voice
                .unwrap_or_else(|| VoiceSynthesizer::new("audio_output")),
            store: Arc::new(RwLock::new(ArticleStore::new())),
            target_languages: self.target_languages,
            fast_mode: self.fast_mode,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
