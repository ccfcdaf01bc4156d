use crate::types::{EnrichedArticle, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Texts shorter than this are not worth narrating.
const MIN_NARRATABLE_LEN: usize = 10;

/// Text-to-speech service writing synthesized audio to the given path.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str, path: &Path) -> Result<()>;
}

/// Renders per-language audio narrations of article text.
pub struct VoiceSynthesizer {
    backend: Option<Arc<dyn SpeechBackend>>,
    output_dir: PathBuf,
}

impl VoiceSynthesizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: None,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn SpeechBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Content-addressed filename so repeated synthesis of the same text and
    /// language is idempotent.
    pub fn audio_filename(text: &str, lang: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(lang.as_bytes());
        let digest = hasher.finalize();
        let hash: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("summary_{}_{}.mp3", lang, &hash[..8])
    }

    /// Synthesize one audio file. Returns None (and logs) on any failure;
    /// narration never fails the pipeline.
    pub async fn generate_audio(&self, text: &str, lang: &str) -> Option<PathBuf> {
        if text.trim().len() < MIN_NARRATABLE_LEN {
            warn!("Text too short for audio generation");
            return None;
        }
        let backend = match &self.backend {
            Some(b) => b,
            None => {
                debug!("No speech backend configured, skipping narration");
                return None;
            }
        };

        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            error!("Could not create audio output dir: {}", e);
            return None;
        }
        let path = self.output_dir.join(Self::audio_filename(text, lang));

        match backend.synthesize(text, lang, &path).await {
            Ok(()) => {
                info!("Generated audio file: {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("Error generating audio for {}: {}", lang, e);
                None
            }
        }
    }

    /// Narrate an article in every requested language. Text priority per
    /// language: its translation, the original when the detected language
    /// matches, else the summary. `skip` short-circuits the whole stage.
    pub async fn generate_multilingual_audio(
        &self,
        article: &mut EnrichedArticle,
        languages: &[String],
        skip: bool,
    ) {
        article.audio_files.clear();
        if skip {
            return;
        }

        for lang in languages {
            let text = if let Some(trans) = article.translations.get(lang) {
                format!("{} {}", trans.title, trans.description)
            } else if article.detected_language.as_deref() == Some(lang.as_str()) {
                format!("{} {}", article.article.title, article.article.description)
            } else {
                article.ai_summary.clone()
            };

            if text.trim().is_empty() {
                continue;
            }
            if let Some(path) = self.generate_audio(&text, lang).await {
                article.audio_files.insert(lang.clone(), path);
            }
        }
    }
}
