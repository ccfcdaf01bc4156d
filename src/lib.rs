pub mod types;
pub mod utils;
pub mod collector;
pub mod dedupe;
pub mod translator;
pub mod lazy;
pub mod nlp;
pub mod geo;
pub mod voice;
pub mod enrich;
pub mod state;
pub mod workflow;

pub use types::*;
pub use collector::{ContentFetcher, FeedIngestor};
pub use dedupe::{order_and_dedupe, DedupeStore};
pub use translator::{ArticleTranslator, LanguageDetector, TranslationBackend};
pub use lazy::LazyBackend;
pub use nlp::{NerBackend, NlpProcessor, ProcessingMode, SummaryBackend};
pub use geo::{GeoTagger, GeocodeBackend, NominatimBackend};
pub use voice::{SpeechBackend, VoiceSynthesizer};
pub use state::{ArticleStore, StoreStats};
pub use workflow::{NewsPipeline, PipelineBuilder};
