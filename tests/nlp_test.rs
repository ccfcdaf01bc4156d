mod common;

use common::{raw_article, FailingSummarizer, FixedNer, FixedSummarizer};
use hyperlocal_news::lazy::LazyBackend;
use hyperlocal_news::types::EnrichedArticle;
use hyperlocal_news::{NerBackend, NlpProcessor, ProcessingMode, SummaryBackend};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn full_processor(
    summarizer: Arc<dyn SummaryBackend>,
    ner: Arc<dyn NerBackend>,
) -> NlpProcessor {
    NlpProcessor::new(
        ProcessingMode::Full,
        LazyBackend::preset("summarizer", summarizer),
        LazyBackend::preset("ner", ner),
    )
}

#[tokio::test]
async fn fast_mode_never_touches_the_model() {
    let summarizer = Arc::new(FixedSummarizer::new("model summary"));
    let nlp = NlpProcessor::new(
        ProcessingMode::Fast,
        LazyBackend::preset("summarizer", summarizer.clone() as Arc<dyn SummaryBackend>),
        LazyBackend::unavailable("ner"),
    );

    let text = "First sentence about roadworks. Second sentence about the budget. \
                Third sentence about a deadline. Fourth sentence about residents.";
    let result = nlp.summarize_text(text).await;

    assert!(!result.summary.is_empty());
    assert_ne!(result.summary, "model summary");
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn short_text_skips_summarization_and_entities() {
    let summarizer = Arc::new(FixedSummarizer::new("model summary"));
    let nlp = full_processor(
        summarizer.clone(),
        Arc::new(FixedNer::new(&[("GPE", "Nagpur")])),
    );

    let mut short = raw_article("Hi", "a", "2024-01-01");
    short.description = "x".to_string();
    let mut article = EnrichedArticle::from_raw(short);

    nlp.process_article(&mut article, "en").await;

    assert!(article.ai_summary.is_empty());
    assert_eq!(article.summary_metadata.error.as_deref(), Some("Text too short"));
    assert!(article.named_entities.is_empty());
    assert_eq!(summarizer.call_count(), 0);
}

#[tokio::test]
async fn summary_bounds_scale_with_input_length() {
    let summarizer = Arc::new(FixedSummarizer::new("A tight civic news summary."));
    let nlp = full_processor(summarizer.clone(), Arc::new(FixedNer::new(&[])));

    // 402 chars, roughly 100 tokens, the short-input tier.
    let text = "Nagpur civic body approves the annual budget for road maintenance. ".repeat(6);
    let result = nlp.summarize_text(&text).await;

    assert_eq!(result.summary, "A tight civic news summary.");
    assert_eq!(summarizer.last_bounds(), Some((40, 80)));
    assert_eq!(result.metadata.original_length, text.len());
    assert_eq!(result.metadata.summary_length, result.summary.len());
    assert!(result.metadata.compression_ratio > 0.0);
}

#[tokio::test]
async fn model_failure_degrades_to_extractive_summary() {
    let nlp = full_processor(Arc::new(FailingSummarizer), Arc::new(FixedNer::new(&[])));

    let text = "The corporation sanctioned repairs for twelve arterial roads. \
                Work begins next week across three zones. \
                Contractors face a ninety day deadline.";
    let result = nlp.summarize_text(text).await;

    assert!(result.summary.contains("The corporation sanctioned repairs"));
    assert!(result
        .metadata
        .error
        .as_deref()
        .unwrap()
        .contains("model inference failed"));
}

#[tokio::test]
async fn missing_backend_still_produces_a_summary() {
    let nlp = NlpProcessor::without_backends(ProcessingMode::Full);

    let text = "A new flyover opened to traffic on Wednesday after two years of construction. \
                Officials expect it to cut commute times along the eastern corridor.";
    let result = nlp.summarize_text(text).await;

    assert!(!result.summary.is_empty());
    assert_eq!(
        result.metadata.error.as_deref(),
        Some("summarization backend unavailable")
    );
}

#[tokio::test]
async fn navigation_heavy_text_bypasses_the_model() {
    let summarizer = Arc::new(FixedSummarizer::new("model summary"));
    let nlp = full_processor(summarizer.clone(), Arc::new(FixedNer::new(&[])));

    let text = "Subscribe to our newsletter today. Login to continue reading this piece. \
                The municipal corporation approved the new flyover project yesterday evening.";
    let result = nlp.summarize_text(text).await;

    assert_eq!(summarizer.call_count(), 0);
    assert!(result.summary.contains("municipal corporation"));
    assert_eq!(
        result.metadata.warning.as_deref(),
        Some("Navigation text detected, used extractive summary")
    );
}

#[tokio::test]
async fn entity_labels_are_grouped_and_deduplicated() {
    let ner = FixedNer::new(&[
        ("GPE", "Nagpur"),
        ("GPE", "Nagpur"),
        ("ORG", "NMC"),
        ("ORGANIZATION", "Metro Rail"),
        ("WIDGET", "Unclassified Thing"),
    ]);
    let nlp = full_processor(Arc::new(FixedSummarizer::new("s")), Arc::new(ner));

    let entities = nlp
        .extract_entities("Enough text for the extraction call to run over.")
        .await;

    assert_eq!(entities.gpe, vec!["Nagpur"]);
    assert_eq!(entities.org, vec!["NMC", "Metro Rail"]);
    assert_eq!(entities.misc, vec!["Unclassified Thing"]);
    assert!(entities.person.is_empty());
}

#[tokio::test]
async fn failed_lazy_initialization_is_not_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let lazy: LazyBackend<dyn SummaryBackend> = LazyBackend::new("broken", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(hyperlocal_news::types::PipelineError::Backend(
            "model weights missing".to_string(),
        ))
    });

    assert!(lazy.get().await.is_none());
    assert!(lazy.get().await.is_none());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
