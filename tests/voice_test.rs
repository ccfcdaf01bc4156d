mod common;

use common::{raw_article, WritingSpeech};
use hyperlocal_news::types::{EnrichedArticle, Translation};
use hyperlocal_news::VoiceSynthesizer;
use std::sync::Arc;

fn translated_article() -> EnrichedArticle {
    let mut article = EnrichedArticle::from_raw(raw_article(
        "Bridge repairs begin",
        "https://example.com/bridge",
        "2024-04-01",
    ));
    article.detected_language = Some("en".to_string());
    article.translations.insert(
        "hi".to_string(),
        Translation {
            title: "hi title text".to_string(),
            description: "hi description text".to_string(),
            summary: None,
            source_lang: Some("en".to_string()),
            target_lang: "hi".to_string(),
            confidence: 0.7,
        },
    );
    article
}

#[test]
fn filenames_are_content_addressed() {
    let a = VoiceSynthesizer::audio_filename("same narration text", "hi");
    let b = VoiceSynthesizer::audio_filename("same narration text", "hi");
    let other_lang = VoiceSynthesizer::audio_filename("same narration text", "mr");
    let other_text = VoiceSynthesizer::audio_filename("different narration text", "hi");

    assert_eq!(a, b);
    assert!(a.starts_with("summary_hi_"));
    assert!(a.ends_with(".mp3"));
    assert_ne!(a, other_lang);
    assert_ne!(a, other_text);
}

#[tokio::test]
async fn narration_writes_one_file_per_language() {
    let dir = std::env::temp_dir().join(format!("voice_test_{}", std::process::id()));
    let voice = VoiceSynthesizer::new(&dir).with_backend(Arc::new(WritingSpeech));

    let mut article = translated_article();
    let languages = vec!["en".to_string(), "hi".to_string()];
    voice
        .generate_multilingual_audio(&mut article, &languages, false)
        .await;

    assert_eq!(article.audio_files.len(), 2);
    // English has no translation entry but matches the detected language, so
    // the original text is narrated.
    let en_path = &article.audio_files["en"];
    let narrated = std::fs::read_to_string(en_path).unwrap();
    assert!(narrated.contains("Bridge repairs begin"));

    let hi_narrated = std::fs::read_to_string(&article.audio_files["hi"]).unwrap();
    assert!(hi_narrated.contains("hi title text"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn skip_flag_clears_and_suppresses_narration() {
    let voice = VoiceSynthesizer::new(std::env::temp_dir()).with_backend(Arc::new(WritingSpeech));

    let mut article = translated_article();
    article
        .audio_files
        .insert("stale".to_string(), "old.mp3".into());

    voice
        .generate_multilingual_audio(&mut article, &["en".to_string()], true)
        .await;
    assert!(article.audio_files.is_empty());
}

#[tokio::test]
async fn short_or_missing_text_produces_no_audio() {
    let voice = VoiceSynthesizer::new(std::env::temp_dir()).with_backend(Arc::new(WritingSpeech));
    assert!(voice.generate_audio("tiny", "en").await.is_none());

    // No backend configured: the stage is silently skipped.
    let silent = VoiceSynthesizer::new(std::env::temp_dir());
    assert!(silent
        .generate_audio("plenty of narratable text here", "en")
        .await
        .is_none());
}
