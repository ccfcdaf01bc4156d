use clap::Parser;
use hyperlocal_news::geo::NominatimBackend;
use hyperlocal_news::workflow::BatchOptions;
use hyperlocal_news::{FeedConfig, FeedType, GeoTagger, NewsPipeline, VoiceSynthesizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Hyperlocal news enrichment pipeline: collect configured feeds, enrich
/// each article and print the results as JSON.
#[derive(Debug, Parser)]
#[command(name = "hyperlocal-news", version)]
struct Cli {
    /// JSON file with feed configurations; defaults to a built-in set.
    #[arg(long)]
    feeds: Option<PathBuf>,

    /// Maximum articles collected per feed.
    #[arg(long, default_value_t = 5)]
    limit_per_feed: usize,

    /// Global cap on the processed batch.
    #[arg(long)]
    max_total: Option<usize>,

    /// Skip this many articles from the front of the deduped batch.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Use deterministic heuristics only: no models, no network geocoding,
    /// no narration.
    #[arg(long)]
    fast: bool,

    /// Target languages for translation and narration.
    #[arg(long, value_delimiter = ',', default_value = "en,mr,hi")]
    languages: Vec<String>,

    /// Clear the cross-run seen set before this batch.
    #[arg(long)]
    reset_seen: bool,

    /// Directory for synthesized audio files.
    #[arg(long, default_value = "audio_output")]
    audio_dir: PathBuf,

    /// Print aggregate stats instead of the full article list.
    #[arg(long)]
    stats: bool,
}

fn default_feed_configs() -> Vec<FeedConfig> {
    vec![
        FeedConfig {
            feed_type: FeedType::Rss,
            url: "https://timesofindia.indiatimes.com/rssfeeds/-2128833038.cms".to_string(),
            name: "Times of India Nagpur".to_string(),
            api_key: None,
        },
        FeedConfig {
            feed_type: FeedType::Rss,
            url: "https://www.thehindu.com/news/national/feeder/default.rss".to_string(),
            name: "The Hindu - National".to_string(),
            api_key: None,
        },
        FeedConfig {
            feed_type: FeedType::Rss,
            url: "https://zeenews.india.com/rss/india-news.xml".to_string(),
            name: "Zee News - India".to_string(),
            api_key: None,
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let feed_configs = match &cli.feeds {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<FeedConfig>>(&raw)?
        }
        None => default_feed_configs(),
    };

    let mut geo_tagger = GeoTagger::new();
    if !cli.fast {
        geo_tagger = geo_tagger.with_backend(Arc::new(NominatimBackend::new()));
    }

    let pipeline = NewsPipeline::builder()
        .target_languages(cli.languages.clone())
        .fast_mode(cli.fast)
        .geo_tagger(geo_tagger)
        .voice(VoiceSynthesizer::new(cli.audio_dir.clone()))
        .build();

    let options = BatchOptions {
        limit_per_feed: cli.limit_per_feed,
        max_total: cli.max_total,
        offset: cli.offset,
        reset_seen: cli.reset_seen,
        publishing_status: Some("Published to Community Portal".to_string()),
    };

    let articles = pipeline.process_feeds(&feed_configs, &options).await?;
    info!("Processed {} articles", articles.len());

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&pipeline.stats().await)?);
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "count": articles.len(),
                "articles": articles,
            }))?
        );
    }

    Ok(())
}
