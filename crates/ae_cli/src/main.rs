mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use ae_core::{Article, DocumentChannel, Result};
use ae_retry::{read_document, write_document, RetryObserver, RetryPolicy, TracingObserver};
use ae_storage::{FailureOdds, Fate, RandomFate, UnreliableChannel};

use pipeline::{EnrichmentPipeline, Keys, RunOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Enrich an article with a similarity annotation over an unreliable channel", long_about = None)]
struct Cli {
    /// Channel backend holding the documents
    #[arg(long, default_value = "fs", help = "Channel backend. Available backends: fs (default), memory")]
    channel: String,
    /// Root directory for the fs backend
    #[arg(long, default_value = ".ae-data")]
    data_dir: PathBuf,
    #[arg(long, default_value = "dummy", help = "Similarity model. Available models: dummy (default), deepseek")]
    model: String,
    /// API key for the reasoning service; falls back to DEEPSEEK_API_KEY
    #[arg(long)]
    api_key: Option<String>,
    /// Override the reasoning service base URL
    #[arg(long)]
    model_url: Option<String>,
    /// Attempt budget per retried operation
    #[arg(long, default_value_t = 5)]
    attempts: u32,
    /// Backoff base delay in milliseconds
    #[arg(long, default_value_t = 1000)]
    base_delay_ms: u64,
    /// Per-attempt timeout in milliseconds; stalls are waited out when unset
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Probability a channel call fails outright
    #[arg(long, default_value_t = 0.2)]
    fail_p: f64,
    /// Probability a channel call stalls before completing
    #[arg(long, default_value_t = 0.1)]
    stall_p: f64,
    /// Probability a channel call truncates its payload
    #[arg(long, default_value_t = 0.2)]
    truncate_p: f64,
    /// Injected stall duration in milliseconds
    #[arg(long, default_value_t = 60_000)]
    stall_ms: u64,
    /// Seed for the failure-mode RNG, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Skip the verifying read-back after each write
    #[arg(long)]
    no_verify_writes: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the enrichment workflow
    Enrich {
        #[arg(long, default_value = "articles/input.json")]
        article_key: String,
        #[arg(long, default_value = "articles/corpus.json")]
        corpus_key: String,
        /// Output key; also read back as the previous run's output
        #[arg(long, default_value = "runs/enriched.json")]
        output_key: String,
        #[arg(long, default_value = "runs/enriched.diff.json")]
        diff_key: String,
    },
    /// Copy a local JSON file onto the channel
    Put {
        #[arg(long)]
        key: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Probe the channel with a verified write/read round trip
    Check,
}

async fn check_channel(
    channel: &dyn DocumentChannel,
    policy: &RetryPolicy,
    observer: &dyn RetryObserver,
) -> Result<()> {
    let probe = Article {
        title: "Channel probe".to_string(),
        summary: "Health-check document".to_string(),
        category: "probe".to_string(),
        takeaways: vec!["round trip".to_string()],
    };
    write_document(policy, observer, channel, "health/probe.json", &probe, true).await?;
    let back: Article = read_document(policy, observer, channel, "health/probe.json").await?;
    if back != probe {
        return Err(ae_core::Error::Validation(
            "probe document came back different".to_string(),
        ));
    }
    info!("🏦 Channel healthy");
    Ok(())
}

fn report(outcome: &RunOutcome) {
    match &outcome.enriched.similar_to.title {
        Some(title) => println!(
            "Most similar prior article: {} ({})",
            title, outcome.enriched.similar_to.reason
        ),
        None => println!(
            "No sufficiently similar prior article ({})",
            outcome.enriched.similar_to.reason
        ),
    }
    if outcome.first_run {
        println!("First run, nothing to diff against");
    } else if outcome.diff.is_empty() {
        println!("No changes since the previous run");
    } else {
        let fields: Vec<&str> = outcome.diff.changed.keys().map(|k| k.as_str()).collect();
        println!("Changed since the previous run: {}", fields.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let odds = FailureOdds::new(cli.fail_p, cli.stall_p, cli.truncate_p)?;
    let fate: Arc<dyn Fate> = match cli.seed {
        Some(seed) => Arc::new(RandomFate::seeded(odds, seed)),
        None => Arc::new(RandomFate::new(odds)),
    };
    let base = ae_storage::create_channel(&cli.channel, &cli.data_dir)?;
    let channel: Arc<dyn DocumentChannel> = Arc::new(UnreliableChannel::new(
        base,
        fate,
        Duration::from_millis(cli.stall_ms),
    ));
    info!(
        "💾 Channel initialized (backend {}, fail {:.0}%, stall {:.0}%, truncate {:.0}%)",
        cli.channel,
        cli.fail_p * 100.0,
        cli.stall_p * 100.0,
        cli.truncate_p * 100.0
    );

    let policy = RetryPolicy::new(cli.attempts, Duration::from_millis(cli.base_delay_ms))
        .with_timeout(cli.timeout_ms.map(Duration::from_millis));
    let observer: Arc<dyn RetryObserver> = Arc::new(TracingObserver);

    match cli.command {
        Commands::Check => {
            check_channel(channel.as_ref(), &policy, observer.as_ref()).await?;
        }
        Commands::Put { key, file } => {
            let bytes = std::fs::read(&file)?;
            let document: serde_json::Value = ae_core::codec::decode(&bytes)?;
            write_document(
                &policy,
                observer.as_ref(),
                channel.as_ref(),
                &key,
                &document,
                !cli.no_verify_writes,
            )
            .await?;
            info!("📦 Stored {} at {}", file.display(), key);
        }
        Commands::Enrich {
            article_key,
            corpus_key,
            output_key,
            diff_key,
        } => {
            let config = ae_inference::Config {
                api_key: cli
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok()),
                model_name: None,
                model_url: cli.model_url.clone(),
            };
            let model = ae_inference::create_model(&cli.model, Some(config)).await?;
            info!("🧠 Similarity model initialized (using {})", model.name());

            let pipeline = EnrichmentPipeline::new(
                channel,
                model,
                policy,
                observer,
                Keys {
                    article: article_key,
                    corpus: corpus_key,
                    output: output_key,
                    diff: diff_key,
                },
                !cli.no_verify_writes,
            );
            let outcome = pipeline.run().await?;
            report(&outcome);
        }
    }

    Ok(())
}
