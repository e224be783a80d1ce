use std::sync::Arc;

use tracing::{error, info};

use ae_core::diff::{diff, Diff};
use ae_core::{Article, DocumentChannel, EnrichedArticle, Result, SimilarityModel};
use ae_retry::{read_document, write_document, RetryObserver, RetryPolicy};

/// Channel keys for one enrichment run. The output key doubles as the
/// previous run's read key for the diff.
#[derive(Debug, Clone)]
pub struct Keys {
    pub article: String,
    pub corpus: String,
    pub output: String,
    pub diff: String,
}

pub struct RunOutcome {
    pub enriched: EnrichedArticle,
    pub diff: Diff,
    pub first_run: bool,
}

/// Sequences one run: read inputs, ask the similarity model, diff against
/// any prior output, then issue the two writes concurrently.
pub struct EnrichmentPipeline {
    channel: Arc<dyn DocumentChannel>,
    model: Arc<dyn SimilarityModel>,
    policy: RetryPolicy,
    observer: Arc<dyn RetryObserver>,
    keys: Keys,
    verify_writes: bool,
}

impl EnrichmentPipeline {
    pub fn new(
        channel: Arc<dyn DocumentChannel>,
        model: Arc<dyn SimilarityModel>,
        policy: RetryPolicy,
        observer: Arc<dyn RetryObserver>,
        keys: Keys,
        verify_writes: bool,
    ) -> Self {
        Self {
            channel,
            model,
            policy,
            observer,
            keys,
            verify_writes,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let channel = self.channel.as_ref();
        let observer = self.observer.as_ref();

        info!("📨 Reading source article from {}", self.keys.article);
        let article: Article =
            read_document(&self.policy, observer, channel, &self.keys.article).await?;

        info!("📚 Reading prior corpus from {}", self.keys.corpus);
        let corpus: Vec<Article> =
            read_document(&self.policy, observer, channel, &self.keys.corpus).await?;

        info!(
            "🧠 Asking {} for the most similar of {} prior articles",
            self.model.name(),
            corpus.len()
        );
        let model = self.model.as_ref();
        let article_ref = &article;
        let corpus_ref = corpus.as_slice();
        let similar = self
            .policy
            .run("similarity judgment", observer, || async move {
                model.find_similar(article_ref, corpus_ref).await
            })
            .await?;
        match &similar.title {
            Some(title) => info!("✨ Most similar prior article: {}", title),
            None => info!("✨ No sufficiently similar prior article"),
        }

        let enriched = EnrichedArticle::new(article, similar);

        let (changes, first_run) = match self.try_read_prior().await {
            Some(previous) => (diff(&previous, &enriched), false),
            None => (Diff::unchanged(), true),
        };

        info!(
            "📬 Writing output to {} and diff to {}",
            self.keys.output, self.keys.diff
        );
        let (output_result, diff_result) = tokio::join!(
            write_document(
                &self.policy,
                observer,
                channel,
                &self.keys.output,
                &enriched,
                self.verify_writes,
            ),
            write_document(
                &self.policy,
                observer,
                channel,
                &self.keys.diff,
                &changes,
                self.verify_writes,
            ),
        );
        // Both writes are awaited and both outcomes surfaced before the run
        // is allowed to fail.
        if let Err(e) = &output_result {
            error!("❌ Output write to {} failed: {}", self.keys.output, e);
        }
        if let Err(e) = &diff_result {
            error!("❌ Diff write to {} failed: {}", self.keys.diff, e);
        }
        output_result?;
        diff_result?;

        info!(
            "✅ Run complete, {} field(s) changed since the previous run",
            changes.changed.len()
        );
        Ok(RunOutcome {
            enriched,
            diff: changes,
            first_run,
        })
    }

    /// A prior output that is absent or unreadable is a first run, not a
    /// fatal error.
    async fn try_read_prior(&self) -> Option<EnrichedArticle> {
        match read_document(
            &self.policy,
            self.observer.as_ref(),
            self.channel.as_ref(),
            &self.keys.output,
        )
        .await
        {
            Ok(previous) => Some(previous),
            Err(e) => {
                info!(
                    "📭 No usable prior output at {} ({}); diffing against nothing",
                    self.keys.output, e
                );
                None
            }
        }
    }
}
