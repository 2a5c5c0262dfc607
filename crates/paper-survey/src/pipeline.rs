//! Survey orchestrator.
//!
//! Stages run in order (`Refining → Retrieving → Ranking → Fetching →
//! Summarizing → Synthesizing → Done`); each entry is reported to a
//! [`ProgressSink`]. A stage that loses every item ends the run in `Failed`
//! with a typed [`PipelineError`]; losing some items only shrinks the result.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::extract::{LopdfExtractor, TextExtractor, TextStage};
use crate::fetch::{ContentCache, DiskCache, PdfFetcher};
use crate::llm::{ChatCompletionsModel, LanguageModel};
use crate::models::{FetchedPaper, ItemFailure, Paper, SummarizedPaper};
use crate::ranking::Ranker;
use crate::refine::refine_query;
use crate::retrieval::ParallelRetriever;
use crate::sources::{ArxivSource, PaperSource, SemanticScholarSource};
use crate::summarize::Summarizer;
use crate::synthesize::synthesize;

/// Orchestrator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Not started.
    Idle,
    /// Turning the topic into a search query.
    Refining,
    /// Querying every source.
    Retrieving,
    /// Deduplicating and scoring candidates.
    Ranking,
    /// Downloading PDFs and extracting text.
    Fetching,
    /// Summarizing each paper.
    Summarizing,
    /// Writing the survey.
    Synthesizing,
    /// Finished successfully.
    Done,
    /// Terminated by a run-level failure.
    Failed,
}

impl PipelineStage {
    /// Stage name passed to the progress sink.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Refining => "refining",
            Self::Retrieving => "retrieving",
            Self::Ranking => "ranking",
            Self::Fetching => "fetching",
            Self::Summarizing => "summarizing",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Fraction of the run completed on entering this stage.
    #[must_use]
    pub const fn fraction(self) -> f64 {
        match self {
            Self::Idle | Self::Failed => 0.0,
            Self::Refining => 0.1,
            Self::Retrieving => 0.2,
            Self::Ranking => 0.4,
            Self::Fetching => 0.5,
            Self::Summarizing => 0.7,
            Self::Synthesizing => 0.9,
            Self::Done => 1.0,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives `(stage name, fraction complete)` at every transition.
///
/// Errors and panics are logged and otherwise ignored. Panics are only
/// contained in builds that unwind; the release profile aborts.
pub trait ProgressSink: Send + Sync {
    /// Report a transition.
    fn report(&self, stage: &str, fraction: f64) -> anyhow::Result<()>;
}

impl<F> ProgressSink for F
where
    F: Fn(&str, f64) -> anyhow::Result<()> + Send + Sync,
{
    fn report(&self, stage: &str, fraction: f64) -> anyhow::Result<()> {
        self(stage, fraction)
    }
}

/// Progress sink that logs each transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, stage: &str, fraction: f64) -> anyhow::Result<()> {
        info!(stage, progress = format!("{:.0}%", fraction * 100.0), "Pipeline progress");
        Ok(())
    }
}

/// Soft failures collected during a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunDiagnostics {
    /// Records returned by all sources.
    pub retrieved: usize,
    /// Candidates kept after deduplication and ranking.
    pub ranked: usize,
    /// Sources that failed, as messages.
    pub source_failures: Vec<String>,
    /// Papers whose PDF could not be fetched.
    pub fetch_failures: Vec<ItemFailure>,
    /// Papers whose text could not be extracted.
    pub extraction_failures: Vec<ItemFailure>,
    /// Papers that could not be summarized.
    pub summary_failures: Vec<ItemFailure>,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyOutcome {
    /// The topic as entered.
    pub topic: String,
    /// Query sent to the catalogs.
    pub refined_query: String,
    /// Summarized papers in rank order.
    pub papers: Vec<SummarizedPaper>,
    /// Markdown survey.
    pub survey: String,
    /// Soft failures.
    pub diagnostics: RunDiagnostics,
}

/// Tracks the current stage and forwards transitions to the sink.
struct StageTracker {
    current: Mutex<PipelineStage>,
    sink: Arc<dyn ProgressSink>,
}

impl StageTracker {
    fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { current: Mutex::new(PipelineStage::Idle), sink }
    }

    fn current(&self) -> PipelineStage {
        self.current.lock().map_or(PipelineStage::Idle, |guard| *guard)
    }

    fn enter(&self, stage: PipelineStage) {
        let previous = self.current();
        if let Ok(mut guard) = self.current.lock() {
            *guard = stage;
        }

        let fraction =
            if stage == PipelineStage::Failed { previous.fraction() } else { stage.fraction() };
        match panic::catch_unwind(AssertUnwindSafe(|| self.sink.report(stage.name(), fraction))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(stage = %stage, error = %e, "Progress sink failed"),
            Err(_) => warn!(stage = %stage, "Progress sink panicked"),
        }
    }
}

/// Builder for [`SurveyPipeline`] with injectable collaborators.
pub struct PipelineBuilder {
    config: Config,
    sources: Vec<Arc<dyn PaperSource>>,
    model: Option<Arc<dyn LanguageModel>>,
    cache: Option<Arc<dyn ContentCache>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl PipelineBuilder {
    /// Start from a configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources: Vec::new(),
            model: None,
            cache: None,
            extractor: None,
            progress: None,
        }
    }

    /// Add a source (defaults to arXiv and Semantic Scholar when none are added).
    #[must_use]
    pub fn source(mut self, source: Arc<dyn PaperSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Use this language model instead of the configured endpoint.
    #[must_use]
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Use this content cache instead of a [`DiskCache`] at `config.cache_dir`.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use this text extractor instead of [`LopdfExtractor`].
    #[must_use]
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Report progress here instead of to the log.
    #[must_use]
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Validate the configuration and assemble the pipeline.
    ///
    /// Fails before any network activity when the configuration is invalid.
    pub fn build(self) -> Result<SurveyPipeline, PipelineError> {
        let config = self.config;
        config.validate()?;

        let sources = if self.sources.is_empty() {
            let arxiv: Arc<dyn PaperSource> = Arc::new(ArxivSource::new(&config)?);
            let s2: Arc<dyn PaperSource> = Arc::new(SemanticScholarSource::new(&config)?);
            vec![arxiv, s2]
        } else {
            self.sources
        };

        let model: Arc<dyn LanguageModel> = match self.model {
            Some(model) => model,
            None => Arc::new(ChatCompletionsModel::new(&config)?),
        };
        let cache: Arc<dyn ContentCache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(DiskCache::new(config.cache_dir.clone())),
        };
        let extractor: Arc<dyn TextExtractor> = match self.extractor {
            Some(extractor) => extractor,
            None => Arc::new(LopdfExtractor),
        };
        let progress: Arc<dyn ProgressSink> = match self.progress {
            Some(progress) => progress,
            None => Arc::new(TracingProgress),
        };

        let texts = TextStage::new(Arc::clone(&cache), extractor);
        Ok(SurveyPipeline {
            retriever: ParallelRetriever::new(sources),
            ranker: Ranker::new(config.ranking)?,
            fetcher: PdfFetcher::new(&config, cache)?,
            summarizer: Summarizer::new(
                Arc::clone(&model),
                texts.clone(),
                config.max_concurrent_summaries,
                config.max_summary_chars,
            ),
            texts,
            model,
            progress,
            config,
        })
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("sources", &self.sources.len())
            .field("custom_model", &self.model.is_some())
            .finish_non_exhaustive()
    }
}

/// End-to-end literature survey run.
pub struct SurveyPipeline {
    config: Config,
    retriever: ParallelRetriever,
    ranker: Ranker,
    fetcher: PdfFetcher,
    texts: TextStage,
    summarizer: Summarizer,
    model: Arc<dyn LanguageModel>,
    progress: Arc<dyn ProgressSink>,
}

impl SurveyPipeline {
    /// Shorthand for [`PipelineBuilder::new`].
    #[must_use]
    pub fn builder(config: Config) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Run a survey for `topic` under the configured deadline.
    ///
    /// On timeout in-flight work is dropped and no partial result is returned.
    #[instrument(skip(self))]
    pub async fn run(&self, topic: &str) -> Result<SurveyOutcome, PipelineError> {
        let tracker = StageTracker::new(Arc::clone(&self.progress));

        let topic = topic.trim();
        if topic.is_empty() {
            tracker.enter(PipelineStage::Failed);
            return Err(PipelineError::EmptyTopic);
        }

        let limit = self.config.run_timeout;
        let result = match tokio::time::timeout(limit, self.execute(topic, &tracker)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(limit)),
        };

        match &result {
            Ok(outcome) => {
                info!(papers = outcome.papers.len(), "Survey complete");
            }
            Err(e) => {
                warn!(stage = %tracker.current(), error = %e, "Survey failed");
                tracker.enter(PipelineStage::Failed);
            }
        }
        result
    }

    async fn execute(
        &self,
        topic: &str,
        tracker: &StageTracker,
    ) -> Result<SurveyOutcome, PipelineError> {
        let mut diagnostics = RunDiagnostics::default();

        tracker.enter(PipelineStage::Refining);
        let refined_query = refine_query(self.model.as_ref(), topic).await;

        tracker.enter(PipelineStage::Retrieving);
        let retrieved =
            self.retriever.retrieve(&refined_query, self.config.max_results_per_source).await?;
        diagnostics.retrieved = retrieved.items.len();
        diagnostics.source_failures = retrieved.failures.iter().map(ToString::to_string).collect();

        tracker.enter(PipelineStage::Ranking);
        let candidates =
            self.ranker.rank(&retrieved.items, &refined_query, self.config.candidate_pool);
        if candidates.is_empty() {
            return Err(PipelineError::NoResultsAfterRanking);
        }
        diagnostics.ranked = candidates.len();

        tracker.enter(PipelineStage::Fetching);
        let selected = self.fetch_with_backfill(candidates, &mut diagnostics).await?;
        let processed = self.texts.extract_all(selected).await;
        diagnostics.extraction_failures = processed.failures;

        tracker.enter(PipelineStage::Summarizing);
        let attempted = processed.items.len();
        let summarized = self.summarizer.summarize_all(processed.items).await;
        diagnostics.summary_failures = summarized
            .failures
            .iter()
            .map(|f| ItemFailure::new(f.paper_id.clone(), &f.reason))
            .collect();
        if summarized.items.is_empty() {
            return Err(PipelineError::AllSummariesFailed { attempted });
        }

        tracker.enter(PipelineStage::Synthesizing);
        let survey = synthesize(self.model.as_ref(), topic, &summarized.items)
            .await
            .map_err(PipelineError::SynthesisFailed)?;

        tracker.enter(PipelineStage::Done);
        Ok(SurveyOutcome {
            topic: topic.to_string(),
            refined_query,
            papers: summarized.items,
            survey,
            diagnostics,
        })
    }

    /// Fetch the best `top_k` candidates, replacing failed downloads from the
    /// rest of the pool in further waves.
    ///
    /// Papers without a PDF fill remaining slots; the selection keeps rank order.
    async fn fetch_with_backfill(
        &self,
        candidates: Vec<Paper>,
        diagnostics: &mut RunDiagnostics,
    ) -> Result<Vec<FetchedPaper>, PipelineError> {
        let top_k = self.config.top_k.min(candidates.len());
        let rank_of: HashMap<String, usize> =
            candidates.iter().enumerate().map(|(i, p)| (p.id.clone(), i)).collect();

        let mut with_pdf: Vec<FetchedPaper> = Vec::new();
        let mut without_pdf: Vec<FetchedPaper> = Vec::new();
        let mut attempted = 0;

        let mut reserve = candidates.into_iter();
        let mut wave: Vec<Paper> = reserve.by_ref().take(top_k).collect();
        while !wave.is_empty() {
            attempted += wave.len();
            let report = self.fetcher.fetch_all(wave).await;
            diagnostics.fetch_failures.extend(report.failures);
            for item in report.items {
                if item.pdf.is_some() {
                    with_pdf.push(item);
                } else {
                    without_pdf.push(item);
                }
            }

            let missing = top_k.saturating_sub(with_pdf.len());
            wave = reserve.by_ref().take(missing).collect();
            if !wave.is_empty() {
                info!(missing, "Backfilling failed downloads");
            }
        }

        if with_pdf.is_empty() {
            return Err(PipelineError::AllDownloadsFailed { attempted });
        }

        let missing = top_k.saturating_sub(with_pdf.len());
        let mut selected = with_pdf;
        let position = |item: &FetchedPaper| rank_of.get(&item.paper.id).copied().unwrap_or(usize::MAX);
        without_pdf.sort_by_key(position);
        selected.extend(without_pdf.into_iter().take(missing));
        selected.sort_by_key(position);

        info!(selected = selected.len(), attempted, "Selected papers for summarization");
        Ok(selected)
    }
}

impl fmt::Debug for SurveyPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyPipeline")
            .field("retriever", &self.retriever)
            .field("top_k", &self.config.top_k)
            .finish_non_exhaustive()
    }
}
