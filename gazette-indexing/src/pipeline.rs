use futures_util::{StreamExt as _, TryStreamExt as _, stream};
use gazette_core::{
    EntityExtractor, IndexWriter, Loader, PipelineError, SubmitError,
    indexing::{Document, EntityBundle, Record, RecordStream},
};
use itertools::Itertools as _;
use strum_macros::Display;
use tokio::task;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::DocumentBuilder;

/// The default concurrency, strictly sequential.
const DEFAULT_CONCURRENCY: usize = 1;

/// What a pipeline run is doing.
///
/// A run moves through the stages in order and never goes back. `Extracting` is skipped when no
/// extractor is configured. Records are extracted, built and submitted one after the other, so
/// the run enters those three stages together before the first record is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Idle,
    Loading,
    Extracting,
    Building,
    Submitting,
    Committing,
    Done,
}

/// How the pipeline reacts when the index rejects a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, count it and keep going. Commit still happens.
    #[default]
    Continue,
    /// Stop at the first failure without committing.
    Abort,
}

/// A record that could not be written to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRecord {
    pub id: usize,
    /// HTTP status returned by the index, if any
    pub status: Option<u16>,
    pub reason: String,
}

impl FailedRecord {
    fn new(id: usize, error: &SubmitError) -> Self {
        let status = match error {
            SubmitError::Status { status, .. } => Some(*status),
            _ => None,
        };

        Self {
            id,
            status,
            reason: error.to_string(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records read from the source
    pub total: usize,
    /// Documents acknowledged by the index
    pub submitted: usize,
    pub failed: Vec<FailedRecord>,
    /// Whether documents carry entity fields
    pub enriched: bool,
    /// Records indexed with an empty bundle because extraction failed
    pub extraction_failures: usize,
    /// Raw acknowledgement of the commit
    pub commit_ack: String,
    /// Stages the run went through, in order, ending with [`Stage::Done`]
    pub stages: Vec<Stage>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// True when every record was submitted successfully.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Documents built for one submission request, with the ids of their records.
struct Unit {
    ids: Vec<usize>,
    extraction_failures: usize,
    result: Result<String, SubmitError>,
}

/// A pipeline that ingests records into a search index.
///
/// Records are loaded in full, then each is optionally enriched with entities from its body, turned
/// into a document and submitted. Once every submission has returned, the index is committed
/// exactly once.
///
/// With the default concurrency of 1 a record is fully submitted before the next one is touched.
/// Higher concurrency keeps several records in flight but still reports them in source order, and
/// never submits a record twice.
///
/// # Example
///
/// ```no_run
/// # use gazette_indexing::{Pipeline, loaders::TsvLoader, persist::MemoryIndex};
/// # async fn run() -> anyhow::Result<()> {
/// let summary = Pipeline::from_loader(TsvLoader::new(["data/train.tsv"]))
///     .with_concurrency(4)
///     .then_submit_to(MemoryIndex::default())
///     .run()
///     .await?;
///
/// assert!(summary.is_complete());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    stream: RecordStream,
    extractor: Option<Arc<dyn EntityExtractor>>,
    document_builder: DocumentBuilder,
    index: Option<Arc<dyn IndexWriter>>,
    concurrency: usize,
    failure_policy: FailurePolicy,
    stages: Vec<Stage>,
}

impl Default for Pipeline {
    /// Creates a default `Pipeline` with an empty stream, no extractor and no index.
    fn default() -> Self {
        Self {
            stream: RecordStream::empty(),
            extractor: None,
            document_builder: DocumentBuilder::default(),
            index: None,
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            stages: vec![Stage::Idle],
        }
    }
}

impl Pipeline {
    /// Creates a `Pipeline` from a given loader.
    pub fn from_loader(loader: impl Loader + 'static) -> Self {
        let stream = loader.into_stream();
        Self {
            stream,
            ..Default::default()
        }
    }

    /// Creates a `Pipeline` from a given stream of records.
    pub fn from_stream(stream: impl Into<RecordStream>) -> Self {
        Self {
            stream: stream.into(),
            ..Default::default()
        }
    }

    /// Enables enrichment with the given extractor.
    ///
    /// Without an extractor, documents carry no entity fields at all.
    #[must_use]
    pub fn with_extractor(mut self, extractor: impl EntityExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    #[must_use]
    pub fn with_document_builder(mut self, document_builder: DocumentBuilder) -> Self {
        self.document_builder = document_builder;
        self
    }

    /// Sets how many records are in flight at once. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Submits documents to the given index.
    ///
    /// If the index has a batch size, documents are grouped and sent with `submit_batch`.
    #[must_use]
    pub fn then_submit_to(mut self, index: impl IndexWriter + 'static) -> Self {
        self.index = Some(Arc::new(index));
        self
    }

    fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Idle)
    }

    fn transition(&mut self, next: Stage) {
        debug_assert!(next > self.stage(), "stages only move forward");
        tracing::debug!(from = %self.stage(), to = %next, "Pipeline stage");
        self.stages.push(next);
    }

    /// Runs the pipeline.
    ///
    /// # Errors
    ///
    /// Fails if no index is configured, the index cannot be set up, the source cannot be read, a
    /// submission fails under [`FailurePolicy::Abort`], or the final commit fails.
    ///
    /// Individual submission failures under [`FailurePolicy::Continue`] are not errors; they are
    /// reported in the returned [`RunSummary`].
    #[tracing::instrument(skip_all, fields(total_records), name = "ingest_pipeline.run")]
    pub async fn run(mut self) -> Result<RunSummary, PipelineError> {
        let now = Instant::now();
        let Some(index) = self.index.take() else {
            return Err(PipelineError::NoIndex);
        };

        tracing::info!(
            concurrency = self.concurrency,
            enriched = self.extractor.is_some(),
            index = ?index,
            "Starting ingest pipeline"
        );

        index.setup().await.map_err(PipelineError::Setup)?;

        self.transition(Stage::Loading);
        let stream = std::mem::replace(&mut self.stream, RecordStream::empty());
        let records: Vec<Record> = stream.try_collect().await?;
        let total = records.len();
        tracing::Span::current().record("total_records", total);

        if self.extractor.is_some() {
            self.transition(Stage::Extracting);
        }
        self.transition(Stage::Building);
        self.transition(Stage::Submitting);

        let chunk_size = index.batch_size().unwrap_or(1).max(1);
        let batched = index.batch_size().is_some();
        let extractor = self.extractor.clone();
        let builder = self.document_builder;

        let chunks = records
            .into_iter()
            .chunks(chunk_size)
            .into_iter()
            .map(Iterator::collect::<Vec<_>>)
            .collect::<Vec<_>>();

        let mut units = stream::iter(chunks)
            .map(|chunk| {
                let extractor = extractor.clone();
                let index = Arc::clone(&index);
                process_unit(chunk, extractor, builder, index, batched)
            })
            .buffered(self.concurrency);

        let mut submitted = 0;
        let mut extraction_failures = 0;
        let mut failed = Vec::new();

        while let Some(unit) = units.next().await {
            extraction_failures += unit.extraction_failures;

            match unit.result {
                Ok(ack) => {
                    tracing::debug!(ids = ?unit.ids, ack = %ack, "Index acknowledged");
                    submitted += unit.ids.len();
                }
                Err(error) => {
                    tracing::error!(ids = ?unit.ids, error = %error, "Failed to submit");
                    if self.failure_policy == FailurePolicy::Abort {
                        return Err(PipelineError::Submit {
                            id: unit.ids.first().copied().unwrap_or_default(),
                            source: error,
                        });
                    }
                    failed.extend(unit.ids.iter().map(|id| FailedRecord::new(*id, &error)));
                }
            }
        }
        drop(units);

        self.transition(Stage::Committing);
        let commit_ack = index
            .commit()
            .await
            .map_err(|source| PipelineError::Commit {
                acknowledged: submitted,
                source,
            })?;
        tracing::debug!(ack = %commit_ack, "Index committed");
        self.transition(Stage::Done);

        let summary = RunSummary {
            total,
            submitted,
            failed,
            enriched: extractor.is_some(),
            extraction_failures,
            commit_ack,
            stages: std::mem::take(&mut self.stages),
            elapsed: now.elapsed(),
        };

        if summary.is_complete() {
            tracing::info!(
                total,
                submitted,
                extraction_failures,
                elapsed_in_seconds = summary.elapsed.as_secs(),
                "Ingested {} records",
                total
            );
        } else {
            tracing::warn!(
                total,
                submitted,
                num_failed = summary.failed.len(),
                extraction_failures,
                elapsed_in_seconds = summary.elapsed.as_secs(),
                "Ingested {} of {} records",
                submitted,
                total
            );
        }

        Ok(summary)
    }
}

/// Extracts, builds and submits the records of one request.
async fn process_unit(
    records: Vec<Record>,
    extractor: Option<Arc<dyn EntityExtractor>>,
    builder: DocumentBuilder,
    index: Arc<dyn IndexWriter>,
    batched: bool,
) -> Unit {
    let mut documents = Vec::with_capacity(records.len());
    let mut extraction_failures = 0;

    for record in &records {
        let entities = match &extractor {
            Some(extractor) => {
                let (bundle, ok) = extract(Arc::clone(extractor), record).await;
                if !ok {
                    extraction_failures += 1;
                }
                Some(bundle)
            }
            None => None,
        };

        documents.push(builder.build(record, entities.as_ref()));
    }

    let result = submit(index.as_ref(), &documents, batched).await;

    Unit {
        ids: records.iter().map(|record| record.id).collect(),
        extraction_failures,
        result,
    }
}

/// Runs the extractor on the blocking pool.
///
/// A failed or panicking extraction yields an empty bundle and `false`.
async fn extract(extractor: Arc<dyn EntityExtractor>, record: &Record) -> (EntityBundle, bool) {
    let id = record.id;
    let body = record.body.clone();
    let span = tracing::trace_span!("extract", id);

    let result = task::spawn_blocking(move || span.in_scope(|| extractor.extract(&body))).await;

    match result {
        Ok(Ok(bundle)) => {
            tracing::trace!(id, num_entities = bundle.len(), "Extracted entities");
            (bundle, true)
        }
        Ok(Err(error)) => {
            tracing::warn!(id, error = %error, "Entity extraction failed");
            (EntityBundle::default(), false)
        }
        Err(error) => {
            tracing::warn!(id, error = %error, "Entity extraction task failed");
            (EntityBundle::default(), false)
        }
    }
}

async fn submit(
    index: &dyn IndexWriter,
    documents: &[Document],
    batched: bool,
) -> Result<String, SubmitError> {
    match documents {
        [document] if !batched => index.submit(document).await,
        documents => index.submit_batch(documents).await,
    }
}
