use std::fmt::Debug;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::document::Document;
use crate::errors::{CommitError, SubmitError};
use crate::indexing_traits::IndexWriter;

/// Backoff configuration for index requests.
/// Each time a request fails transiently, backoff will wait an increasing period of time for each
/// subsequent retry attempt. see <https://docs.rs/backoff/latest/backoff/> for more details.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfiguration {
    /// Initial interval in milliseconds between retries
    pub initial_interval_ms: u64,
    /// The factor by which the interval is multiplied on each retry attempt
    pub multiplier: f64,
    /// Introduces randomness to avoid retry storms
    pub randomization_factor: f64,
    /// Total time all attempts are allowed in seconds. Once a retry must wait longer than this,
    /// the request is considered to have failed.
    pub max_elapsed_time_sec: u64,
}

impl Default for BackoffConfiguration {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            multiplier: 2.0,
            randomization_factor: 0.5,
            max_elapsed_time_sec: 60,
        }
    }
}

/// Retries transient submit and commit failures of the wrapped writer.
///
/// A retry resends the identical document, so retries never change what ends up in the index.
/// Permanent failures such as a 400 from the index are returned immediately.
#[derive(Debug, Clone)]
pub struct IndexWriterWithBackOff<W> {
    pub(crate) inner: W,
    config: BackoffConfiguration,
}

impl<W: IndexWriter> IndexWriterWithBackOff<W> {
    pub fn new(writer: W, config: BackoffConfiguration) -> Self {
        Self {
            inner: writer,
            config,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub(crate) fn strategy(&self) -> backoff::ExponentialBackoff {
        backoff::ExponentialBackoffBuilder::default()
            .with_initial_interval(Duration::from_millis(self.config.initial_interval_ms))
            .with_multiplier(self.config.multiplier)
            .with_max_elapsed_time(Some(Duration::from_secs(self.config.max_elapsed_time_sec)))
            .with_randomization_factor(self.config.randomization_factor)
            .build()
    }
}

fn classify_submit(error: SubmitError) -> backoff::Error<SubmitError> {
    if error.is_transient() {
        tracing::warn!(error = %error, "Transient submit failure, retrying");
        backoff::Error::transient(error)
    } else {
        backoff::Error::Permanent(error)
    }
}

#[async_trait]
impl<W: IndexWriter> IndexWriter for IndexWriterWithBackOff<W> {
    async fn setup(&self) -> Result<()> {
        self.inner.setup().await
    }

    async fn submit(&self, document: &Document) -> Result<String, SubmitError> {
        let op = || async { self.inner.submit(document).await.map_err(classify_submit) };

        backoff::future::retry(self.strategy(), op).await
    }

    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError> {
        let op = || async {
            self.inner
                .submit_batch(documents)
                .await
                .map_err(classify_submit)
        };

        backoff::future::retry(self.strategy(), op).await
    }

    async fn commit(&self) -> Result<String, CommitError> {
        let op = || async {
            self.inner.commit().await.map_err(|error| {
                if error.is_transient() {
                    tracing::warn!(error = %error, "Transient commit failure, retrying");
                    backoff::Error::transient(error)
                } else {
                    backoff::Error::Permanent(error)
                }
            })
        };

        backoff::future::retry(self.strategy(), op).await
    }

    fn batch_size(&self) -> Option<usize> {
        self.inner.batch_size()
    }
}
