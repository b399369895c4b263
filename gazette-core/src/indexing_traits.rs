//! Traits in Gazette allow swapping every stage of the pipeline
//!
//! The record source, the entity extractor and the index are all traits. The pipeline only talks
//! to these, so a stub extractor or an in-memory index can be substituted in tests, and another
//! search engine only needs an `IndexWriter` implementation.
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::document::Document;
use crate::entities::EntityBundle;
use crate::errors::{CommitError, ExtractionError, SubmitError};
use crate::record_stream::RecordStream;

/// All traits are easily mockable under tests
#[cfg(feature = "test-utils")]
#[doc(hidden)]
use mockall::automock;

/// Starting point of a pipeline
///
/// A loader yields the records of the corpus in order, with contiguous ids starting at zero.
#[cfg_attr(feature = "test-utils", automock)]
pub trait Loader: Send {
    fn into_stream(self) -> RecordStream;

    /// Boxed variant so `Box<dyn Loader>` can be used as a loader
    fn into_stream_boxed(self: Box<Self>) -> RecordStream;
}

impl Loader for Box<dyn Loader> {
    fn into_stream(self) -> RecordStream {
        Loader::into_stream_boxed(self)
    }

    fn into_stream_boxed(self: Box<Self>) -> RecordStream {
        Loader::into_stream(*self)
    }
}

/// Extracts named entities from text.
///
/// Implementations must be pure functions of the text: the same input always yields the same
/// bundle. Extraction is treated as blocking work and is run off the async runtime.
#[cfg_attr(feature = "test-utils", automock)]
pub trait EntityExtractor: Send + Sync + Debug {
    /// Returns the locations, persons and organizations found in `text`.
    ///
    /// Must return an empty bundle, not an error, for empty or very short text.
    fn extract(&self, text: &str) -> Result<EntityBundle, ExtractionError>;
}

impl<E: EntityExtractor + ?Sized> EntityExtractor for Arc<E> {
    fn extract(&self, text: &str) -> Result<EntityBundle, ExtractionError> {
        (**self).extract(text)
    }
}

impl<E: EntityExtractor + ?Sized> EntityExtractor for Box<E> {
    fn extract(&self, text: &str) -> Result<EntityBundle, ExtractionError> {
        (**self).extract(text)
    }
}

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Writes documents to a search index
///
/// Writes are additive and only become visible after `commit`. The pipeline calls `commit`
/// exactly once, after every `submit` of the run has returned.
pub trait IndexWriter: Debug + Send + Sync {
    /// Called once before the first write
    async fn setup(&self) -> Result<()>;

    /// Stages a single document, returning the raw acknowledgement of the index
    async fn submit(&self, document: &Document) -> Result<String, SubmitError>;

    /// Stages several documents in one request
    ///
    /// Either all documents of the batch are accepted or the whole batch fails.
    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError>;

    /// Makes all staged documents visible
    async fn commit(&self) -> Result<String, CommitError>;

    /// When set, the pipeline groups documents and uses `submit_batch`
    fn batch_size(&self) -> Option<usize> {
        None
    }
}

#[async_trait]
impl<W: IndexWriter + ?Sized> IndexWriter for Arc<W> {
    async fn setup(&self) -> Result<()> {
        (**self).setup().await
    }

    async fn submit(&self, document: &Document) -> Result<String, SubmitError> {
        (**self).submit(document).await
    }

    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError> {
        (**self).submit_batch(documents).await
    }

    async fn commit(&self) -> Result<String, CommitError> {
        (**self).commit().await
    }

    fn batch_size(&self) -> Option<usize> {
        (**self).batch_size()
    }
}

#[async_trait]
impl<W: IndexWriter + ?Sized> IndexWriter for Box<W> {
    async fn setup(&self) -> Result<()> {
        (**self).setup().await
    }

    async fn submit(&self, document: &Document) -> Result<String, SubmitError> {
        (**self).submit(document).await
    }

    async fn submit_batch(&self, documents: &[Document]) -> Result<String, SubmitError> {
        (**self).submit_batch(documents).await
    }

    async fn commit(&self) -> Result<String, CommitError> {
        (**self).commit().await
    }

    fn batch_size(&self) -> Option<usize> {
        (**self).batch_size()
    }
}
