#![allow(clippy::from_over_into)]

//! This module defines the `RecordStream` type, which loaders hand to the pipeline.

use crate::errors::SourceReadError;
use crate::record::Record;
use futures_util::stream::{self, Stream};
use std::pin::Pin;

pub use futures_util::StreamExt;

/// An asynchronous stream of `Record` items.
///
/// Wraps an internal stream of `Result<Record, SourceReadError>` items.
///
/// Iterators and vectors of records (or results of records) can be converted into a
/// `RecordStream`.
#[pin_project::pin_project]
pub struct RecordStream {
    #[pin]
    pub(crate) inner: Pin<Box<dyn Stream<Item = Result<Record, SourceReadError>> + Send>>,
}

impl Stream for RecordStream {
    type Item = Result<Record, SourceReadError>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let this = self.project();
        this.inner.poll_next(cx)
    }
}

impl Into<RecordStream> for Vec<Result<Record, SourceReadError>> {
    fn into(self) -> RecordStream {
        RecordStream::iter(self)
    }
}

impl Into<RecordStream> for Vec<Record> {
    fn into(self) -> RecordStream {
        RecordStream::from_records(self)
    }
}

impl Into<RecordStream> for Result<Vec<Record>, SourceReadError> {
    fn into(self) -> RecordStream {
        match self {
            Ok(records) => RecordStream::from_records(records),
            Err(err) => RecordStream::iter(vec![Err(err)]),
        }
    }
}

impl Into<RecordStream> for Pin<Box<dyn Stream<Item = Result<Record, SourceReadError>> + Send>> {
    fn into(self) -> RecordStream {
        RecordStream { inner: self }
    }
}

impl From<SourceReadError> for RecordStream {
    fn from(err: SourceReadError) -> Self {
        RecordStream::iter(vec![Err(err)])
    }
}

impl RecordStream {
    pub fn empty() -> Self {
        RecordStream {
            inner: stream::empty().boxed(),
        }
    }

    /// Creates a `RecordStream` from an iterator of results.
    pub fn iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<Record, SourceReadError>> + Send + 'static,
        <I as IntoIterator>::IntoIter: Send,
    {
        RecordStream {
            inner: stream::iter(iter).boxed(),
        }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        RecordStream::iter(records.into_iter().map(Ok))
    }
}
