//! Ingestion of press articles into a search index
//!
//! The [`Pipeline`] reads records with a [`loaders::TsvLoader`], optionally enriches them with an
//! entity extractor such as [`extractors::Gazetteer`], builds documents with a
//! [`DocumentBuilder`] and writes them to any `IndexWriter`, committing once at the end.
pub mod extractors;
pub mod loaders;
pub mod persist;

mod document_builder;
mod pipeline;

pub use document_builder::DocumentBuilder;
pub use pipeline::{FailedRecord, FailurePolicy, Pipeline, RunSummary, Stage};
