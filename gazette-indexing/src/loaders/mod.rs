//! The `loaders` module provides the record sources of a pipeline.
//!
//! `TsvLoader` reads press corpora from one or more tab separated files and merges them into a
//! single, contiguously numbered sequence of records.

pub mod tsv_loader;

pub use tsv_loader::TsvLoader;
