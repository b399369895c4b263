//! This module defines the `Record` struct, a single article as read from the corpus.
//!
//! A `Record` carries the raw tabular fields of one article before any enrichment. Its `id` is
//! positional: it is assigned by the loader over the concatenation of all sources and is only
//! stable for the duration of a single run.
use std::fmt::Debug;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::util::abbreviate;

/// One article of the corpus.
#[derive(Default, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(setter(into, strip_option), build_fn(error = "anyhow::Error"))]
pub struct Record {
    /// Zero based position in the merged source.
    #[builder(default)]
    pub id: usize,
    /// Press category, e.g. `politique` or `sport`.
    pub category: String,
    /// Headline of the article.
    pub title: String,
    /// Body text of the article.
    pub body: String,
    /// Canonical url of the article, if the source has one.
    #[builder(default)]
    pub url: Option<String>,
}

impl Debug for Record {
    /// The body is truncated, corpora tend to have very long articles.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("title", &abbreviate(&self.title, 60))
            .field("body", &abbreviate(&self.body, 100))
            .field("url", &self.url)
            .finish()
    }
}

impl Record {
    /// Creates a new instance of `RecordBuilder`.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Creates a record without url.
    pub fn new(
        id: usize,
        category: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Record {
        Record {
            id,
            category: category.into(),
            title: title.into(),
            body: body.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
