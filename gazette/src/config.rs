//! Configuration of an ingest run, from command line flags or environment variables.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use url::Url;

use gazette_core::{
    IndexWriter,
    indexing::{BackoffConfiguration, BodyField, IndexWriterWithBackOff},
};
use gazette_indexing::{
    DocumentBuilder, FailurePolicy, Pipeline, extractors::Gazetteer, loaders::TsvLoader,
};
use gazette_integrations::solr::Solr;

pub const DEFAULT_SOURCE: &str = "data/train.tsv";
pub const DEFAULT_INDEX_URL: &str = "http://localhost:8983/solr/african_french_press";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Ingest press articles from tab separated files into a Solr index
#[derive(Debug, Clone, Parser)]
#[command(name = "gazette", version, about)]
pub struct IngestConfig {
    /// Source files, read and numbered in the given order
    #[arg(
        long = "source",
        env = "GAZETTE_SOURCES",
        value_delimiter = ',',
        default_value = DEFAULT_SOURCE
    )]
    pub source_paths: Vec<PathBuf>,

    /// Base url of the Solr core
    #[arg(long = "index-url", env = "GAZETTE_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
    pub index_base_url: String,

    /// Add the entities found in every body to its document
    #[arg(long = "enrich", env = "GAZETTE_ENRICH")]
    pub enrichment: bool,

    /// Lexicon of `surface<TAB>label` lines used for enrichment
    #[arg(long, env = "GAZETTE_LEXICON")]
    pub lexicon: Option<PathBuf>,

    /// Match lexicon surfaces regardless of case
    #[arg(long)]
    pub case_insensitive: bool,

    /// Field the article body is indexed under
    #[arg(long, default_value = "content", value_parser = parse_body_field)]
    pub body_field: BodyField,

    /// Number of records in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Send documents in batches of this size instead of one by one
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Retry transient index failures for up to this many seconds, 0 disables retries
    #[arg(long, default_value_t = 0)]
    pub max_retry_secs: u64,

    /// Timeout of a single index request
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Stop at the first rejected document, without committing
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

fn parse_body_field(value: &str) -> Result<BodyField, String> {
    value
        .parse()
        .map_err(|_| format!("expected `content` or `description`, got `{value}`"))
}

impl IngestConfig {
    /// Checks the options that clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Errors when enrichment has no lexicon, concurrency or batch size is zero, or the index url
    /// does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.enrichment && self.lexicon.is_none() {
            anyhow::bail!("Enrichment requires a lexicon, set --lexicon or GAZETTE_LEXICON");
        }
        if self.concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }
        if self.batch_size == Some(0) {
            anyhow::bail!("Batch size must be at least 1");
        }
        Url::parse(&self.index_base_url)
            .with_context(|| format!("Invalid index url `{}`", self.index_base_url))?;

        Ok(())
    }

    pub fn loader(&self) -> TsvLoader {
        TsvLoader::new(self.source_paths.iter().cloned())
    }

    /// Loads the lexicon when enrichment is enabled.
    ///
    /// # Errors
    ///
    /// Errors if the lexicon is missing or malformed.
    pub fn extractor(&self) -> Result<Option<Gazetteer>> {
        if !self.enrichment {
            return Ok(None);
        }
        let lexicon = self
            .lexicon
            .as_ref()
            .context("Enrichment requires a lexicon")?;

        Ok(Some(Gazetteer::from_path(lexicon, self.case_insensitive)?))
    }

    /// Builds the Solr writer, wrapped with retries when `max_retry_secs` is set.
    ///
    /// # Errors
    ///
    /// Errors if the index url is invalid.
    pub fn index(&self) -> Result<Box<dyn IndexWriter>> {
        let mut builder = Solr::try_from_url(&self.index_base_url)?
            .timeout(Duration::from_secs(self.timeout_secs));
        if let Some(batch_size) = self.batch_size {
            builder = builder.batch_size(batch_size);
        }
        let solr = builder.build()?;

        if self.max_retry_secs == 0 {
            return Ok(Box::new(solr));
        }

        Ok(Box::new(IndexWriterWithBackOff::new(
            solr,
            BackoffConfiguration {
                max_elapsed_time_sec: self.max_retry_secs,
                ..BackoffConfiguration::default()
            },
        )))
    }

    pub fn document_builder(&self) -> DocumentBuilder {
        DocumentBuilder::new(self.body_field)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }

    /// Validates the configuration and assembles the pipeline it describes.
    ///
    /// # Errors
    ///
    /// Errors if the configuration is invalid or the lexicon cannot be loaded.
    pub fn pipeline(&self) -> Result<Pipeline> {
        self.validate()?;

        let mut pipeline = Pipeline::from_loader(self.loader())
            .with_document_builder(self.document_builder())
            .with_concurrency(self.concurrency)
            .with_failure_policy(self.failure_policy());

        if let Some(extractor) = self.extractor()? {
            tracing::info!(num_entries = extractor.len(), "Enrichment enabled");
            pipeline = pipeline.with_extractor(extractor);
        }

        Ok(pipeline.then_submit_to(self.index()?))
    }
}
