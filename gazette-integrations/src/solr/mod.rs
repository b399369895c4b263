//! This module provides the integration with Solr as the search index of Gazette.
//!
//! Documents are added through the JSON update handler of a core or collection and made visible
//! with a single explicit commit at the end of a run.
//!
//! # Example
//!
//! ```no_run
//! # use gazette_integrations::solr::Solr;
//! # fn main() -> anyhow::Result<()> {
//! let solr = Solr::try_from_url("http://localhost:8983/solr/african_french_press")?
//!     .batch_size(100)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
use std::time::Duration;

use anyhow::{Context as _, Result};
use derive_builder::Builder;
use url::Url;

mod index_writer;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `Solr` writes documents to a Solr core or collection.
///
/// # Fields
///
/// * `client` - The HTTP client used for all requests.
/// * `base_url` - Url of the core, for instance `http://localhost:8983/solr/press`.
/// * `batch_size` - When set, documents are sent in batches of this size.
/// * `timeout` - Timeout of a single request, 30 seconds by default.
#[derive(Debug, Clone, Builder)]
#[builder(
    pattern = "owned",
    setter(strip_option),
    build_fn(error = "anyhow::Error", validate = "Self::validate")
)]
pub struct Solr {
    #[builder(default)]
    client: reqwest::Client,
    base_url: Url,
    #[builder(default)]
    batch_size: Option<usize>,
    #[builder(default = DEFAULT_TIMEOUT)]
    timeout: Duration,
}

impl Solr {
    pub fn builder() -> SolrBuilder {
        SolrBuilder::default()
    }

    /// Starts a builder for the core at `url`.
    ///
    /// # Errors
    ///
    /// Errors if the url cannot be parsed.
    pub fn try_from_url(url: impl AsRef<str>) -> Result<SolrBuilder> {
        let base_url = Url::parse(url.as_ref())
            .with_context(|| format!("Invalid Solr url `{}`", url.as_ref()))?;

        Ok(SolrBuilder::default().base_url(base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The update handler, `<base_url>/update`
    pub(crate) fn update_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("update");
        }
        url
    }

    /// The update handler with `commit=true`
    pub(crate) fn commit_url(&self) -> Url {
        let mut url = self.update_url();
        url.query_pairs_mut().append_pair("commit", "true");
        url
    }
}

impl SolrBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("Solr url must be an http(s) url, got `{url}`");
            }
        }
        if let Some(Some(0)) = self.batch_size {
            anyhow::bail!("Batch size must be at least 1");
        }
        Ok(())
    }
}
