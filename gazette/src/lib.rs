//! # Gazette
//!
//! Gazette ingests a tab separated corpus of press articles into a Solr index. Every article can
//! optionally be enriched with the locations, persons and organizations mentioned in its body.
//!
//! Documents are added one by one (or in batches), and the index is committed exactly once, after
//! every write has returned.
//!
//! ## Example
//!
//! ```no_run
//! # use gazette::indexing::{Pipeline, loaders::TsvLoader, extractors::Gazetteer};
//! # use gazette::integrations::solr::Solr;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let summary = Pipeline::from_loader(TsvLoader::new(["data/train.tsv", "data/test.tsv"]))
//!     .with_extractor(Gazetteer::from_path("data/lexicon.tsv", false)?)
//!     .then_submit_to(
//!         Solr::try_from_url("http://localhost:8983/solr/african_french_press")?.build()?,
//!     )
//!     .run()
//!     .await?;
//!
//! println!("indexed {} of {} articles", summary.submitted, summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! The `gazette` binary wraps the same pipeline, configured with [`config::IngestConfig`].

pub mod config;

/// Common traits, re-exported from core
pub mod traits {
    #[doc(inline)]
    pub use gazette_core::indexing_traits::*;
}

/// Errors of every stage of ingestion
pub mod errors {
    #[doc(inline)]
    pub use gazette_core::errors::*;
}

/// Integrations with search engines.
pub mod integrations {
    #[doc(inline)]
    pub use gazette_integrations::*;
}

/// The ingestion pipeline, its data model and its building blocks.
pub mod indexing {
    #[doc(inline)]
    pub use gazette_core::indexing::*;
    #[doc(inline)]
    pub use gazette_indexing::*;
}
