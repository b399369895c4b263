//! Integrations with search engines.

#[cfg(feature = "solr")]
pub mod solr;
