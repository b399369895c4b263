//! Entity extractors used to enrich documents
//!
//! Any `EntityExtractor` can be plugged into the pipeline. The `Gazetteer` bundled here labels
//! the surfaces of a lexicon file.
pub mod gazetteer;

pub use gazetteer::Gazetteer;
