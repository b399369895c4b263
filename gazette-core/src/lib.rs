#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod document;
mod entities;
pub mod errors;
mod indexing_decorators;
pub mod indexing_traits;
mod record;
mod record_stream;

/// All traits are available from the root
pub use crate::indexing_traits::*;

pub mod indexing {
    pub use crate::document::*;
    pub use crate::entities::*;
    pub use crate::indexing_decorators::*;
    pub use crate::indexing_traits::*;
    pub use crate::record::*;
    pub use crate::record_stream::RecordStream;
}

pub use crate::errors::*;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub mod util;
