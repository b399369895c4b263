//! Index writers that keep documents in process
pub mod memory_index;

pub use memory_index::MemoryIndex;
