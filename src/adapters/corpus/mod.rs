//! Document corpus adapters.

mod cached;
mod in_memory;

pub use cached::CachedCorpus;
pub use in_memory::InMemoryCorpus;
