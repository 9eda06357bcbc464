//! Ephemeral in-memory stores
//!
//! Nothing here survives a restart: link tokens and search results live for
//! ten minutes and are only ever read back by the same process.

pub mod links;
pub mod search;
pub mod ttl;

pub use links::{LinkStore, MemoryLinkStore};
pub use search::{select_result, DetailsError, MemorySearchStore, SearchEntry, SearchStore};
