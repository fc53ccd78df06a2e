//! Application layer - command handlers orchestrating ports and domain.

pub mod handlers;
pub mod lookup_cache;

pub use lookup_cache::LookupCache;
