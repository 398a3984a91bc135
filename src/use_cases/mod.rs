// Use cases layer: startup sequencing and client-side query caching.

pub mod query_cache;
pub mod startup;

pub use query_cache::{QueryCache, QueryCacheConfig};
pub use startup::StartupTracker;
