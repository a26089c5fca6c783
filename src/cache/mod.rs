// Cache module for the in-memory query cache.
// Keys, entries, retry policy and the read-through fetch layer.

pub mod key;
pub mod query;
pub mod retry;
pub mod store;

pub use key::{CacheKey, EntityKind};
pub use query::{CacheEvent, QueryCache, QueryResult};
pub use retry::RetryPolicy;
