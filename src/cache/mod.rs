//! Time-bounded cache of fetched datasets.
//!
//! A dataset lives under two keys of a [`KeyValueStore`]: one holds the JSON
//! array, the other the epoch-millisecond time it was fetched. Data older
//! than 24 hours is ignored.

mod metadata;
mod reader;
mod storage;

pub use metadata::{CacheStamp, FRESHNESS_WINDOW_MS};
pub use reader::{check_storage_data, check_storage_data_at, stored_stamp};
pub use storage::{CacheKeys, FileStore, KeyValueStore, MemoryStore};
