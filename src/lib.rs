pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;

pub use api::{fetch_api_data, Fetch, FetchResponse, HttpFetcher};
pub use cache::{check_storage_data, CacheKeys, CacheStamp, FileStore, KeyValueStore, MemoryStore};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{DataLoader, DataSource, Loaded};
pub use models::{find_user, total_pages, PageRequest, PagedData, User, UserStatus};
