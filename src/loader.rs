//! Cache-first loading of a dataset page.

use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::api::{fetch_api_data, Fetch};
use crate::cache::{check_storage_data, CacheKeys, KeyValueStore};
use crate::error::Result;
use crate::models::{PageRequest, PagedData};

/// Where a loaded page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Stored data, still inside the freshness window
    Cache,
    /// Fetched from the endpoint just now
    Network,
}

/// A page plus the source it was served from
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: PagedData<T>,
    pub source: DataSource,
}

/// Serves pages from the store while fresh, else from the endpoint.
///
/// There are no retries: a failed or non-success fetch ends the load.
pub struct DataLoader<S, F> {
    store: S,
    fetcher: F,
}

impl<S, F> DataLoader<S, F>
where
    S: KeyValueStore,
    F: Fetch,
{
    pub fn new(store: S, fetcher: F) -> Self {
        Self { store, fetcher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load one page of the dataset at `endpoint`.
    ///
    /// With `refresh` set the cache is not consulted. Returns `Ok(None)` if the
    /// cache missed and the endpoint answered with a non-success status.
    pub async fn load_page<T>(
        &self,
        endpoint: &str,
        keys: &CacheKeys,
        request: PageRequest,
        refresh: bool,
    ) -> Result<Option<Loaded<T>>>
    where
        T: DeserializeOwned + Serialize + Clone,
    {
        if !refresh {
            if let Some(data) = check_storage_data(&self.store, keys, request)? {
                return Ok(Some(Loaded {
                    data,
                    source: DataSource::Cache,
                }));
            }
        }

        info!(endpoint, "Fetching dataset");
        let fetched = fetch_api_data(&self.fetcher, &self.store, endpoint, keys, request).await?;

        Ok(fetched.map(|data| Loaded {
            data,
            source: DataSource::Network,
        }))
    }
}
