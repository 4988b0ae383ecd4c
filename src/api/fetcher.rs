use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::Fetch;
use crate::cache::{CacheKeys, CacheStamp, KeyValueStore};
use crate::error::{Error, Result};
use crate::models::{PageRequest, PagedData};

/// Fetch the full dataset from `endpoint`, store it, and return the requested page.
///
/// A non-success status yields `Ok(None)` and leaves the store untouched.
/// A body that isn't a JSON array of `T` is an error, also without writes.
/// On success the dataset and a fresh timestamp replace whatever was stored
/// under `keys`; the two writes are not atomic.
pub async fn fetch_api_data<T, F, S>(
    fetcher: &F,
    store: &S,
    endpoint: &str,
    keys: &CacheKeys,
    request: PageRequest,
) -> Result<Option<PagedData<T>>>
where
    T: DeserializeOwned + Serialize + Clone,
    F: Fetch + ?Sized,
    S: KeyValueStore + ?Sized,
{
    fetch_api_data_at(fetcher, store, endpoint, keys, request, Utc::now).await
}

/// Same as [`fetch_api_data`], stamping the stored data with `clock()`
pub async fn fetch_api_data_at<T, F, S>(
    fetcher: &F,
    store: &S,
    endpoint: &str,
    keys: &CacheKeys,
    request: PageRequest,
    clock: impl FnOnce() -> DateTime<Utc>,
) -> Result<Option<PagedData<T>>>
where
    T: DeserializeOwned + Serialize + Clone,
    F: Fetch + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let response = fetcher.request(endpoint).await?;

    if !response.ok() {
        warn!(endpoint, status = response.status, "Fetch returned non-success status");
        return Ok(None);
    }

    let all: Vec<T> =
        serde_json::from_str(&response.body).map_err(|e| Error::parse("response body", e))?;
    let stamp = CacheStamp::at(clock());

    let serialized = serde_json::to_string(&all).map_err(|e| Error::parse("dataset", e))?;
    store.set(&keys.data, &serialized)?;
    store.set(&keys.time, &stamp.encode())?;

    debug!(
        endpoint,
        data_key = %keys.data,
        rows = all.len(),
        stamp = stamp.millis(),
        "Stored fetched dataset"
    );

    Ok(Some(PagedData::new(all, request)))
}
