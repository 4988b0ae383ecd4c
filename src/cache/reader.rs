use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CacheKeys, CacheStamp, KeyValueStore};
use crate::error::{Error, Result};
use crate::models::{PageRequest, PagedData};

/// Look up a previously fetched dataset and return the requested page of it.
///
/// Returns `Ok(None)` when either key is missing or empty, when the stored
/// timestamp is not an integer, or when the data is 24 hours old or older.
/// A stored dataset that isn't valid JSON is an error, never a miss.
pub fn check_storage_data<T, S>(
    store: &S,
    keys: &CacheKeys,
    request: PageRequest,
) -> Result<Option<PagedData<T>>>
where
    T: DeserializeOwned + Clone,
    S: KeyValueStore + ?Sized,
{
    check_storage_data_at(store, keys, request, Utc::now())
}

/// Same as [`check_storage_data`], judging freshness against `now`
pub fn check_storage_data_at<T, S>(
    store: &S,
    keys: &CacheKeys,
    request: PageRequest,
    now: DateTime<Utc>,
) -> Result<Option<PagedData<T>>>
where
    T: DeserializeOwned + Clone,
    S: KeyValueStore + ?Sized,
{
    let stored_data = non_empty(store.get(&keys.data));
    let stored_time = non_empty(store.get(&keys.time));

    let (Some(stored_data), Some(stored_time)) = (stored_data, stored_time) else {
        debug!(data_key = %keys.data, time_key = %keys.time, "No cached dataset");
        return Ok(None);
    };

    let all: Vec<T> =
        serde_json::from_str(&stored_data).map_err(|e| Error::parse("stored dataset", e))?;

    let Some(stamp) = CacheStamp::parse(&stored_time) else {
        debug!(time_key = %keys.time, value = %stored_time, "Unreadable cache timestamp, treating as stale");
        return Ok(None);
    };

    if !stamp.is_fresh(now) {
        debug!(
            data_key = %keys.data,
            elapsed_ms = stamp.elapsed_ms(now),
            "Cached dataset is stale"
        );
        return Ok(None);
    }

    debug!(data_key = %keys.data, rows = all.len(), "Serving dataset from cache");
    Ok(Some(PagedData::new(all, request)))
}

/// When the dataset under `keys` was stored, if both keys are present
pub fn stored_stamp<S>(store: &S, keys: &CacheKeys) -> Option<CacheStamp>
where
    S: KeyValueStore + ?Sized,
{
    non_empty(store.get(&keys.data))?;
    CacheStamp::parse(&non_empty(store.get(&keys.time))?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
