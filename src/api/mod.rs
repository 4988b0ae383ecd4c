//! Remote side of the cache: fetching datasets over HTTP.

mod client;
mod fetcher;

pub use client::{Fetch, FetchResponse, HttpFetcher};
pub use fetcher::{fetch_api_data, fetch_api_data_at};
