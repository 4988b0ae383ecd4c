use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use userdash::api::fetch_api_data_at;
use userdash::cache::{check_storage_data_at, FRESHNESS_WINDOW_MS};
use userdash::{
    check_storage_data, fetch_api_data, find_user, CacheKeys, DataLoader, DataSource, Error,
    Fetch, FetchResponse, FileStore, KeyValueStore, PageRequest, PagedData, User, UserStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u32,
}

/// Hands out queued responses in order
struct ScriptedFetch {
    responses: Mutex<VecDeque<FetchResponse>>,
}

impl ScriptedFetch {
    fn new(responses: Vec<(u16, &str)>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| FetchResponse::new(status, body))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn request(&self, _url: &str) -> userdash::Result<FetchResponse> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left"))
    }
}

fn file_store() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::with_dir(temp_dir.path().to_path_buf()).unwrap();
    (store, temp_dir)
}

fn keys() -> CacheKeys {
    CacheKeys::new("items", "itemsFetchedAt")
}

#[tokio::test]
async fn test_example_page_two_of_three() {
    let (store, _temp) = file_store();
    let fetch = ScriptedFetch::new(vec![(200, r#"[{"id":1},{"id":2},{"id":3}]"#)]);

    let result: PagedData<Item> = fetch_api_data(
        &fetch,
        &store,
        "https://example.test/items",
        &keys(),
        PageRequest::new(2, 2).unwrap(),
    )
    .await
    .unwrap()
    .unwrap();

    let (all, page) = result.into_parts();
    assert_eq!(all, vec![Item { id: 1 }, Item { id: 2 }, Item { id: 3 }]);
    assert_eq!(page, vec![Item { id: 3 }]);
}

#[tokio::test]
async fn test_not_ok_leaves_empty_store_empty() {
    let (store, _temp) = file_store();
    let fetch = ScriptedFetch::new(vec![(500, "boom")]);

    let result: Option<PagedData<Item>> = fetch_api_data(
        &fetch,
        &store,
        "https://example.test/items",
        &keys(),
        PageRequest::new(1, 10).unwrap(),
    )
    .await
    .unwrap();

    assert!(result.is_none());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_fetch_then_read_round_trip() {
    let (store, _temp) = file_store();
    let fetch = ScriptedFetch::new(vec![(200, r#"[{"id":4},{"id":5}]"#)]);
    let request = PageRequest::new(1, 1).unwrap();

    let fetched: PagedData<Item> = fetch_api_data(&fetch, &store, "u", &keys(), request)
        .await
        .unwrap()
        .unwrap();

    let cached: PagedData<Item> = check_storage_data(&store, &keys(), request)
        .unwrap()
        .unwrap();

    assert_eq!(cached.all, fetched.all);
    assert_eq!(cached.page, vec![Item { id: 4 }]);
}

#[tokio::test]
async fn test_freshness_window_boundary_through_file_store() {
    let (store, _temp) = file_store();
    let fetch = ScriptedFetch::new(vec![(200, r#"[{"id":1}]"#)]);
    let request = PageRequest::new(1, 10).unwrap();
    let t = 1_700_000_000_000;

    let _: Option<PagedData<Item>> = fetch_api_data_at(&fetch, &store, "u", &keys(), request, || {
        Utc.timestamp_millis_opt(t).unwrap()
    })
    .await
    .unwrap();

    let just_before = Utc.timestamp_millis_opt(t + FRESHNESS_WINDOW_MS - 1).unwrap();
    let at_window = Utc.timestamp_millis_opt(t + FRESHNESS_WINDOW_MS).unwrap();

    let hit: Option<PagedData<Item>> =
        check_storage_data_at(&store, &keys(), request, just_before).unwrap();
    let miss: Option<PagedData<Item>> =
        check_storage_data_at(&store, &keys(), request, at_window).unwrap();

    assert!(hit.is_some());
    assert!(miss.is_none());
}

#[test]
fn test_missing_key_ignores_the_other() {
    let (store, _temp) = file_store();
    let request = PageRequest::new(1, 10).unwrap();

    store.set("items", r#"[{"id":1}]"#).unwrap();
    let result: Option<PagedData<Item>> = check_storage_data(&store, &keys(), request).unwrap();
    assert!(result.is_none());

    store.remove("items").unwrap();
    store
        .set("itemsFetchedAt", &Utc::now().timestamp_millis().to_string())
        .unwrap();
    let result: Option<PagedData<Item>> = check_storage_data(&store, &keys(), request).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_corrupt_stored_data_is_reported() {
    let (store, _temp) = file_store();
    store.set("items", "{not an array}").unwrap();
    store
        .set("itemsFetchedAt", &Utc::now().timestamp_millis().to_string())
        .unwrap();

    let result: userdash::Result<Option<PagedData<Item>>> =
        check_storage_data(&store, &keys(), PageRequest::new(1, 10).unwrap());

    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[tokio::test]
async fn test_second_fetch_replaces_first() {
    let (store, _temp) = file_store();
    let fetch = ScriptedFetch::new(vec![
        (200, r#"[{"id":1},{"id":2},{"id":3}]"#),
        (200, r#"[{"id":7}]"#),
    ]);
    let request = PageRequest::new(1, 10).unwrap();

    let _: Option<PagedData<Item>> = fetch_api_data(&fetch, &store, "u", &keys(), request)
        .await
        .unwrap();
    let _: Option<PagedData<Item>> = fetch_api_data(&fetch, &store, "u", &keys(), request)
        .await
        .unwrap();

    let cached: PagedData<Item> = check_storage_data(&store, &keys(), request)
        .unwrap()
        .unwrap();
    assert_eq!(cached.all, vec![Item { id: 7 }]);
}

#[test]
fn test_invalid_page_arguments() {
    assert!(matches!(
        PageRequest::new(0, 5),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        PageRequest::new(3, 0),
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_loader_serves_users_from_cache_after_first_fetch() {
    let (store, _temp) = file_store();
    let body = r#"[
        {"id": "1", "orgName": "Lendsqr", "userName": "grace", "status": "active"},
        {"id": "2", "orgName": "Irorun", "userName": "tosin", "status": "blacklisted"},
        {"id": 3, "orgName": "Lendstar", "userName": "debby", "status": "pending"}
    ]"#;
    // A second fetch would panic: only one response is scripted
    let loader = DataLoader::new(store, ScriptedFetch::new(vec![(200, body)]));
    let keys = CacheKeys::new("users", "usersFetchedAt");
    let request = PageRequest::new(2, 2).unwrap();

    let first = loader
        .load_page::<User>("u", &keys, request, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.source, DataSource::Network);
    assert_eq!(first.data.page.len(), 1);
    assert_eq!(first.data.page[0].id, "3");

    let second = loader
        .load_page::<User>("u", &keys, request, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.source, DataSource::Cache);

    let tosin = find_user(&second.data.all, "2").unwrap();
    assert_eq!(tosin.status, UserStatus::Blacklisted);
    assert_eq!(tosin.org_name.as_deref(), Some("Irorun"));
}
