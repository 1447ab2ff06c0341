//! Cache load/update sequencing through `ErpClient`.
//!
//! wiremock's call expectations pin down how many load and update requests
//! each helper issues.

use std::sync::Arc;

use erplookup::{CacheRefresh, Entity, EntityCache, ErpClient, ErpError, InvItem, QueryApi};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOAD_PATH: &str = "/companies/1/cache/InvItem";
const CHANGES_PATH: &str = "/companies/1/cache/InvItem/changes";

fn client(server: &MockServer) -> ErpClient {
    ErpClient::new("test-token", &server.uri(), 1).unwrap()
}

fn items() -> serde_json::Value {
    json!({
        "rows": [
            {"RowId": 11, "KeyStr": "BOLT-10", "Name": "Bolt 10mm"},
            {"RowId": 12, "KeyStr": "NUT-10", "Name": "Nut 10mm"}
        ]
    })
}

async fn mount_load(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path(LOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(items()))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_changes(server: &MockServer, body: serde_json::Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(CHANGES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cold_cache_loads_once_without_update() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 1).await;
    mount_changes(&mock_server, json!({}), 0).await;

    let client = client(&mock_server);
    assert!(!client.has_cache(InvItem::ENTITY_TYPE));

    let cache = InvItem::get_and_refresh_cache(&client).await.unwrap();

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.entity_type(), InvItem::ENTITY_TYPE);
    assert!(client.has_cache(InvItem::ENTITY_TYPE));
}

#[tokio::test]
async fn test_warm_cache_updates_once_without_load() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 1).await;
    mount_changes(
        &mock_server,
        json!({
            "rows": [{"RowId": 12, "KeyStr": "NUT-10", "Name": "Hex nut 10mm"}],
            "deleted": [11]
        }),
        1,
    )
    .await;

    let client = client(&mock_server);
    InvItem::get_and_refresh_cache(&client).await.unwrap();

    let cache = InvItem::get_and_refresh_cache(&client).await.unwrap();

    assert_eq!(cache.len(), 1);
    assert!(cache.get::<InvItem>(11).is_none());
    assert_eq!(
        cache.get_by_key::<InvItem>("NUT-10").map(|i| i.name),
        Some("Hex nut 10mm".to_string())
    );
}

#[tokio::test]
async fn test_reset_during_update_falls_back_to_load() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 2).await;
    mount_changes(&mock_server, json!({"reset": true}), 1).await;

    let client = client(&mock_server);
    let first = InvItem::get_and_refresh_cache(&client).await.unwrap();

    let second = InvItem::get_and_refresh_cache(&client).await.unwrap();

    assert_eq!(second.len(), 2);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_refresh_cache_matches_get_and_refresh() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 2).await;

    let refreshed = client(&mock_server);
    let fetched = client(&mock_server);

    InvItem::refresh_cache(&refreshed).await.unwrap();
    let handle = InvItem::get_and_refresh_cache(&fetched).await.unwrap();

    let cached = refreshed
        .get_cache(InvItem::ENTITY_TYPE)
        .expect("refresh_cache should populate the cache");
    assert_eq!(cached.len(), handle.len());
    assert_eq!(
        cached.rows::<InvItem>().iter().map(|i| i.row_id).collect::<Vec<_>>(),
        handle.rows::<InvItem>().iter().map(|i| i.row_id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_handles_are_snapshots() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 1).await;
    mount_changes(
        &mock_server,
        json!({"rows": [{"RowId": 13, "KeyStr": "WASHER-10", "Name": "Washer 10mm"}]}),
        1,
    )
    .await;

    let client = client(&mock_server);
    let before: Arc<EntityCache> = InvItem::get_and_refresh_cache(&client).await.unwrap();

    InvItem::refresh_cache(&client).await.unwrap();
    let after = client.get_cache(InvItem::ENTITY_TYPE).unwrap();

    assert_eq!(before.len(), 2);
    assert_eq!(after.len(), 3);
    assert!(after.loaded_at() >= before.loaded_at());
}

#[tokio::test]
async fn test_update_failure_propagates_without_load() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path(CHANGES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    InvItem::get_and_refresh_cache(&client).await.unwrap();

    let err = InvItem::refresh_cache(&client).await.unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert!(matches!(err, ErpError::ApiError { ref message, .. } if message == "maintenance"));
    // the previous snapshot stays registered
    assert_eq!(client.get_cache(InvItem::ENTITY_TYPE).map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn test_null_rows_load_as_empty_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": null})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = InvItem::get_and_refresh_cache(&client(&mock_server))
        .await
        .unwrap();
    assert!(cache.is_empty());

    let refreshed = client(&mock_server);
    InvItem::refresh_cache(&refreshed).await.unwrap();
    assert_eq!(refreshed.get_cache(InvItem::ENTITY_TYPE).map(|c| c.len()), Some(0));
}

#[tokio::test]
async fn test_null_rows_in_changes_keep_cached_rows() {
    let mock_server = MockServer::start().await;
    mount_load(&mock_server, 1).await;
    mount_changes(&mock_server, json!({"rows": null, "deleted": [12]}), 1).await;

    let client = client(&mock_server);
    InvItem::get_and_refresh_cache(&client).await.unwrap();

    let cache = InvItem::get_and_refresh_cache(&client).await.unwrap();

    assert_eq!(cache.len(), 1);
    assert!(cache.get::<InvItem>(11).is_some());
}
