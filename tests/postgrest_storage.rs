mod common;

use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{owner, session};
use taskmaster::auth::SharedSession;
use taskmaster::error::Error;
use taskmaster::model::{ItemDraft, ItemId, ItemKind, ItemPatch, Priority};
use taskmaster::postgrest::{PostgrestClient, PostgrestStorage, TableSchema};
use taskmaster::storage::ItemStorage;

const ANON_KEY: &str = "anon-key";

fn storage(server: &MockServer, table: &str, schema: TableSchema) -> PostgrestStorage {
    let client = PostgrestClient::new(&server.uri(), ANON_KEY, table, Client::new());
    PostgrestStorage::new(client, schema, session())
}

fn task_row(id: Uuid, title: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": owner(),
        "title": title,
        "description": null,
        "completed": completed,
        "priority": "high",
        "due_date": "2024-06-03",
        "created_at": "2024-06-01T09:00:00Z",
        "updated_at": "2024-06-01T09:30:00Z",
    })
}

#[tokio::test]
async fn list_filters_by_owner_newest_first_as_the_user() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("select", "*"))
        .and(query_param("user_id", format!("eq.{}", owner()).as_str()))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", ANON_KEY))
        .and(header("Authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_row(id, "Ship", false)])))
        .expect(1)
        .mount(&server)
        .await;

    let items = storage(&server, "tasks", TableSchema::Tasks)
        .list(owner())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ItemId(id));
    assert_eq!(items[0].priority(), Some(Priority::High));
    assert_eq!(
        items[0].target_date,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
    );
}

#[tokio::test]
async fn insert_sends_table_columns_and_returns_the_stored_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/tasks"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({
            "user_id": owner(),
            "title": "Ship",
            "description": "release 1.2",
            "completed": false,
            "priority": "high",
            "due_date": null,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([task_row(id, "Ship", false)])))
        .expect(1)
        .mount(&server)
        .await;

    let draft = ItemDraft::task(" Ship ", Priority::High).with_description("release 1.2");
    let item = storage(&server, "tasks", TableSchema::Tasks)
        .insert(draft.into_new_item(owner()))
        .await
        .unwrap();

    assert_eq!(item.id, ItemId(id));
    assert_eq!(item.title, "Ship");
}

#[tokio::test]
async fn medicine_rows_map_onto_items() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/medicines"))
        .and(body_json(json!({
            "user_id": owner(),
            "name": "Ibuprofen",
            "barcode": "4006381333931",
            "expiry_date": "2025-01-31",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": id,
            "user_id": owner(),
            "name": "Ibuprofen",
            "barcode": "4006381333931",
            "expiry_date": "2025-01-31",
            "date_added": "2024-06-01T09:00:00+00:00",
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let expiry = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let draft = ItemDraft::medicine("Ibuprofen", expiry).with_barcode("4006381333931");
    let item = storage(&server, "medicines", TableSchema::Medicines)
        .insert(draft.into_new_item(owner()))
        .await
        .unwrap();

    assert_eq!(item.title, "Ibuprofen");
    assert_eq!(item.target_date, Some(expiry));
    assert_eq!(item.updated_at, item.created_at);
    assert_eq!(
        item.kind,
        ItemKind::Medicine {
            barcode: Some("4006381333931".to_string())
        }
    );
}

#[tokio::test]
async fn patch_sends_only_changed_columns() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_row(id, "Ship", true)])))
        .expect(1)
        .mount(&server)
        .await;

    let item = storage(&server, "tasks", TableSchema::Tasks)
        .patch(ItemId(id), &ItemPatch::completed(true))
        .await
        .unwrap();
    assert!(item.is_completed());
}

#[tokio::test]
async fn patch_matching_no_row_is_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = storage(&server, "tasks", TableSchema::Tasks)
        .patch(ItemId(id), &ItemPatch::title("Renamed"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(missing) if missing == ItemId(id)));
}

#[tokio::test]
async fn medicine_patch_rejects_task_fields_without_a_request() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = storage(&server, "medicines", TableSchema::Medicines)
        .patch(ItemId::new_v4(), &ItemPatch::completed(true))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn remove_deletes_by_id_with_minimal_return() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .and(header("Prefer", "return=minimal"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    storage(&server, "tasks", TableSchema::Tasks)
        .remove(ItemId(id))
        .await
        .unwrap();
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })),
        )
        .mount(&server)
        .await;

    let err = storage(&server, "tasks", TableSchema::Tasks)
        .list(owner())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("JWT expired"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn missing_session_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = PostgrestClient::new(&server.uri(), ANON_KEY, "tasks", Client::new());
    let storage = PostgrestStorage::new(
        client,
        TableSchema::Tasks,
        Arc::new(SharedSession::default()),
    );
    assert!(matches!(
        storage.list(owner()).await,
        Err(Error::Unauthenticated)
    ));
}
