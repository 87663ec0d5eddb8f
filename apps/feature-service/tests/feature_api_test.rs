//! # Feature API のテスト
//!
//! インメモリリポジトリで Router 全体を通し、成功レスポンスの形と
//! 業務上の失敗（ドメインエラー）のレスポンスを検証する。

mod common;

use common::{TEST_TIMESTAMP, delete, get, in_memory_app, json_request, send};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn create(app: &axum::Router, key: &str) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/v1/features",
            &json!({ "key": key, "name": "Dark mode", "description": "夜間表示" }),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["data"].clone()
}

#[tokio::test]
async fn test_ヘルスチェックはhealthyを返す() {
    let app = in_memory_app();

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_作成したfeatureはdataエンベロープで返る() {
    let app = in_memory_app();

    let created = create(&app, "dark-mode").await;

    assert_eq!(created["key"], "dark-mode");
    assert_eq!(created["name"], "Dark mode");
    assert_eq!(created["description"], "夜間表示");
    assert_eq!(created["enabled"], false);
    assert_eq!(created["archived"], false);
    assert_eq!(created["version"], 1);
    assert_eq!(created["createdAt"], TEST_TIMESTAMP);
    assert_eq!(created["updatedAt"], TEST_TIMESTAMP);
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_一覧と取得で作成したfeatureを返す() {
    let app = in_memory_app();
    let first = create(&app, "alpha").await;
    create(&app, "beta").await;

    let list = send(&app, get("/api/v1/features")).await;
    let id = first["id"].as_str().unwrap();
    let single = send(&app, get(&format!("/api/v1/features/{id}"))).await;

    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(single.status, StatusCode::OK);
    assert_eq!(single.body["data"], first);
}

#[tokio::test]
async fn test_patchで有効化しバージョンが進む() {
    let app = in_memory_app();
    let created = create(&app, "dark-mode").await;
    let uri = format!("/api/v1/features/{}", created["id"].as_str().unwrap());

    let response = send(
        &app,
        json_request(
            "PATCH",
            &uri,
            &json!({ "expectedVersion": 1, "enabled": true, "description": null }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["enabled"], true);
    assert_eq!(response.body["data"]["version"], 2);
    assert_eq!(response.body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn test_deleteは204で以後は見つからない() {
    let app = in_memory_app();
    let created = create(&app, "dark-mode").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/features/{id}");

    let deleted = send(&app, delete(&uri)).await;
    let after = send(&app, get(&uri)).await;

    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(deleted.body, Value::Null);
    assert_eq!(after.status, StatusCode::NOT_FOUND);
    assert_eq!(after.body["code"], "FEATURE_NOT_FOUND");
}

// ===== ドメインエラー =====

#[tokio::test]
async fn test_存在しないfeatureは正規化された404を返す() {
    let app = in_memory_app();

    let response = send(&app, get("/api/v1/features/abc123")).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({
            "code": "FEATURE_NOT_FOUND",
            "message": "Feature with id \"abc123\" not found",
            "details": { "featureId": "abc123" },
            "timestamp": TEST_TIMESTAMP,
            "path": "/api/v1/features/abc123",
        })
    );
}

#[tokio::test]
async fn test_key重複は409_feature_key_conflict() {
    let app = in_memory_app();
    create(&app, "dark-mode").await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/features",
            &json!({ "key": "dark-mode", "name": "Another" }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["code"], "FEATURE_KEY_CONFLICT");
    assert_eq!(response.body["details"], json!({ "key": "dark-mode" }));
}

#[tokio::test]
async fn test_不正なkeyは400でフィールドを示す() {
    let app = in_memory_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/features",
            &json!({ "key": "Dark Mode", "name": "Dark mode" }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
    assert_eq!(response.body["details"], json!({ "field": "key" }));
    assert_eq!(response.body["path"], "/api/v1/features");
}

#[tokio::test]
async fn test_古いバージョンの更新は409_version_conflict() {
    let app = in_memory_app();
    let created = create(&app, "dark-mode").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/features/{id}");
    send(
        &app,
        json_request("PATCH", &uri, &json!({ "expectedVersion": 1, "enabled": true })),
    )
    .await;

    let response = send(
        &app,
        json_request("PATCH", &uri, &json!({ "expectedVersion": 1, "enabled": false })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body["details"],
        json!({ "featureId": id, "expectedVersion": 1, "actualVersion": 2 })
    );
}

#[tokio::test]
async fn test_アーカイブ済みの有効化は422_feature_archived() {
    let app = in_memory_app();
    let created = create(&app, "dark-mode").await;
    let uri = format!("/api/v1/features/{}", created["id"].as_str().unwrap());
    send(
        &app,
        json_request("PATCH", &uri, &json!({ "expectedVersion": 1, "archived": true })),
    )
    .await;

    let response = send(
        &app,
        json_request("PATCH", &uri, &json!({ "expectedVersion": 2, "enabled": true })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["code"], "FEATURE_ARCHIVED");
}

#[tokio::test]
async fn test_空の更新は400_validation_errorでdetailsを持たない() {
    let app = in_memory_app();
    let created = create(&app, "dark-mode").await;
    let uri = format!("/api/v1/features/{}", created["id"].as_str().unwrap());

    let response = send(&app, json_request("PATCH", &uri, &json!({ "expectedVersion": 1 }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
    assert!(response.body.get("details").is_none());
}
