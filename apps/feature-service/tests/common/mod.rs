//! テスト共通ヘルパー
//!
//! ルーターの構築、リクエスト送信、ログの捕捉を提供する。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::{
    io,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{Router, body::Body};
use chrono::{DateTime, TimeZone, Utc};
use crudkit_domain::{
    clock::FixedClock,
    feature::{Feature, FeatureId, FeatureKey, Version},
};
use crudkit_feature_service::app_builder::build_app;
use crudkit_infra::{
    InfraError,
    repository::{FeatureRepository, InMemoryFeatureRepository},
};
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// エラーレスポンスの `timestamp`（[`test_now`] の RFC 3339 表現）
pub const TEST_TIMESTAMP: &str = "2026-01-01T00:00:00Z";

/// インメモリリポジトリと固定時刻でルーターを構築する
pub fn in_memory_app() -> Router {
    app_with(Arc::new(InMemoryFeatureRepository::new()))
}

pub fn app_with(repository: Arc<dyn FeatureRepository>) -> Router {
    build_app(repository, Arc::new(FixedClock::new(test_now())))
}

/// レスポンスの要約
#[derive(Debug)]
pub struct TestResponse {
    pub status:  StatusCode,
    pub headers: HeaderMap,
    pub body:    Value,
}

/// リクエストを送信し、ボディを JSON として読む（空ボディは `Null`）
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    raw_json(method, uri, &body.to_string())
}

pub fn raw_json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ===== ログの捕捉 =====

/// fmt subscriber の出力先として使うバッファ
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// ERROR レベルのログを捕捉する subscriber をスレッドに設定する
///
/// `#[tokio::test]`（current_thread）内で使う。
pub fn capture_error_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::ERROR)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

// ===== 失敗を注入するリポジトリ =====

/// 注入する失敗
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// 一意制約違反（フィールドあり）
    UniqueViolation {
        constraint: &'static str,
        field:      &'static str,
    },
    /// レコードなし
    RecordNotFound,
    /// 分類できない永続化エラー
    Database(&'static str),
    /// panic
    Panic(&'static str),
}

impl Failure {
    fn raise(self) -> InfraError {
        match self {
            Self::UniqueViolation { constraint, field } => {
                InfraError::unique_violation(Some(constraint), Some(field))
            }
            Self::RecordNotFound => InfraError::record_not_found(),
            Self::Database(message) => InfraError::unexpected(message),
            Self::Panic(message) => panic!("{message}"),
        }
    }
}

/// すべての操作で同じ失敗を返すリポジトリ
///
/// `find_by_key` だけは「重複なし」を返し、作成処理を insert まで進める。
pub struct FailingRepository(pub Failure);

#[async_trait]
impl FeatureRepository for FailingRepository {
    async fn find_all(&self) -> Result<Vec<Feature>, InfraError> {
        Err(self.0.raise())
    }

    async fn find_by_id(&self, _id: &FeatureId) -> Result<Option<Feature>, InfraError> {
        Err(self.0.raise())
    }

    async fn find_by_key(&self, _key: &FeatureKey) -> Result<Option<Feature>, InfraError> {
        Ok(None)
    }

    async fn insert(&self, _feature: &Feature) -> Result<(), InfraError> {
        Err(self.0.raise())
    }

    async fn update(&self, _feature: &Feature, _expected: Version) -> Result<(), InfraError> {
        Err(self.0.raise())
    }

    async fn delete(&self, _id: &FeatureId) -> Result<(), InfraError> {
        Err(self.0.raise())
    }
}
