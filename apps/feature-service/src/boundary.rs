//! # 境界変換器
//!
//! サービス境界に到達したすべての失敗を、正規化されたエラーレスポンス
//! （[`ErrorResponse`]）に変換する唯一の場所。
//!
//! ## 分類（先に一致したものを採用）
//!
//! | 入力 | ステータス | code | message |
//! |------|-----------|------|---------|
//! | `Domain` | 各エラーの `http_status` | `kind` | エラーの message |
//! | `Transport` | そのまま | そのまま | そのまま |
//! | `Persistence` 一意制約違反 | 409 | `CONFLICT` | `Resource already exists` |
//! | `Persistence` レコードなし | 404 | `NOT_FOUND` | `Resource not found` |
//! | `Persistence` 楽観的ロック競合 | 409 | `CONFLICT` | `Resource was modified concurrently` |
//! | `Persistence` その他 | 500 | `DATABASE_ERROR` | `Database error` |
//! | `Unexpected` | 500 | `INTERNAL_ERROR` | `Internal server error` |
//!
//! `Unexpected` のみ `tracing::error!` で記録する。元のメッセージはレスポンスに含めない。
//!
//! ## 組み込み
//!
//! [`translate_failures`] を `from_fn_with_state` で Router に 1 回だけ登録する。
//! ハンドラが返したレスポンスに [`PendingFailure`] が付いていれば取り除いて
//! 変換し、付いていなければそのまま返す。

use std::{borrow::Cow, sync::Arc};

use axum::{
    Json,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use crudkit_domain::{DomainErrorPayload, clock::Clock};
use crudkit_infra::InfraErrorKind;
use crudkit_shared::{
    ErrorDetails,
    ErrorResponse,
    error_response::code,
    observability::REQUEST_ID_HEADER,
};
use serde_json::json;
use tower_http::request_id::RequestId;

use crate::error::{ApiError, PendingFailure};

/// 変換に使うリクエスト情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub method:     Method,
    pub path:       String,
    pub request_id: Option<String>,
}

impl RequestMeta {
    /// リクエストから取り出す
    ///
    /// Request ID は `SetRequestIdLayer` が設定した extension を優先し、
    /// 無ければヘッダーを見る。
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(RequestId::header_value)
            .or_else(|| request.headers().get(REQUEST_ID_HEADER))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            request_id,
        }
    }
}

/// 失敗の分類結果（`timestamp` と `path` を付ける前）
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status:  StatusCode,
    pub code:    Cow<'static, str>,
    pub message: Cow<'static, str>,
    pub details: Option<ErrorDetails>,
}

impl Classification {
    fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code: Cow::Borrowed(code),
            message: Cow::Borrowed(message),
            details: None,
        }
    }

    fn with_details(mut self, details: Option<ErrorDetails>) -> Self {
        self.details = details;
        self
    }
}

/// 失敗を分類する
///
/// 純粋関数。ログ出力は [`translate`] が行う。
pub fn classify(error: &ApiError) -> Classification {
    match error {
        ApiError::Domain(e) => {
            let DomainErrorPayload {
                kind,
                message,
                metadata,
            } = e.payload();
            Classification {
                status:  StatusCode::from_u16(e.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                code:    Cow::Owned(kind),
                message: Cow::Owned(message),
                details: metadata,
            }
        }
        ApiError::Transport(e) => Classification {
            status:  e.status,
            code:    Cow::Borrowed(e.code),
            message: Cow::Owned(e.message.clone()),
            details: None,
        },
        ApiError::Persistence(e) => classify_persistence(e.kind()),
        ApiError::Unexpected(_) => Classification::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            code::INTERNAL_ERROR,
            "Internal server error",
        ),
    }
}

fn classify_persistence(kind: &InfraErrorKind) -> Classification {
    match kind {
        InfraErrorKind::UniqueViolation { field, .. } => {
            let details = field
                .as_ref()
                .map(|field| ErrorDetails::from([("field".to_string(), json!(field))]));
            Classification::new(
                StatusCode::CONFLICT,
                code::CONFLICT,
                "Resource already exists",
            )
            .with_details(details)
        }
        InfraErrorKind::RecordNotFound => Classification::new(
            StatusCode::NOT_FOUND,
            code::NOT_FOUND,
            "Resource not found",
        ),
        InfraErrorKind::Conflict { .. } => Classification::new(
            StatusCode::CONFLICT,
            code::CONFLICT,
            "Resource was modified concurrently",
        ),
        InfraErrorKind::Database(_) | InfraErrorKind::Unexpected(_) => Classification::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            code::DATABASE_ERROR,
            "Database error",
        ),
    }
}

/// 失敗をステータスと正規化ボディに変換する
pub fn translate(
    error: &ApiError,
    meta: &RequestMeta,
    now: DateTime<Utc>,
) -> (StatusCode, ErrorResponse) {
    if let ApiError::Unexpected(source) = error {
        tracing::error!(
            method = %meta.method,
            path = %meta.path,
            request_id = meta.request_id.as_deref().unwrap_or("-"),
            error = %format!("{source:#}"),
            "予期しないエラーが発生しました"
        );
    }

    let Classification {
        status,
        code,
        message,
        details,
    } = classify(error);
    let body = ErrorResponse::new(code, message, now, meta.path.as_str()).with_details(details);
    (status, body)
}

/// 境界変換器の状態
#[derive(Clone)]
pub struct BoundaryState {
    pub clock: Arc<dyn Clock>,
}

/// 失敗レスポンスを正規化するミドルウェア
///
/// `from_fn_with_state(BoundaryState { .. }, translate_failures)` で登録する。
pub async fn translate_failures(
    State(state): State<BoundaryState>,
    request: Request,
    next: Next,
) -> Response {
    let meta = RequestMeta::from_request(&request);
    let mut response = next.run(request).await;

    let Some(pending) = response.extensions_mut().remove::<PendingFailure>() else {
        return response;
    };

    let (status, body) = translate(pending.error(), &meta, state.clock.now());
    (status, Json(body)).into_response()
}
