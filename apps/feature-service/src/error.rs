//! # Feature Service エラー定義
//!
//! サービス境界まで到達しうる失敗をひとつの閉じた型 [`ApiError`] にまとめる。
//!
//! ハンドラは失敗のレスポンスボディを組み立てない。
//! [`IntoResponse`] はステータスだけを設定し、[`PendingFailure`] を付けて返す。
//! ボディは [`boundary::translate_failures`](crate::boundary::translate_failures)
//! がリクエスト情報と時刻を添えて一度だけ書き込む。

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crudkit_domain::DomainError;
use crudkit_infra::InfraError;
use thiserror::Error;

use crate::boundary;

/// サービス境界まで伝播する失敗
#[derive(Debug, Error)]
pub enum ApiError {
    /// 予期された業務上の失敗
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// HTTP 層の失敗（抽出器の rejection、未定義ルート）
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 永続化層の失敗
    #[error(transparent)]
    Persistence(#[from] InfraError),

    /// 想定外の失敗（panic を含む）
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// HTTP 層で発生した失敗
///
/// ステータス・コード・メッセージは変換器でそのまま使われる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub status:  StatusCode,
    pub code:    &'static str,
    pub message: String,
}

impl TransportError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

/// 境界変換器がまだ処理していない失敗
///
/// [`ApiError::into_response`] がレスポンスの extensions に入れ、
/// 変換器が取り出して消費する。
#[derive(Debug, Clone)]
pub struct PendingFailure(Arc<ApiError>);

impl PendingFailure {
    pub fn error(&self) -> &ApiError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = boundary::classify(&self).status;
        let mut response = status.into_response();
        response
            .extensions_mut()
            .insert(PendingFailure(Arc::new(self)));
        response
    }
}

// ===== 抽出器 rejection からの変換 =====

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match &rejection {
            JsonRejection::JsonSyntaxError(_) => "MALFORMED_JSON",
            JsonRejection::MissingJsonContentType(_) => "UNSUPPORTED_MEDIA_TYPE",
            _ => "INVALID_REQUEST_BODY",
        };
        TransportError::new(rejection.status(), code, rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        TransportError::new(
            rejection.status(),
            "INVALID_PATH_PARAMETER",
            rejection.body_text(),
        )
        .into()
    }
}
