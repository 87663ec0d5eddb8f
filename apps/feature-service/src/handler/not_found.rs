//! # ルーティング失敗のハンドラ
//!
//! axum 既定の空ボディ 404 / 405 の代わりに [`TransportError`] を返し、
//! 他の失敗と同じ形式で境界変換器に処理させる。

use axum::http::{Method, StatusCode, Uri};

use crate::error::{ApiError, TransportError};

/// `Router::fallback` 用
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    TransportError::new(
        StatusCode::NOT_FOUND,
        "ROUTE_NOT_FOUND",
        format!("Route {method} {} not found", uri.path()),
    )
    .into()
}

/// `Router::method_not_allowed_fallback` 用
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    TransportError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        format!("Method {method} is not allowed for {}", uri.path()),
    )
    .into()
}
