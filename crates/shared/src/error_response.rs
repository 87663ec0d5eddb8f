//! # エラーレスポンス
//!
//! 全エンドポイントで共通の失敗レスポンス形式を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の境界変換器の責務（shared に axum 依存を入れない）
//! - 分類できない失敗のための固定コードは [`code`] にまとめ、文字列のハードコードを排除
//!
//! ## JSON 形状
//!
//! ```json
//! {
//!   "code": "FEATURE_NOT_FOUND",
//!   "message": "Feature with id \"abc123\" not found",
//!   "details": { "featureId": "abc123" },
//!   "timestamp": "2026-01-15T10:00:00Z",
//!   "path": "/api/v1/features/abc123"
//! }
//! ```
//!
//! `details` は空でない場合のみ出力される。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `details` フィールドの型
///
/// キー順序を安定させるため `BTreeMap` を使う。
pub type ErrorDetails = BTreeMap<String, serde_json::Value>;

/// 境界変換器が使用するフォールバックコード
pub mod code {
    /// 分類できない失敗
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    /// 永続化層の未知の失敗
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    /// 一意制約違反
    pub const CONFLICT: &str = "CONFLICT";
    /// レコードが存在しない
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

/// 正規化されたエラーレスポンス
///
/// 失敗したリクエストごとに境界変換器で一度だけ生成される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code:      String,
    pub message:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details:   Option<ErrorDetails>,
    pub timestamp: DateTime<Utc>,
    pub path:      String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ（`details` なし）
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp,
            path: path.into(),
        }
    }

    /// `details` を付与する
    ///
    /// 空のマップが渡された場合は `details` を付与しない。
    pub fn with_details(mut self, details: Option<ErrorDetails>) -> Self {
        self.details = details.filter(|d| !d.is_empty());
        self
    }
}
