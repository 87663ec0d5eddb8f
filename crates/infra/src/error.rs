//! # インフラ層エラー定義
//!
//! 永続化層で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: 境界変換器が区別する種別（一意制約違反、レコードなし、競合）と
//!   それ以外のデータベースエラー
//!
//! `From<sqlx::Error>` や convenience constructor でエラーを生成すると、
//! その時点のスパン情報が自動的にキャプチャされる。

use std::fmt;

use derive_more::Display;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// 種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::UniqueViolation { field, .. } => { /* 409 */ }
///     InfraErrorKind::RecordNotFound => { /* 404 */ }
///     _ => { /* 500 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 一意制約違反
    ///
    /// `field` は PostgreSQL の detail（`Key (column)=...`）から取り出す。
    /// detail が無い場合は既定命名 `{table}_{column}_key` の制約名から、
    /// 一意に決まるときだけ導出する。
    #[error("一意制約違反: constraint={constraint:?}, field={field:?}")]
    UniqueViolation {
        constraint: Option<String>,
        field:      Option<String>,
    },

    /// 対象レコードが存在しない
    #[error("レコードが見つかりません")]
    RecordNotFound,

    /// 楽観的ロック競合（UPDATE 時のバージョン不一致）
    ///
    /// ユースケース層で最新バージョンを再取得し、ドメインエラーに変換する。
    #[error("競合が発生しました: {entity}(id={id})")]
    Conflict { entity: String, id: String },

    /// その他のデータベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// 上記に分類できない予期しないエラー（DB 値の復元失敗など）
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Conflict バリアントの場合、entity と id を返す
    pub fn as_conflict(&self) -> Option<(&str, &str)> {
        match &self.kind {
            InfraErrorKind::Conflict { entity, id } => Some((entity, id)),
            _ => None,
        }
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind, InfraErrorKind::RecordNotFound)
    }

    // ===== Convenience constructors =====

    fn with_kind(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    /// 一意制約違反エラーを生成する
    pub fn unique_violation(constraint: Option<&str>, field: Option<&str>) -> Self {
        Self::with_kind(InfraErrorKind::UniqueViolation {
            constraint: constraint.map(str::to_string),
            field:      field.map(str::to_string),
        })
    }

    pub fn record_not_found() -> Self {
        Self::with_kind(InfraErrorKind::RecordNotFound)
    }

    /// 楽観的ロック競合エラーを生成する
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::with_kind(InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        })
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::with_kind(InfraErrorKind::Unexpected(msg.into()))
    }
}

/// PostgreSQL の一意制約違反の detail（`Key (email)=(a@example.com) already exists.`）から
/// カラム名を取り出す
///
/// 複合キー（`Key (a, b)=...`）は単一のフィールドに特定できないため `None`。
pub(crate) fn field_from_detail(detail: &str) -> Option<String> {
    let rest = detail.strip_prefix("Key (")?;
    let (columns, _) = rest.split_once(")=(")?;
    let column = columns.trim();
    (!column.is_empty() && !column.contains(',')).then(|| column.to_string())
}

/// PostgreSQL の既定制約名 `{table}_{column}_key` からカラム名を取り出す
///
/// detail が得られない場合のフォールバック。テーブル名とカラム名の境界が
/// 一意に決まる（アンダースコアがちょうど 1 つ）場合のみ導出し、それ以外は `None`。
pub(crate) fn field_from_constraint(constraint: &str) -> Option<String> {
    let rest = constraint.strip_suffix("_key")?;
    let (table, column) = rest.split_once('_')?;
    (!table.is_empty() && !column.is_empty() && !column.contains('_'))
        .then(|| column.to_string())
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        let kind = match source {
            sqlx::Error::RowNotFound => InfraErrorKind::RecordNotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().map(str::to_string);
                let field = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(PgDatabaseError::detail)
                    .and_then(field_from_detail)
                    .or_else(|| constraint.as_deref().and_then(field_from_constraint));
                InfraErrorKind::UniqueViolation { constraint, field }
            }
            other => InfraErrorKind::Database(other),
        };
        Self::with_kind(kind)
    }
}
