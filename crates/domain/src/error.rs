//! # ドメイン層エラー定義
//!
//! ビジネスルール違反や入力検証の失敗など、**予期された**失敗を表現するエラー型。
//! プログラムの欠陥（panic、想定外の I/O 失敗）はここに含めない。
//!
//! ## 設計方針
//!
//! - **閉じた列挙型**: 境界変換器は具象型を知らなくても `kind` / `http_status` /
//!   `metadata` だけで変換できる
//! - **種別はバリアントで固定**: `kind` と `http_status` は `match` で決まり、
//!   インスタンスの値から計算されることはない
//! - **シリアライズ可能**: [`DomainError::payload`] がワイヤ表現の正本
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | バリアント | kind | HTTP ステータス | metadata |
//! |-----------|------|----------------|----------|
//! | `Validation` | `VALIDATION_ERROR` | 400 | `field`（指定時のみ） |
//! | `FeatureNotFound` | `FEATURE_NOT_FOUND` | 404 | `featureId` |
//! | `FeatureKeyConflict` | `FEATURE_KEY_CONFLICT` | 409 | `key` |
//! | `VersionConflict` | `VERSION_CONFLICT` | 409 | `featureId`, `expectedVersion`, `actualVersion` |
//! | `FeatureArchived` | `FEATURE_ARCHIVED` | 422 | `featureId` |
//!
//! ## 使用例
//!
//! ```rust
//! use crudkit_domain::DomainError;
//!
//! let error = DomainError::feature_not_found("abc123");
//! assert_eq!(error.kind(), "FEATURE_NOT_FOUND");
//! assert_eq!(error.http_status(), 404);
//! assert_eq!(error.to_string(), "Feature with id \"abc123\" not found");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// デバッグ用の構造化コンテキスト
pub type ErrorMetadata = BTreeMap<String, serde_json::Value>;

/// ドメイン層で発生するエラー
///
/// ユースケースはこのエラーを `Err` として返し、panic や早期脱出には使わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 入力値がビジネスルールに違反している
    ///
    /// `field` を指定した場合のみ metadata に `field` が入る。
    #[error("{message}")]
    Validation {
        message: String,
        field:   Option<String>,
    },

    /// 指定 ID の Feature が存在しない
    #[error("Feature with id \"{feature_id}\" not found")]
    FeatureNotFound { feature_id: String },

    /// Feature キーが既に使われている
    #[error("Feature key \"{key}\" is already in use")]
    FeatureKeyConflict { key: String },

    /// 楽観的ロックの失敗
    ///
    /// クライアントは最新データを再取得してから再度更新する必要がある。
    #[error(
        "Feature \"{feature_id}\" has been modified (expected version {expected}, current version {actual})"
    )]
    VersionConflict {
        feature_id: String,
        expected:   u32,
        actual:     u32,
    },

    /// アーカイブ済み Feature を有効化しようとした
    #[error("Feature \"{feature_id}\" is archived and cannot be enabled")]
    FeatureArchived { feature_id: String },
}

/// ドメインエラーのワイヤ表現
///
/// `metadata` が無い場合、キー自体を出力しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainErrorPayload {
    pub kind:     String,
    pub message:  String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ErrorMetadata>,
}

impl DomainError {
    /// フィールドを特定しないバリデーションエラー
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field:   None,
        }
    }

    /// 特定のフィールドに対するバリデーションエラー
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field:   Some(field.into()),
        }
    }

    pub fn feature_not_found(feature_id: impl Into<String>) -> Self {
        Self::FeatureNotFound {
            feature_id: feature_id.into(),
        }
    }

    /// 機械可読な種別（バリアントごとに一意）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::FeatureNotFound { .. } => "FEATURE_NOT_FOUND",
            Self::FeatureKeyConflict { .. } => "FEATURE_KEY_CONFLICT",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::FeatureArchived { .. } => "FEATURE_ARCHIVED",
        }
    }

    /// HTTP ステータスのヒント（400〜599）
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::FeatureNotFound { .. } => 404,
            Self::FeatureKeyConflict { .. } | Self::VersionConflict { .. } => 409,
            Self::FeatureArchived { .. } => 422,
        }
    }

    /// 構造化コンテキスト
    pub fn metadata(&self) -> Option<ErrorMetadata> {
        let entries = match self {
            Self::Validation { field: None, .. } => return None,
            Self::Validation {
                field: Some(field), ..
            } => vec![("field", json!(field))],
            Self::FeatureNotFound { feature_id } | Self::FeatureArchived { feature_id } => {
                vec![("featureId", json!(feature_id))]
            }
            Self::FeatureKeyConflict { key } => vec![("key", json!(key))],
            Self::VersionConflict {
                feature_id,
                expected,
                actual,
            } => vec![
                ("featureId", json!(feature_id)),
                ("expectedVersion", json!(expected)),
                ("actualVersion", json!(actual)),
            ],
        };

        Some(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    /// ワイヤ表現 `{kind, message, metadata?}` に変換する
    pub fn payload(&self) -> DomainErrorPayload {
        DomainErrorPayload {
            kind:     self.kind().to_string(),
            message:  self.to_string(),
            metadata: self.metadata(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DomainError::validation("name is required"), "VALIDATION_ERROR", 400)]
    #[case(
        DomainError::invalid_field("key", "key is invalid"),
        "VALIDATION_ERROR",
        400
    )]
    #[case(DomainError::feature_not_found("f-1"), "FEATURE_NOT_FOUND", 404)]
    #[case(
        DomainError::FeatureKeyConflict { key: "dark-mode".to_string() },
        "FEATURE_KEY_CONFLICT",
        409
    )]
    #[case(
        DomainError::VersionConflict { feature_id: "f-1".to_string(), expected: 1, actual: 2 },
        "VERSION_CONFLICT",
        409
    )]
    #[case(
        DomainError::FeatureArchived { feature_id: "f-1".to_string() },
        "FEATURE_ARCHIVED",
        422
    )]
    fn test_payloadのkindがバリアント固定の種別と一致する(
        #[case] error: DomainError,
        #[case] expected_kind: &str,
        #[case] expected_status: u16,
    ) {
        let json = serde_json::to_value(error.payload()).unwrap();

        assert_eq!(json["kind"], expected_kind);
        assert_eq!(error.kind(), expected_kind);
        assert_eq!(error.http_status(), expected_status);
        assert!((400..=599).contains(&error.http_status()));
    }

    #[test]
    fn test_metadataなしのバリデーションエラーはキーを出力しない() {
        let json = serde_json::to_value(DomainError::validation("bad input").payload()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "kind": "VALIDATION_ERROR", "message": "bad input" })
        );
    }

    #[test]
    fn test_フィールド指定のバリデーションエラーはfieldを出力する() {
        let payload = DomainError::invalid_field("name", "name is required").payload();

        assert_eq!(
            payload.metadata,
            Some(ErrorMetadata::from([(
                "field".to_string(),
                serde_json::json!("name")
            )]))
        );
    }

    #[test]
    fn test_feature_not_foundのメッセージとmetadata() {
        let payload = DomainError::feature_not_found("abc123").payload();

        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            serde_json::json!({
                "kind": "FEATURE_NOT_FOUND",
                "message": "Feature with id \"abc123\" not found",
                "metadata": { "featureId": "abc123" }
            })
        );
    }

    #[test]
    fn test_version_conflictのmetadataに両バージョンが入る() {
        let error = DomainError::VersionConflict {
            feature_id: "f-1".to_string(),
            expected:   3,
            actual:     4,
        };
        let metadata = error.metadata().unwrap();

        assert_eq!(metadata["expectedVersion"], 3);
        assert_eq!(metadata["actualVersion"], 4);
        assert_eq!(metadata["featureId"], "f-1");
    }
}
