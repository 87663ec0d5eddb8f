//! # Feature
//!
//! 有効 / 無効を切り替えられるプロダクト機能を表すドメインモデル。
//! CRUD の題材として、エラー伝播パイプラインの全経路（検証失敗、存在しない ID、
//! キー重複、楽観的ロック失敗、業務ルール違反）を通る。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use crudkit_domain::feature::{Feature, FeatureDraft, FeaturePatch};
//!
//! let draft = FeatureDraft::parse("dark-mode", "Dark mode", None)?;
//! let feature = Feature::create(draft, chrono::Utc::now());
//! assert_eq!(feature.version().as_u32(), 1);
//!
//! let patch = FeaturePatch {
//!     enabled: Some(true),
//!     ..FeaturePatch::default()
//! };
//! let updated = feature.apply(patch, feature.version(), chrono::Utc::now())?;
//! assert!(updated.enabled());
//! assert_eq!(updated.version().as_u32(), 2);
//! # Ok(())
//! # }
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    DomainError,
    result::{DomainResult, chain, ensure, map},
};

// =========================================================================
// FeatureId
// =========================================================================

/// Feature の識別子
///
/// 生成時は UUID v7 の文字列を使う。検索時は不透明な文字列として扱うため、
/// UUID 形式でない ID も「存在しない」として正しく 404 になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{_0}")]
pub struct FeatureId(String);

impl FeatureId {
    /// 新しい ID を生成する（UUID v7）
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FeatureId {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// FeatureKey
// =========================================================================

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_-]{1,63}$").expect("FeatureKey の正規表現は常に有効")
});

/// Feature キー（値オブジェクト）
///
/// テナント内で一意なスラッグ。英小文字で始まり、英小文字・数字・`_`・`-` のみ、2〜64 文字。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{_0}")]
pub struct FeatureKey(String);

impl FeatureKey {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        map(
            ensure(KEY_PATTERN.is_match(&value), || {
                DomainError::invalid_field(
                    "key",
                    "key must start with a lowercase letter and contain only lowercase letters, digits, '_' or '-' (2-64 chars)",
                )
            }),
            |()| Self(value),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =========================================================================
// FeatureName / FeatureDescription
// =========================================================================

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Feature 名（値オブジェクト）
///
/// 前後の空白を除去した上で 1〜100 文字。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{_0}")]
pub struct FeatureName(String);

impl FeatureName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::invalid_field("name", "name is required"));
        }
        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::invalid_field(
                "name",
                format!("name must be at most {MAX_NAME_LENGTH} characters"),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Feature の説明（値オブジェクト）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{_0}")]
pub struct FeatureDescription(String);

impl FeatureDescription {
    /// 説明をパースする
    ///
    /// 未指定または空白のみの場合は `None` を返す。
    pub fn parse(value: Option<String>) -> DomainResult<Option<Self>> {
        let Some(value) = value.map(|v| v.trim().to_string()) else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }
        if value.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::invalid_field(
                "description",
                format!("description must be at most {MAX_DESCRIPTION_LENGTH} characters"),
            ));
        }

        Ok(Some(Self(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =========================================================================
// Version
// =========================================================================

/// 楽観的ロック用のバージョン（1 始まり）
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{_0}")]
pub struct Version(u32);

impl Version {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// 次のバージョン
    ///
    /// 上限（`u32::MAX`）に達している場合は更新できない。
    pub fn next(self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::validation("version has reached its upper limit"))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

// =========================================================================
// FeatureDraft / FeaturePatch
// =========================================================================

/// 検証済みの作成入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDraft {
    pub key:         FeatureKey,
    pub name:        FeatureName,
    pub description: Option<FeatureDescription>,
}

impl FeatureDraft {
    /// 生の入力を検証する
    ///
    /// 検証は key → name → description の順に行い、最初の失敗を返す。
    pub fn parse(
        key: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        chain(FeatureKey::new(key), |key| {
            chain(FeatureName::new(name), |name| {
                map(FeatureDescription::parse(description), |description| Self {
                    key,
                    name,
                    description,
                })
            })
        })
    }
}

/// 部分更新の入力
///
/// - `description`: 変更なしは `None`、削除は `Some(None)`
/// - `archived = Some(true)` にすると `enabled` は `false` になる
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturePatch {
    pub name:        Option<String>,
    pub description: Option<Option<String>>,
    pub enabled:     Option<bool>,
    pub archived:    Option<bool>,
}

impl FeaturePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.enabled.is_none()
            && self.archived.is_none()
    }
}

// =========================================================================
// Feature
// =========================================================================

/// DB 行から Feature を復元するための中間構造体
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub id:          FeatureId,
    pub key:         FeatureKey,
    pub name:        FeatureName,
    pub description: Option<FeatureDescription>,
    pub enabled:     bool,
    pub archived:    bool,
    pub version:     Version,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

/// Feature エンティティ
///
/// # 不変条件
///
/// - `archived` が `true` なら `enabled` は `false`
/// - 更新のたびに `version` が 1 増える
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    id:          FeatureId,
    key:         FeatureKey,
    name:        FeatureName,
    description: Option<FeatureDescription>,
    enabled:     bool,
    archived:    bool,
    version:     Version,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl Feature {
    /// 新しい Feature を作成する（無効状態で開始）
    pub fn create(draft: FeatureDraft, now: DateTime<Utc>) -> Self {
        Self {
            id:          FeatureId::new(),
            key:         draft.key,
            name:        draft.name,
            description: draft.description,
            enabled:     false,
            archived:    false,
            version:     Version::initial(),
            created_at:  now,
            updated_at:  now,
        }
    }

    /// データベースから復元する
    pub fn from_record(record: FeatureRecord) -> Self {
        Self {
            id:          record.id,
            key:         record.key,
            name:        record.name,
            description: record.description,
            enabled:     record.enabled && !record.archived,
            archived:    record.archived,
            version:     record.version,
            created_at:  record.created_at,
            updated_at:  record.updated_at,
        }
    }

    /// 部分更新を適用した新しい Feature を返す
    ///
    /// 1. バージョン一致の確認（不一致は `VersionConflict`）
    /// 2. 空のパッチを拒否
    /// 3. 各フィールドの検証とバージョンの繰り上げ
    /// 4. アーカイブ済み（またはこの更新でアーカイブされる）Feature の有効化を拒否
    pub fn apply(
        &self,
        patch: FeaturePatch,
        expected_version: Version,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure(self.version == expected_version, || {
            DomainError::VersionConflict {
                feature_id: self.id.to_string(),
                expected:   expected_version.as_u32(),
                actual:     self.version.as_u32(),
            }
        })?;
        ensure(!patch.is_empty(), || {
            DomainError::validation("at least one field must be provided")
        })?;

        let name = match patch.name {
            Some(name) => FeatureName::new(name)?,
            None => self.name.clone(),
        };
        let description = match patch.description {
            Some(description) => FeatureDescription::parse(description)?,
            None => self.description.clone(),
        };

        let version = self.version.next()?;
        let archived = patch.archived.unwrap_or(self.archived);
        let enabled = if archived {
            ensure(patch.enabled != Some(true), || DomainError::FeatureArchived {
                feature_id: self.id.to_string(),
            })?;
            false
        } else {
            patch.enabled.unwrap_or(self.enabled)
        };

        Ok(Self {
            id: self.id.clone(),
            key: self.key.clone(),
            name,
            description,
            enabled,
            archived,
            version,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    pub fn key(&self) -> &FeatureKey {
        &self.key
    }

    pub fn name(&self) -> &FeatureName {
        &self.name
    }

    pub fn description(&self) -> Option<&FeatureDescription> {
        self.description.as_ref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
