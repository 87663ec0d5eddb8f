//! # FeatureRepository
//!
//! Feature の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **楽観的ロック**: `update` は `WHERE version = $expected` で更新し、
//!   0 行なら [`InfraError::conflict`] を返す
//! - **制約違反はそのまま上げる**: key の一意性は DB の UNIQUE 制約で保証し、
//!   違反は `From<sqlx::Error>` で [`InfraErrorKind::UniqueViolation`](crate::InfraErrorKind) になる

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crudkit_domain::{
    DomainError,
    feature::{
        Feature,
        FeatureDescription,
        FeatureId,
        FeatureKey,
        FeatureName,
        FeatureRecord,
        Version,
    },
};
use sqlx::PgPool;

use crate::error::InfraError;

/// Feature リポジトリトレイト
#[async_trait]
pub trait FeatureRepository: Send + Sync {
    /// 全 Feature を作成日時順で取得する
    async fn find_all(&self) -> Result<Vec<Feature>, InfraError>;

    async fn find_by_id(&self, id: &FeatureId) -> Result<Option<Feature>, InfraError>;

    async fn find_by_key(&self, key: &FeatureKey) -> Result<Option<Feature>, InfraError>;

    /// Feature を挿入する（key 重複は一意制約違反）
    async fn insert(&self, feature: &Feature) -> Result<(), InfraError>;

    /// `expected_version` の行を `feature` の内容で置き換える
    ///
    /// バージョンが一致しない（または行が無い）場合は Conflict を返す。
    async fn update(&self, feature: &Feature, expected_version: Version) -> Result<(), InfraError>;

    /// Feature を削除する（存在しなければ RecordNotFound）
    async fn delete(&self, id: &FeatureId) -> Result<(), InfraError>;
}

/// `features` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct FeatureRow {
    id:          String,
    key:         String,
    name:        String,
    description: Option<String>,
    enabled:     bool,
    archived:    bool,
    version:     i32,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<FeatureRow> for Feature {
    type Error = InfraError;

    fn try_from(row: FeatureRow) -> Result<Self, Self::Error> {
        let FeatureRow {
            id,
            key,
            name,
            description,
            enabled,
            archived,
            version,
            created_at,
            updated_at,
        } = row;
        let restore_err = |e: DomainError| {
            InfraError::unexpected(format!("features.{id} の復元に失敗しました: {e}"))
        };

        let key = FeatureKey::new(key).map_err(restore_err)?;
        let name = FeatureName::new(name).map_err(restore_err)?;
        let description = FeatureDescription::parse(description).map_err(restore_err)?;
        let version = u32::try_from(version)
            .map_err(|_| InfraError::unexpected(format!("不正な version: {version}")))?;

        Ok(Feature::from_record(FeatureRecord {
            id: FeatureId::from_string(id),
            key,
            name,
            description,
            enabled,
            archived,
            version: Version::new(version),
            created_at,
            updated_at,
        }))
    }
}

fn version_to_db(version: Version) -> Result<i32, InfraError> {
    i32::try_from(version.as_u32())
        .map_err(|_| InfraError::unexpected(format!("version が範囲外です: {version}")))
}

const SELECT_COLUMNS: &str =
    "SELECT id, key, name, description, enabled, archived, version, created_at, updated_at FROM features";

/// PostgreSQL 実装の FeatureRepository
#[derive(Debug, Clone)]
pub struct PostgresFeatureRepository {
    pool: PgPool,
}

impl PostgresFeatureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeatureRepository for PostgresFeatureRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Feature>, InfraError> {
        let rows: Vec<FeatureRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Feature::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &FeatureId) -> Result<Option<Feature>, InfraError> {
        let row: Option<FeatureRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Feature::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%key))]
    async fn find_by_key(&self, key: &FeatureKey) -> Result<Option<Feature>, InfraError> {
        let row: Option<FeatureRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE key = $1"))
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Feature::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %feature.id()))]
    async fn insert(&self, feature: &Feature) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO features
                (id, key, name, description, enabled, archived, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(feature.id().as_str())
        .bind(feature.key().as_str())
        .bind(feature.name().as_str())
        .bind(feature.description().map(FeatureDescription::as_str))
        .bind(feature.enabled())
        .bind(feature.archived())
        .bind(version_to_db(feature.version())?)
        .bind(feature.created_at())
        .bind(feature.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %feature.id(), %expected_version))]
    async fn update(&self, feature: &Feature, expected_version: Version) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE features
            SET name = $1, description = $2, enabled = $3, archived = $4,
                version = $5, updated_at = $6
            WHERE id = $7 AND version = $8
            "#,
        )
        .bind(feature.name().as_str())
        .bind(feature.description().map(FeatureDescription::as_str))
        .bind(feature.enabled())
        .bind(feature.archived())
        .bind(version_to_db(feature.version())?)
        .bind(feature.updated_at())
        .bind(feature.id().as_str())
        .bind(version_to_db(expected_version)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Feature", feature.id().as_str()));
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &FeatureId) -> Result<(), InfraError> {
        let result = sqlx::query("DELETE FROM features WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::record_not_found());
        }
        Ok(())
    }
}
