//! Feature 管理ユースケース

use std::sync::Arc;

use anyhow::anyhow;
use crudkit_domain::{
    DomainError,
    clock::Clock,
    feature::{Feature, FeatureDraft, FeatureId, FeaturePatch, Version},
};
use crudkit_infra::repository::FeatureRepository;

use crate::error::ApiError;

/// Feature 作成の入力
#[derive(Debug, Clone)]
pub struct CreateFeatureInput {
    pub key:         String,
    pub name:        String,
    pub description: Option<String>,
}

/// Feature 更新の入力
///
/// `expected_version` はクライアントが最後に読んだバージョン。
#[derive(Debug, Clone)]
pub struct UpdateFeatureInput {
    pub feature_id:       FeatureId,
    pub expected_version: u32,
    pub patch:            FeaturePatch,
}

/// Feature 管理ユースケース
pub struct FeatureUseCaseImpl {
    feature_repository: Arc<dyn FeatureRepository>,
    clock:              Arc<dyn Clock>,
}

impl FeatureUseCaseImpl {
    pub fn new(feature_repository: Arc<dyn FeatureRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            feature_repository,
            clock,
        }
    }

    /// Feature 一覧を取得する（作成日時順）
    pub async fn list_features(&self) -> Result<Vec<Feature>, ApiError> {
        let features = self.feature_repository.find_all().await?;
        Ok(features)
    }

    pub async fn get_feature(&self, feature_id: &FeatureId) -> Result<Feature, ApiError> {
        self.find_or_not_found(feature_id).await
    }

    /// Feature を作成する
    ///
    /// 1. 入力の検証（key → name → description）
    /// 2. key の重複確認
    /// 3. 挿入
    ///
    /// 2 と 3 の間に同じ key が挿入された場合は一意制約違反がそのまま上がる。
    pub async fn create_feature(&self, input: CreateFeatureInput) -> Result<Feature, ApiError> {
        let draft = FeatureDraft::parse(input.key, input.name, input.description)?;

        if self.feature_repository.find_by_key(&draft.key).await?.is_some() {
            return Err(DomainError::FeatureKeyConflict {
                key: draft.key.to_string(),
            }
            .into());
        }

        let feature = Feature::create(draft, self.clock.now());
        self.feature_repository.insert(&feature).await?;

        tracing::info!(feature_id = %feature.id(), key = %feature.key(), "Feature を作成しました");
        Ok(feature)
    }

    /// Feature を部分更新する
    ///
    /// 楽観的ロックで更新し、競合した場合は最新の状態を読み直して
    /// `VersionConflict`（または削除済みなら `FeatureNotFound`）を返す。
    pub async fn update_feature(&self, input: UpdateFeatureInput) -> Result<Feature, ApiError> {
        let current = self.find_or_not_found(&input.feature_id).await?;
        let expected_version = Version::new(input.expected_version);

        let updated = current.apply(input.patch, expected_version, self.clock.now())?;

        match self
            .feature_repository
            .update(&updated, expected_version)
            .await
        {
            Ok(()) => Ok(updated),
            Err(e) if e.as_conflict().is_some() => {
                Err(self.resolve_conflict(&input.feature_id, expected_version).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Feature を削除する
    pub async fn delete_feature(&self, feature_id: &FeatureId) -> Result<(), ApiError> {
        self.feature_repository
            .delete(feature_id)
            .await
            .map_err(|e| {
                if e.is_record_not_found() {
                    DomainError::feature_not_found(feature_id.as_str()).into()
                } else {
                    ApiError::from(e)
                }
            })?;

        tracing::info!(feature_id = %feature_id, "Feature を削除しました");
        Ok(())
    }

    async fn find_or_not_found(&self, feature_id: &FeatureId) -> Result<Feature, ApiError> {
        self.feature_repository
            .find_by_id(feature_id)
            .await?
            .ok_or_else(|| DomainError::feature_not_found(feature_id.as_str()).into())
    }

    /// 楽観的ロック競合を利用者向けのエラーに読み替える
    async fn resolve_conflict(&self, feature_id: &FeatureId, expected: Version) -> ApiError {
        let latest = match self.feature_repository.find_by_id(feature_id).await {
            Ok(latest) => latest,
            Err(e) => return e.into(),
        };

        match latest {
            None => DomainError::feature_not_found(feature_id.as_str()).into(),
            Some(latest) if latest.version() != expected => DomainError::VersionConflict {
                feature_id: feature_id.to_string(),
                expected:   expected.as_u32(),
                actual:     latest.version().as_u32(),
            }
            .into(),
            Some(_) => anyhow!(
                "feature {feature_id} reported a version conflict at version {expected} \
                 but the stored version is unchanged"
            )
            .into(),
        }
    }
}
